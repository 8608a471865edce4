//! Sparse matrix structures (triplet and CSR formats)
//!
//! Operators are assembled as triplets and compressed to CSR, which sums
//! duplicate contributions.

mod csr;
mod triplet;

pub use csr::CsrMatrix;
pub use triplet::TripletMatrix;
