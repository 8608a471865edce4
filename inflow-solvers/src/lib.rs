//! Sparse storage and direct factorization for mesh operators
//!
//! This crate provides the linear-algebra layer of the divergence
//! correction: triplet assembly, CSR storage, bandwidth-reducing orderings
//! and a sparse LU whose factors are exported as triplets.
//!
//! # Example
//!
//! ```
//! use inflow_solvers::{LuConfig, SparseLu, TripletMatrix};
//! use ndarray::array;
//!
//! let mut a = TripletMatrix::new(2, 2);
//! a.add(0, 0, 4.0);
//! a.add(0, 1, 1.0);
//! a.add(1, 0, 1.0);
//! a.add(1, 1, 3.0);
//!
//! let lu = SparseLu::factorize(&a.to_csr(), &LuConfig::default())?;
//! let x = lu.solve(&array![1.0, 2.0])?;
//! assert!((4.0 * x[0] + x[1] - 1.0).abs() < 1e-12);
//! # Ok::<(), inflow_solvers::LuError>(())
//! ```

pub mod direct;
pub mod ordering;
pub mod sparse;

pub use direct::{LuConfig, LuError, SparseLu};
pub use ordering::{ColumnOrdering, bandwidth, invert_permutation, reverse_cuthill_mckee};
pub use sparse::{CsrMatrix, TripletMatrix};
