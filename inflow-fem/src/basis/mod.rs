//! Finite element basis functions
//!
//! Bilinear quadrilateral shape functions and the Jacobian used to map
//! their gradients to the patch plane.

mod lagrange;
mod shape;

pub use lagrange::*;
pub use shape::*;
