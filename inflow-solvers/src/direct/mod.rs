//! Direct solvers for linear systems
//!
//! This module provides direct (non-iterative) solvers:
//! - [`SparseLu`]: sparse LU with threshold partial pivoting and an optional
//!   reverse Cuthill-McKee column ordering

mod sparse_lu;

pub use sparse_lu::{LuConfig, LuError, SparseLu};
