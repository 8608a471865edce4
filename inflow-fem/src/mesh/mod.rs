//! Mesh input and patch preparation
//!
//! This module reads OpenFOAM mesh tables, extracts one quadrilateral
//! boundary patch with its local frame, and renumbers its nodes.

mod foam;
mod patch;
mod renumber;

pub use foam::*;
pub use patch::*;
pub use renumber::*;
