//! Finite-element operators for the divergence correction of inflow patches
//!
//! This crate provides:
//!
//! - **Mesh input**: OpenFOAM `points`/`faces`/`boundary` tables, patch
//!   extraction with a local `(t1, t2, n)` frame, bandwidth-reducing
//!   renumbering
//! - **Assembly**: Q1 Laplacian with 2x2 Gauss quadrature, face-centre
//!   gradient operators, symmetrization and pinning
//! - **Boundary**: patch edges, contour lengths and outward normals
//! - **Pipeline**: [`PatchOperators`] ties the above to the sparse LU of
//!   `inflow-solvers`
//!
//! # Example
//!
//! ```no_run
//! use inflow_fem::{FoamMesh, OperatorConfig, PatchOperators};
//!
//! let mesh = FoamMesh::read("constant/polyMesh")?;
//! let ops = PatchOperators::from_mesh(&mesh, "inlet", &OperatorConfig::default())?;
//! println!("{} nodes, {} boundary edges", ops.patch.num_nodes(), ops.boundary.len());
//! # Ok::<(), inflow_fem::MeshError>(())
//! ```

pub mod assembly;
pub mod basis;
pub mod boundary;
pub mod error;
pub mod mesh;
pub mod operators;
pub mod quadrature;

mod geometry;

pub use assembly::{AssemblyConfig, FaceOrientation, GradientOperators};
pub use boundary::{BoundaryEdge, Edge};
pub use error::{MeshError, Result};
pub use mesh::{BoundaryPatch, FoamMesh, LocalFrame, PatchGeometry, RenumberedPatch, renumber};
pub use operators::{OperatorConfig, PatchOperators};
