//! End-to-end construction of the divergence-correction operators of a patch

use crate::assembly::{
    AssemblyConfig, GradientOperators, assemble_gradients, assemble_laplacian, pinned_laplacian,
};
use crate::boundary::{BoundaryEdge, Edge, boundary_edges, extract_edges};
use crate::error::Result;
use crate::mesh::{FoamMesh, PatchGeometry, RenumberedPatch, renumber};
use inflow_solvers::{CsrMatrix, LuConfig, SparseLu};
use log::info;

/// Configuration of the operator pipeline
#[derive(Debug, Clone, Default)]
pub struct OperatorConfig {
    /// Stiffness and gradient assembly
    pub assembly: AssemblyConfig,
    /// Factorization of the pinned Laplacian
    pub lu: LuConfig,
}

/// Everything the inflow correction needs to know about a patch
#[derive(Debug, Clone)]
pub struct PatchOperators {
    /// Renumbered patch geometry
    pub patch: RenumberedPatch,
    /// Symmetrized Laplacian with node 0 pinned
    pub laplacian: CsrMatrix,
    /// Face-centre gradient operators
    pub gradients: GradientOperators,
    /// LU factors of `laplacian`
    pub lu: SparseLu,
    /// All patch edges
    pub edges: Vec<Edge>,
    /// Contour edges with lengths and outward normals
    pub boundary: Vec<BoundaryEdge>,
}

impl PatchOperators {
    /// Build the operators of an already renumbered patch
    pub fn build(patch: RenumberedPatch, config: &OperatorConfig) -> Result<Self> {
        let laplacian = pinned_laplacian(&assemble_laplacian(&patch, &config.assembly)?);
        let gradients = assemble_gradients(&patch)?;
        let lu = SparseLu::factorize(&laplacian, &config.lu)?;
        let edges = extract_edges(&patch.faces)?;
        let boundary = boundary_edges(&patch.local, &patch.faces, &edges)?;

        info!(
            "Operators for '{}': Laplacian nnz {}, LU nnz {}, {} boundary edges",
            patch.name,
            laplacian.nnz(),
            lu.nnz(),
            boundary.len()
        );

        Ok(Self {
            patch,
            laplacian,
            gradients,
            lu,
            edges,
            boundary,
        })
    }

    /// Extract, renumber and build the operators of patch `name` of `mesh`
    pub fn from_mesh(mesh: &FoamMesh, name: &str, config: &OperatorConfig) -> Result<Self> {
        let patch = PatchGeometry::extract(mesh, name)?;
        Self::build(renumber(patch), config)
    }
}
