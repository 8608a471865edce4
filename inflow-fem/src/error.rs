//! Error types for mesh input and operator construction.

use inflow_solvers::LuError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading a mesh or building patch operators.
#[derive(Debug, Error)]
pub enum MeshError {
    /// A mesh file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A mesh table is malformed.
    #[error("{file}:{line}: {message}")]
    Parse {
        /// Table being parsed (`points`, `faces` or `boundary`)
        file: String,
        /// 1-based line of the offending token
        line: usize,
        /// What was expected
        message: String,
    },

    /// The requested patch is not listed in the boundary table.
    #[error("patch '{0}' not found in boundary")]
    PatchNotFound(String),

    /// The patch face range exceeds the face table.
    #[error("patch '{patch}' spans faces {start}..{end} but only {available} faces exist")]
    FaceRangeOutOfBounds {
        /// Patch name
        patch: String,
        /// First face of the patch
        start: usize,
        /// One past the last face of the patch
        end: usize,
        /// Size of the face table
        available: usize,
    },

    /// The patch has no faces.
    #[error("patch '{0}' has no faces")]
    EmptyPatch(String),

    /// A patch face is not a quadrilateral.
    #[error("face {face} has {nodes} nodes, only quadrilaterals are supported")]
    NonQuadFace {
        /// Global face index
        face: usize,
        /// Number of nodes of the face
        nodes: usize,
    },

    /// A face references a point that does not exist.
    #[error("face {face} references point {node} but only {available} points exist")]
    NodeOutOfRange {
        /// Global face index
        face: usize,
        /// Offending point index
        node: usize,
        /// Size of the point table
        available: usize,
    },

    /// A face has collinear edges and no normal.
    #[error("face {face} is degenerate (zero area)")]
    DegenerateFace {
        /// Global face index
        face: usize,
    },

    /// A patch face collapses in the `(t1, t2)` plane and has no usable Jacobian.
    #[error("patch face {face} has a vanishing Jacobian")]
    DegenerateElement {
        /// Face index within the patch
        face: usize,
    },

    /// Face normals cancel out and the patch has no mean normal.
    #[error("patch '{0}' has no well-defined mean normal")]
    DegenerateNormal(String),

    /// An edge is shared by more than two faces.
    #[error("edge {}-{} is shared by more than two faces", nodes[0], nodes[1])]
    NonManifoldEdge {
        /// Edge end nodes (patch numbering)
        nodes: [usize; 2],
    },

    /// A boundary edge has no in-plane outward normal.
    #[error("boundary edge {}-{} has no well-defined outward normal", nodes[0], nodes[1])]
    DegenerateBoundaryNormal {
        /// Edge end nodes (patch numbering)
        nodes: [usize; 2],
    },

    /// The pinned Laplacian could not be factorized.
    #[error("factorization failed: {0}")]
    Factorization(#[from] LuError),
}

/// A specialized `Result` type for mesh operations.
pub type Result<T> = std::result::Result<T, MeshError>;

impl MeshError {
    /// Returns `true` if the error comes from reading or parsing the mesh files.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            MeshError::Io { .. }
                | MeshError::Parse { .. }
                | MeshError::PatchNotFound(_)
                | MeshError::FaceRangeOutOfBounds { .. }
                | MeshError::EmptyPatch(_)
                | MeshError::NonQuadFace { .. }
                | MeshError::NodeOutOfRange { .. }
        )
    }

    /// Returns `true` if the mesh was read but its geometry is unusable.
    pub fn is_geometry_error(&self) -> bool {
        matches!(
            self,
            MeshError::DegenerateFace { .. }
                | MeshError::DegenerateElement { .. }
                | MeshError::DegenerateNormal(_)
                | MeshError::NonManifoldEdge { .. }
                | MeshError::DegenerateBoundaryNormal { .. }
        )
    }
}
