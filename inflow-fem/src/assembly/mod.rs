//! Finite element operator assembly on a renumbered patch
//!
//! Assembles the Laplacian stiffness matrix, the face-centre gradient
//! operators and the pinned, symmetrized Laplacian that is factorized.

mod gradient;
mod laplacian;

pub use gradient::*;
pub use laplacian::*;

/// Winding of patch faces in the `(t1, t2)` plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaceOrientation {
    /// Clockwise faces; the Jacobian determinant is negated.
    ///
    /// OpenFOAM boundary faces seen from inside the domain.
    #[default]
    Clockwise,

    /// Counter-clockwise faces
    CounterClockwise,
}

impl FaceOrientation {
    /// Sign applied to the Jacobian determinant
    pub fn sign(self) -> f64 {
        match self {
            FaceOrientation::Clockwise => -1.0,
            FaceOrientation::CounterClockwise => 1.0,
        }
    }
}

/// Configuration for operator assembly
#[derive(Debug, Clone)]
pub struct AssemblyConfig {
    /// Face winding in the patch plane
    pub orientation: FaceOrientation,

    /// Gauss-Legendre points per direction for the stiffness integral
    /// (default: 2)
    pub quadrature_order: usize,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            orientation: FaceOrientation::default(),
            quadrature_order: 2,
        }
    }
}

impl AssemblyConfig {
    /// Replace the face orientation
    pub fn orientation(mut self, orientation: FaceOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Replace the quadrature order
    pub fn quadrature_order(mut self, order: usize) -> Self {
        self.quadrature_order = order;
        self
    }
}
