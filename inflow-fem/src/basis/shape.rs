//! Jacobian of the reference-to-physical map for planar elements

/// Jacobian matrix for coordinate transformation
///
/// `matrix = [[dx/dxi, dx/deta], [dy/dxi, dy/deta]]`
#[derive(Debug, Clone, Copy)]
pub struct Jacobian {
    /// Jacobian matrix entries (row-major)
    pub matrix: [[f64; 2]; 2],
    /// Determinant of Jacobian
    pub det: f64,
    /// Inverse of Jacobian (for gradient transformation)
    pub inverse: [[f64; 2]; 2],
}

impl Jacobian {
    /// Compute the Jacobian from reference gradients and node coordinates
    pub fn from_2d(grad_ref: &[[f64; 2]; 4], coords: &[[f64; 2]; 4]) -> Self {
        let mut j = [[0.0; 2]; 2];

        for (g, c) in grad_ref.iter().zip(coords) {
            j[0][0] += g[0] * c[0]; // dx/dxi
            j[0][1] += g[1] * c[0]; // dx/deta
            j[1][0] += g[0] * c[1]; // dy/dxi
            j[1][1] += g[1] * c[1]; // dy/deta
        }

        let det = j[0][0] * j[1][1] - j[0][1] * j[1][0];
        let inv_det = 1.0 / det;

        Self {
            matrix: j,
            det,
            inverse: [
                [j[1][1] * inv_det, -j[0][1] * inv_det],
                [-j[1][0] * inv_det, j[0][0] * inv_det],
            ],
        }
    }

    /// Transform reference gradients to physical gradients
    /// grad_physical = J^{-T} * grad_ref
    pub fn transform_gradient(&self, grad_ref: &[f64; 2]) -> [f64; 2] {
        let mut result = [0.0; 2];
        for (i, r) in result.iter_mut().enumerate() {
            for (j, g) in grad_ref.iter().enumerate() {
                *r += self.inverse[j][i] * g;
            }
        }
        result
    }
}
