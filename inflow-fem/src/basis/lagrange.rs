//! Bilinear (Q1) Lagrange basis on the reference square [-1, 1]^2
//!
//! Node ordering: (-1,-1), (1,-1), (1,1), (-1,1)

/// Evaluate Q1 quadrilateral basis function gradients at (xi, eta)
pub fn q1_quadrilateral_grad(xi: f64, eta: f64) -> [[f64; 2]; 4] {
    [
        [-0.25 * (1.0 - eta), -0.25 * (1.0 - xi)],
        [0.25 * (1.0 - eta), -0.25 * (1.0 + xi)],
        [0.25 * (1.0 + eta), 0.25 * (1.0 + xi)],
        [-0.25 * (1.0 + eta), 0.25 * (1.0 - xi)],
    ]
}
