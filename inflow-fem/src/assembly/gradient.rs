//! Face-centre gradient operators
//!
//! Row `f` of `grad1` (`grad2`) holds `∂N/∂x₁` (`∂N/∂x₂`) of the four
//! shape functions of face `f`, evaluated at the element centre, so that
//! `grad1 · u` is the in-plane derivative of a nodal field at face centres.

use super::laplacian::{face_coords, face_jacobian};
use crate::basis::q1_quadrilateral_grad;
use crate::error::Result;
use crate::mesh::RenumberedPatch;
use inflow_solvers::TripletMatrix;

/// Pair of face-by-node gradient operators
#[derive(Debug, Clone)]
pub struct GradientOperators {
    /// Derivative along `t1`
    pub grad1: TripletMatrix,
    /// Derivative along `t2`
    pub grad2: TripletMatrix,
}

/// Assemble `grad1` and `grad2` for every face of the patch
pub fn assemble_gradients(patch: &RenumberedPatch) -> Result<GradientOperators> {
    let (n_faces, n_nodes) = (patch.num_faces(), patch.num_nodes());
    let mut grad1 = TripletMatrix::with_capacity(n_faces, n_nodes, 4 * n_faces);
    let mut grad2 = TripletMatrix::with_capacity(n_faces, n_nodes, 4 * n_faces);

    let grads = q1_quadrilateral_grad(0.0, 0.0);
    for (face, nodes) in patch.faces.iter().enumerate() {
        let jac = face_jacobian(&face_coords(patch, face), face, 0.0, 0.0)?;
        for (g, &node) in grads.iter().zip(nodes) {
            let phys = jac.transform_gradient(g);
            grad1.add(face, node, phys[0]);
            grad2.add(face, node, phys[1]);
        }
    }

    Ok(GradientOperators { grad1, grad2 })
}
