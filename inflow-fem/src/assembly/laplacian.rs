//! Laplacian (stiffness) assembly
//!
//! Assembles K where K_ij = ∫ ∇φ_i · ∇φ_j dΩ over the patch faces.

use super::AssemblyConfig;
use crate::basis::{Jacobian, q1_quadrilateral_grad};
use crate::error::{MeshError, Result};
use crate::mesh::RenumberedPatch;
use crate::quadrature::{QuadraturePoint, gauss_quadrilateral};
use inflow_solvers::{CsrMatrix, TripletMatrix};
use log::{info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Element stiffness of one Q1 face
///
/// `sign` corrects the determinant of faces wound clockwise in the plane.
pub fn element_stiffness(
    coords: &[[f64; 2]; 4],
    quad: &[QuadraturePoint],
    sign: f64,
) -> [[f64; 4]; 4] {
    let mut k_local = [[0.0; 4]; 4];

    for qp in quad {
        let grads = q1_quadrilateral_grad(qp.xi(), qp.eta());
        let jac = Jacobian::from_2d(&grads, coords);
        let grads_phys = grads.map(|g| jac.transform_gradient(&g));
        let scale = qp.weight * sign * jac.det;

        for i in 0..4 {
            for j in 0..4 {
                let dot = grads_phys[i][0] * grads_phys[j][0] + grads_phys[i][1] * grads_phys[j][1];
                k_local[i][j] += dot * scale;
            }
        }
    }

    k_local
}

/// Relative size below which a Jacobian determinant counts as zero
const DEGENERATE_JACOBIAN: f64 = 1e-12;

pub(crate) fn face_coords(patch: &RenumberedPatch, face: usize) -> [[f64; 2]; 4] {
    patch.faces[face].map(|n| patch.local[n])
}

/// Jacobian of patch face `face` at `(xi, eta)`
///
/// The determinant is compared with the squared diagonals of the face, so
/// the test does not depend on the mesh units.
pub(crate) fn face_jacobian(
    coords: &[[f64; 2]; 4],
    face: usize,
    xi: f64,
    eta: f64,
) -> Result<Jacobian> {
    let jac = Jacobian::from_2d(&q1_quadrilateral_grad(xi, eta), coords);
    let diag = |a: [f64; 2], b: [f64; 2]| (b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2);
    let extent = diag(coords[0], coords[2]) + diag(coords[1], coords[3]);
    if !(jac.det.abs() > DEGENERATE_JACOBIAN * extent) {
        return Err(MeshError::DegenerateElement { face });
    }
    Ok(jac)
}

/// Compute element stiffness contributions (returns triplets for one face)
fn compute_face_stiffness(
    patch: &RenumberedPatch,
    face: usize,
    quad: &[QuadraturePoint],
    sign: f64,
) -> Result<Vec<(usize, usize, f64)>> {
    let nodes = patch.faces[face];
    let coords = face_coords(patch, face);
    if sign * face_jacobian(&coords, face, 0.0, 0.0)?.det < 0.0 {
        warn!("Face {face} has a negative oriented Jacobian; check the face orientation");
    }
    for qp in quad {
        face_jacobian(&coords, face, qp.xi(), qp.eta())?;
    }
    let k_local = element_stiffness(&coords, quad, sign);

    let mut triplets = Vec::with_capacity(16);
    for (i, &gi) in nodes.iter().enumerate() {
        for (j, &gj) in nodes.iter().enumerate() {
            if k_local[i][j].abs() > 1e-15 {
                triplets.push((gi, gj, k_local[i][j]));
            }
        }
    }
    Ok(triplets)
}

/// Assemble the patch Laplacian as triplets (duplicates summed on compression)
///
/// Fails with [`MeshError::DegenerateElement`] when a face collapses.
pub fn assemble_laplacian(
    patch: &RenumberedPatch,
    config: &AssemblyConfig,
) -> Result<TripletMatrix> {
    let n = patch.num_nodes();
    let quad = gauss_quadrilateral(config.quadrature_order);
    let sign = config.orientation.sign();

    #[cfg(feature = "parallel")]
    let per_face: Vec<Vec<(usize, usize, f64)>> = (0..patch.num_faces())
        .into_par_iter()
        .map(|face| compute_face_stiffness(patch, face, &quad, sign))
        .collect::<Result<_>>()?;
    #[cfg(not(feature = "parallel"))]
    let per_face: Vec<Vec<(usize, usize, f64)>> = (0..patch.num_faces())
        .map(|face| compute_face_stiffness(patch, face, &quad, sign))
        .collect::<Result<_>>()?;

    // Merge in face order so the result does not depend on scheduling.
    let total: usize = per_face.iter().map(Vec::len).sum();
    let mut matrix = TripletMatrix::with_capacity(n, n, total);
    for (i, j, v) in per_face.into_iter().flatten() {
        matrix.add(i, j, v);
    }
    info!("Assembled Laplacian: {n} nodes, {total} element contributions");
    Ok(matrix)
}

/// Symmetrize `K` and pin node 0: row and column 0 become the unit vector.
pub fn pinned_laplacian(laplacian: &TripletMatrix) -> CsrMatrix {
    laplacian.symmetrized().pinned(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::FaceOrientation;
    use crate::mesh::renumber;
    use crate::mesh::test_support::strip_patch;
    use approx::assert_relative_eq;

    #[test]
    fn test_unit_square_element() {
        let coords = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let k = element_stiffness(&coords, &gauss_quadrilateral(2), 1.0);
        let expected = [
            [2.0 / 3.0, -1.0 / 6.0, -1.0 / 3.0, -1.0 / 6.0],
            [-1.0 / 6.0, 2.0 / 3.0, -1.0 / 6.0, -1.0 / 3.0],
            [-1.0 / 3.0, -1.0 / 6.0, 2.0 / 3.0, -1.0 / 6.0],
            [-1.0 / 6.0, -1.0 / 3.0, -1.0 / 6.0, 2.0 / 3.0],
        ];
        for i in 0..4 {
            for j in 0..4 {
                assert_relative_eq!(k[i][j], expected[i][j], epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn test_clockwise_sign_restores_positive_stiffness() {
        // Same square wound clockwise
        let coords = [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]];
        let quad = gauss_quadrilateral(2);
        let k = element_stiffness(&coords, &quad, FaceOrientation::Clockwise.sign());
        assert_relative_eq!(k[0][0], 2.0 / 3.0, epsilon = 1e-14);
        assert_relative_eq!(k[0][2], -1.0 / 3.0, epsilon = 1e-14);
    }

    #[test]
    fn test_laplacian_rows_sum_to_zero() {
        let patch = renumber(strip_patch(3, true));
        let config = AssemblyConfig::default().orientation(FaceOrientation::CounterClockwise);
        let k = assemble_laplacian(&patch, &config).unwrap().to_csr();
        let dense = k.to_dense();
        for i in 0..patch.num_nodes() {
            let row_sum: f64 = dense.row(i).sum();
            assert!(row_sum.abs() < 1e-12);
            for j in 0..patch.num_nodes() {
                assert_relative_eq!(dense[[i, j]], dense[[j, i]], epsilon = 1e-14);
            }
            assert!(dense[[i, i]] > 0.0);
        }
    }

    #[test]
    fn test_pinned_rows_are_unit_vectors() {
        let patch = renumber(strip_patch(3, false));
        let config = AssemblyConfig::default().orientation(FaceOrientation::CounterClockwise);
        let pinned = pinned_laplacian(&assemble_laplacian(&patch, &config).unwrap());
        let dense = pinned.to_dense();
        for j in 0..patch.num_nodes() {
            let expected = if j == 0 { 1.0 } else { 0.0 };
            assert_eq!(dense[[0, j]], expected);
            assert_eq!(dense[[j, 0]], expected);
        }
    }

    #[test]
    fn test_collapsed_face_is_rejected() {
        let mut patch = renumber(strip_patch(3, false));
        let [a, _, _, d] = patch.faces[1];
        patch.faces[1] = [a, a, d, d];

        let err = assemble_laplacian(&patch, &AssemblyConfig::default()).unwrap_err();
        assert!(matches!(err, MeshError::DegenerateElement { face: 1 }));
        assert!(err.is_geometry_error());
        assert!(matches!(
            crate::assembly::assemble_gradients(&patch),
            Err(MeshError::DegenerateElement { face: 1 })
        ));

        // Same face scaled down stays valid
        let mut small = renumber(strip_patch(3, false));
        for p in small.local.iter_mut() {
            *p = [p[0] * 1e-6, p[1] * 1e-6];
        }
        assert!(assemble_laplacian(&small, &AssemblyConfig::default()).is_ok());
    }
}
