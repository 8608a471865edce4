//! Mesh tables to factorized patch operators.

use approx::assert_relative_eq;
use inflow_fem::{FoamMesh, MeshError, OperatorConfig, PatchGeometry, PatchOperators, renumber};
use ndarray::Array1;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::fs;

const HEADER: &str = "/*--------------------------------*- C++ -*----------------------------------*\\
| =========                 |                                                 |
\\*---------------------------------------------------------------------------*/
FoamFile
{
    version     2.0;
    format      ascii;
    class       %CLASS%;
    location    \"constant/polyMesh\";
    object      %OBJECT%;
}
// * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * //

";

fn header(class: &str, object: &str) -> String {
    HEADER.replace("%CLASS%", class).replace("%OBJECT%", object)
}

/// Inlet on the plane x = 0 made of `ny x nz` unit quads, preceded by two
/// unrelated faces. Point `y * (nz + 1) + z` sits at `(0, y, z)`.
fn inlet_tables(ny: usize, nz: usize) -> (String, String, String) {
    let stride = nz + 1;
    let n_plane = (ny + 1) * stride;

    let mut points = header("vectorField", "points");
    points.push_str(&format!("{}\n(\n", n_plane + 4));
    for y in 0..=ny {
        for z in 0..=nz {
            points.push_str(&format!("(0 {y} {z})\n"));
        }
    }
    for (y, z) in [(0, 0), (1, 0), (1, 1), (0, 1)] {
        points.push_str(&format!("(1 {y} {z})\n"));
    }
    points.push_str(")\n");

    let e = n_plane;
    let mut faces = header("faceList", "faces");
    faces.push_str(&format!("{}\n(\n", ny * nz + 2));
    faces.push_str(&format!("4({} {} {} {})\n", e, e + 1, e + 2, e + 3));
    faces.push_str(&format!("3({} {} {})\n", e, e + 1, e + 2));
    for y in 0..ny {
        for z in 0..nz {
            let p = |y: usize, z: usize| y * stride + z;
            faces.push_str(&format!(
                "4({} {} {} {})\n",
                p(y, z),
                p(y, z + 1),
                p(y + 1, z + 1),
                p(y + 1, z)
            ));
        }
    }
    faces.push_str(")\n");

    let mut boundary = header("polyBoundaryMesh", "boundary");
    boundary.push_str(&format!(
        "2\n(\n    outlet\n    {{\n        type patch;\n        nFaces 2;\n        startFace 0;\n    }}\n    inlet\n    {{\n        type patch;\n        inGroups 1(inflow);\n        nFaces {};\n        startFace 2;\n    }}\n)\n",
        ny * nz
    ));

    (points, faces, boundary)
}

#[test]
fn test_read_and_build_operators() {
    let dir = tempfile::tempdir().unwrap();
    let mesh_dir = dir.path().join("constant").join("polyMesh");
    fs::create_dir_all(&mesh_dir).unwrap();
    let (points, faces, boundary) = inlet_tables(3, 2);
    fs::write(mesh_dir.join("points"), points).unwrap();
    fs::write(mesh_dir.join("faces"), faces).unwrap();
    fs::write(mesh_dir.join("boundary"), boundary).unwrap();

    let mesh = FoamMesh::read(&mesh_dir).unwrap();
    assert_eq!(mesh.points.len(), 16);
    assert_eq!(mesh.faces.len(), 8);

    let ops = PatchOperators::from_mesh(&mesh, "inlet", &OperatorConfig::default()).unwrap();
    let patch = &ops.patch;
    assert_eq!(patch.num_nodes(), 12);
    assert_eq!(patch.num_faces(), 6);
    assert_relative_eq!(patch.frame.normal[0], 1.0, epsilon = 1e-12);
    assert!(patch.bandwidth_after <= patch.bandwidth_before);

    // Perimeter 2 * (3 + 2), 17 edges in total.
    assert_eq!(ops.edges.len(), 17);
    assert_eq!(ops.boundary.len(), 10);
    let perimeter: f64 = ops.boundary.iter().map(|e| e.length).sum();
    assert_relative_eq!(perimeter, 10.0, epsilon = 1e-12);

    // Default clockwise orientation yields a positive Laplacian.
    for i in 0..patch.num_nodes() {
        assert!(ops.laplacian.get(i, i) > 0.0);
    }

    // The LU factors solve the pinned system.
    let b = Array1::from_iter((0..patch.num_nodes()).map(|i| (i as f64 * 0.37).sin()));
    let x = ops.lu.solve(&b).unwrap();
    let residual = ops.laplacian.matvec(&x);
    for i in 0..b.len() {
        assert_relative_eq!(residual[i], b[i], epsilon = 1e-10);
    }

    // Gradients of the local coordinate x1 are exactly one.
    let x1 = Array1::from_iter(patch.local.iter().map(|p| p[0]));
    let g = ops.gradients.grad1.to_csr().matvec(&x1);
    assert!(g.iter().all(|v| (v - 1.0).abs() < 1e-12));

    // Missing files surface as I/O errors.
    let err = FoamMesh::read(dir.path()).unwrap_err();
    assert!(matches!(err, MeshError::Io { .. }));
}

#[test]
fn test_patch_with_triangle_is_rejected() {
    let (points, faces, boundary) = inlet_tables(1, 1);
    let mesh = FoamMesh::parse(&points, &faces, &boundary).unwrap();
    let err = PatchGeometry::extract(&mesh, "outlet").unwrap_err();
    assert!(matches!(err, MeshError::NonQuadFace { face: 1, nodes: 3 }));
}

#[test]
fn test_renumbering_never_increases_bandwidth() {
    let mut rng = StdRng::seed_from_u64(3);
    for (ny, nz) in [(2, 2), (5, 3), (8, 2), (4, 6)] {
        let (points, faces, boundary) = inlet_tables(ny, nz);
        let mut mesh = FoamMesh::parse(&points, &faces, &boundary).unwrap();

        // Relabel the plane points randomly.
        let n_plane = (ny + 1) * (nz + 1);
        let mut labels: Vec<usize> = (0..n_plane).collect();
        labels.shuffle(&mut rng);
        let mut shuffled = mesh.points.clone();
        for (old, &new) in labels.iter().enumerate() {
            shuffled[new] = mesh.points[old];
        }
        mesh.points = shuffled;
        for face in mesh.faces.iter_mut().skip(2) {
            for node in face.iter_mut() {
                *node = labels[*node];
            }
        }

        let patch = PatchGeometry::extract(&mesh, "inlet").unwrap();
        let renumbered = renumber(patch);
        assert!(renumbered.bandwidth_after <= renumbered.bandwidth_before);

        let ops = PatchOperators::build(renumbered, &OperatorConfig::default()).unwrap();
        assert_eq!(ops.boundary.len(), 2 * (ny + nz));
    }
}
