//! Rendering and reading back both inflow dictionaries.

use approx::assert_relative_eq;
use inflow_dict::parse::{parse_indices, parse_inline_vector, parse_rows, parse_scalars, parse_triplets};
use inflow_dict::{
    OutputConfig, OutputError, RunConfig, build_fem, build_turbulence, write_dictionary,
    write_fem_dictionary,
};
use inflow_fem::{BoundaryPatch, FoamMesh, OperatorConfig, PatchOperators};
use ndarray::Array1;
use std::fs;

/// `ny x nz` unit quads on the plane x = 0, point `y * (nz + 1) + z` at
/// `(0, y, z)`, ordered so that the normal is +x.
fn plane_mesh(ny: usize, nz: usize) -> FoamMesh {
    let stride = nz + 1;
    let mut points = Vec::new();
    for y in 0..=ny {
        for z in 0..=nz {
            points.push([0.0, y as f64, z as f64]);
        }
    }
    let mut faces = Vec::new();
    for y in 0..ny {
        for z in 0..nz {
            let p = |y: usize, z: usize| y * stride + z;
            faces.push(vec![p(y, z), p(y, z + 1), p(y + 1, z + 1), p(y + 1, z)]);
        }
    }
    FoamMesh {
        points,
        faces,
        patches: vec![BoundaryPatch {
            name: "inlet".into(),
            start_face: 0,
            n_faces: ny * nz,
        }],
    }
}

fn small_run() -> RunConfig {
    let mut config = RunConfig::default();
    config.spectral.energy_resolution = 3.0;
    config.spectral.cutoff_fraction = 0.9;
    config.spectral.seed = Some(42);
    config.seeds = vec![0.0, 10.5];
    config
}

#[test]
fn test_turbulence_dictionary_layout() {
    let output = build_turbulence(&small_run()).unwrap();
    let text = &output.dictionary;
    let field = &output.report.field;

    assert!(text.starts_with(&OutputConfig::default().banner));
    assert!(text.contains("\n// tProfile.constantProfile()\n// uProfile.uniformProfile(U=10.0)\n"));
    assert!(text.contains("// Covariance = ["));
    assert!(text.contains("cutOff 0.5; \n\nseeds (0.000\n10.500);\n\n"));

    let u = parse_rows(text, "uProfile").unwrap();
    assert_eq!(u.len(), 101);
    assert_eq!(u[100], vec![300.0, 10.0, 1.0]);
    assert_eq!(parse_rows(text, "tProfile").unwrap().len(), 2);

    // Mode vectors are written at full precision.
    let k = parse_rows(text, "kMainSeed").unwrap();
    let p = parse_rows(text, "pMainSeed").unwrap();
    let q = parse_rows(text, "qMainSeed").unwrap();
    assert_eq!(k.len(), field.len());
    assert_eq!(p.len(), field.len());
    assert_eq!(q.len(), field.len());
    for (row, mode) in k.iter().zip(field.iter()) {
        assert_eq!(row.as_slice(), mode.k.as_slice());
    }
    for (row, mode) in q.iter().zip(field.iter()) {
        assert_eq!(row.as_slice(), mode.q.as_slice());
    }
    assert!(text.ends_with(");\n"));
}

#[test]
fn test_fem_dictionary_solves_like_the_factors() {
    let mesh = plane_mesh(3, 4);
    let ops = PatchOperators::from_mesh(&mesh, "inlet", &OperatorConfig::default()).unwrap();
    let config = OutputConfig::default().significant_digits(17).correction_level(0.5);
    let text = write_fem_dictionary(&ops, &config).unwrap();

    assert!(text.contains("corr 5.0000000000000000e-01;"));
    let t1 = parse_inline_vector(&text, "t1").unwrap();
    assert_eq!(t1, ops.patch.frame.t1);

    let lower = parse_triplets(&text, "LoOp").unwrap();
    let upper = parse_triplets(&text, "UoOp").unwrap();
    let ld = parse_scalars(&text, "LdOp").unwrap();
    let ud = parse_scalars(&text, "UdOp").unwrap();
    let pc = parse_indices(&text, "LUpc").unwrap();
    let pr = parse_indices(&text, "LUpr").unwrap();
    let n = ops.patch.num_nodes();
    assert_eq!(ld.len(), n);
    assert_eq!(pc.len(), n);

    // Upper factor is stored last row first.
    assert!(upper.windows(2).all(|w| (w[0].0, w[0].1) > (w[1].0, w[1].1)));
    assert!(lower.windows(2).all(|w| (w[0].0, w[0].1) < (w[1].0, w[1].1)));

    // Replay the solve from the file contents only.
    let b: Vec<f64> = (0..n).map(|i| (0.3 * i as f64).cos()).collect();
    let mut y = vec![0.0; n];
    for i in 0..n {
        y[pc[i]] = b[i] / ld[i];
    }
    for &(r, c, v) in &lower {
        y[r] -= v * y[c] / ld[r];
    }
    let mut z: Vec<f64> = y.iter().zip(&ud).map(|(y, d)| y / d).collect();
    for &(r, c, v) in &upper {
        z[r] -= v * z[c] / ud[r];
    }
    let x: Vec<f64> = pr.iter().map(|&p| z[p]).collect();

    let expected = ops.lu.solve(&Array1::from(b)).unwrap();
    for (a, e) in x.iter().zip(expected.iter()) {
        assert_relative_eq!(*a, *e, epsilon = 1e-12);
    }

    let faces = parse_indices(&text, "faces").unwrap();
    assert_eq!(faces.len(), 4 * ops.patch.num_faces());
    assert_eq!(parse_rows(&text, "nodes").unwrap().len(), n);
    assert_eq!(parse_rows(&text, "faceCentres").unwrap().len(), 12);

    let edges = parse_rows(&text, "bcEdges").unwrap();
    let normals = parse_rows(&text, "bcNorm").unwrap();
    assert_eq!(edges.len(), 2 * (3 + 4));
    assert_eq!(normals.len(), edges.len());
    let perimeter: f64 = edges.iter().map(|e| e[2]).sum();
    assert_relative_eq!(perimeter, 14.0, epsilon = 1e-12);
    assert!(normals.iter().all(|n| n[2] == 0.0));

    let grad1 = parse_triplets(&text, "grad1Op").unwrap();
    assert_eq!(grad1.len(), 4 * ops.patch.num_faces());
}

#[test]
fn test_fem_dictionary_index_precision() {
    let ops =
        PatchOperators::from_mesh(&plane_mesh(20, 10), "inlet", &OperatorConfig::default()).unwrap();
    // 231 nodes cannot be numbered with two significant digits
    let result = write_fem_dictionary(&ops, &OutputConfig::default().significant_digits(2));
    assert!(matches!(result, Err(OutputError::IndexPrecision { digits: 2, .. })));

    assert!(write_fem_dictionary(&ops, &OutputConfig::default()).is_ok());
}

#[test]
fn test_build_fem_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let mesh_dir = dir.path().join("polyMesh");
    fs::create_dir_all(&mesh_dir).unwrap();
    fs::write(
        mesh_dir.join("points"),
        "6\n(\n(0 0 0)\n(0 0 1)\n(0 1 1)\n(0 1 0)\n(0 2 1)\n(0 2 0)\n)\n",
    )
    .unwrap();
    fs::write(mesh_dir.join("faces"), "2\n(\n4(0 1 2 3)\n4(3 2 4 5)\n)\n").unwrap();
    fs::write(
        mesh_dir.join("boundary"),
        "1\n(\ninlet\n{\ntype patch;\nnFaces 2;\nstartFace 0;\n}\n)\n",
    )
    .unwrap();

    let config = small_run();
    let output = build_fem(&config, &mesh_dir).unwrap();
    assert_eq!(output.operators.patch.num_nodes(), 6);

    let path = dir.path().join("randomDict");
    write_dictionary(&path, &output.dictionary).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), output.dictionary);

    let mut missing = config.clone();
    missing.mesh.patch = "outlet".into();
    let err = build_fem(&missing, &mesh_dir).unwrap_err();
    assert!(err.is_input_error());
}
