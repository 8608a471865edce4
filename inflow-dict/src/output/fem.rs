//! Divergence-correction operators of an inlet patch

use super::OutputConfig;
use super::format::{
    format_index, format_sci, write_indices, write_inline_vector, write_rows, write_scalars,
    write_triplets,
};
use crate::error::Result;
use inflow_fem::PatchOperators;
use inflow_solvers::TripletMatrix;
use log::info;
use std::fmt::Write;

fn merged(matrix: &TripletMatrix) -> Vec<(usize, usize, f64)> {
    matrix.to_csr().iter().collect()
}

/// Render the operator dictionary read by the synthetic inlet condition.
///
/// Entries follow the order `corr`, `t1`, `t2`, `LoOp`, `UoOp`, `grad1Op`,
/// `grad2Op`, `LdOp`, `UdOp`, `LUpc`, `LUpr`, `faces`, `nodes`,
/// `faceCentres`, `bcEdges`, `bcNorm`. The upper factor is written in
/// descending order so the backward sweep can stream it.
pub fn write_fem_dictionary(ops: &PatchOperators, config: &OutputConfig) -> Result<String> {
    config.validate()?;
    let d = config.significant_digits;
    let frame = &ops.patch.frame;
    let lu = &ops.lu;

    let mut out = String::with_capacity(64 * (lu.nnz() + 8 * ops.patch.num_nodes()));
    out.push_str(&config.banner);
    out.push('\n');
    let _ = writeln!(
        out,
        "corr {};            // 0 - no correction, 1 - correction",
        format_sci(config.correction_level, d)
    );

    write_inline_vector(&mut out, "t1", &frame.t1, config);
    write_inline_vector(&mut out, "t2", &frame.t2, config);
    write_triplets(&mut out, "LoOp", lu.lower(), false, config)?;
    write_triplets(&mut out, "UoOp", lu.upper(), true, config)?;
    write_triplets(&mut out, "grad1Op", &merged(&ops.gradients.grad1), false, config)?;
    write_triplets(&mut out, "grad2Op", &merged(&ops.gradients.grad2), false, config)?;
    write_scalars(&mut out, "LdOp", lu.lower_diag(), config);
    write_scalars(&mut out, "UdOp", lu.upper_diag(), config);
    write_indices(&mut out, "LUpc", lu.row_perm().iter().copied(), config)?;
    write_indices(&mut out, "LUpr", lu.col_perm().iter().copied(), config)?;
    write_indices(&mut out, "faces", ops.patch.faces.iter().flatten().copied(), config)?;
    write_rows(&mut out, "nodes", &ops.patch.points, config);
    write_rows(&mut out, "faceCentres", &ops.patch.face_centres(), config);

    out.push_str("bcEdges (\n");
    for edge in &ops.boundary {
        let _ = writeln!(
            out,
            "({} {} {})",
            format_index(edge.nodes[0], d)?,
            format_index(edge.nodes[1], d)?,
            format_sci(edge.length, d)
        );
    }
    out.push_str(");\n");

    let normals: Vec<[f64; 3]> = ops
        .boundary
        .iter()
        .map(|edge| [edge.normal[0], edge.normal[1], 0.0])
        .collect();
    write_rows(&mut out, "bcNorm", &normals, config);

    info!(
        "FEM dictionary for '{}': {} nodes, {} faces, {} bytes",
        ops.patch.name,
        ops.patch.num_nodes(),
        ops.patch.num_faces(),
        out.len()
    );
    Ok(out)
}
