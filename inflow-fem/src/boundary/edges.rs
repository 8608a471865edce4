//! Edge discovery and boundary-edge geometry

use crate::error::{MeshError, Result};
use log::info;
use std::collections::HashMap;

/// An undirected patch edge
///
/// `nodes` keeps the orientation in which the edge was first met.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// End nodes
    pub nodes: [usize; 2],
    /// Face that introduced the edge
    pub first_face: usize,
    /// Second adjacent face, if any
    pub second_face: Option<usize>,
}

impl Edge {
    /// Whether the edge lies on the patch contour
    pub fn is_boundary(&self) -> bool {
        self.second_face.is_none()
    }
}

/// A contour edge with its length and outward unit normal in the patch plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryEdge {
    /// End nodes
    pub nodes: [usize; 2],
    /// Edge length
    pub length: f64,
    /// Outward unit normal `(n1, n2)`
    pub normal: [f64; 2],
}

/// Collect the edges of `faces` in discovery order (four per quad)
pub fn extract_edges(faces: &[[usize; 4]]) -> Result<Vec<Edge>> {
    let mut edges: Vec<Edge> = Vec::with_capacity(2 * faces.len() + 2);
    let mut lookup: HashMap<(usize, usize), usize> = HashMap::with_capacity(2 * faces.len() + 2);

    for (face, nodes) in faces.iter().enumerate() {
        for k in 0..4 {
            let (a, b) = (nodes[k], nodes[(k + 1) % 4]);
            let key = (a.min(b), a.max(b));
            match lookup.get(&key) {
                Some(&index) => {
                    let edge = &mut edges[index];
                    if edge.second_face.is_some() {
                        return Err(MeshError::NonManifoldEdge { nodes: edge.nodes });
                    }
                    edge.second_face = Some(face);
                }
                None => {
                    lookup.insert(key, edges.len());
                    edges.push(Edge {
                        nodes: [a, b],
                        first_face: face,
                        second_face: None,
                    });
                }
            }
        }
    }
    Ok(edges)
}

/// Length and outward normal of every contour edge, in discovery order.
///
/// The normal is the vector from the adjacent face centroid to the edge
/// midpoint with its component along the edge removed.
pub fn boundary_edges(
    local: &[[f64; 2]],
    faces: &[[usize; 4]],
    edges: &[Edge],
) -> Result<Vec<BoundaryEdge>> {
    let mut out = Vec::new();
    for edge in edges.iter().filter(|e| e.is_boundary()) {
        let [a, b] = edge.nodes.map(|n| local[n]);
        let d = [b[0] - a[0], b[1] - a[1]];
        let length = d[0].hypot(d[1]);

        let face = faces[edge.first_face];
        let centre = face.iter().fold([0.0; 2], |acc, &n| {
            [acc[0] + 0.25 * local[n][0], acc[1] + 0.25 * local[n][1]]
        });
        let mut v = [0.5 * (a[0] + b[0]) - centre[0], 0.5 * (a[1] + b[1]) - centre[1]];

        let degenerate = MeshError::DegenerateBoundaryNormal { nodes: edge.nodes };
        if length == 0.0 || !length.is_finite() {
            return Err(degenerate);
        }
        let along = (v[0] * d[0] + v[1] * d[1]) / (length * length);
        v[0] -= along * d[0];
        v[1] -= along * d[1];
        let magnitude = v[0].hypot(v[1]);
        if magnitude <= 1e-12 * length {
            return Err(degenerate);
        }

        out.push(BoundaryEdge {
            nodes: edge.nodes,
            length,
            normal: [v[0] / magnitude, v[1] / magnitude],
        });
    }
    info!(
        "Patch contour: {} boundary edges out of {}",
        out.len(),
        edges.len()
    );
    Ok(out)
}
