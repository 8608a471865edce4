//! Extraction of a quadrilateral boundary patch and its local frame

use super::FoamMesh;
use crate::error::{MeshError, Result};
use crate::geometry::{centroid, cross, dot, norm, scale, sub};
use log::{debug, info};

/// Tolerance on the magnitude of the averaged unit normal
const NORMAL_TOL: f64 = 1e-9;

/// Orthonormal patch frame `(t1, t2, n)` with its origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    /// First in-plane direction
    pub t1: [f64; 3],
    /// Second in-plane direction, `n x t1`
    pub t2: [f64; 3],
    /// Mean patch normal, pointing into the domain
    pub normal: [f64; 3],
    /// Centroid of the first node of every patch face
    pub origin: [f64; 3],
}

impl LocalFrame {
    /// Coordinates of `p` in the `(t1, t2)` plane
    pub fn project(&self, p: &[f64; 3]) -> [f64; 2] {
        let d = sub(p, &self.origin);
        [dot(&d, &self.t1), dot(&d, &self.t2)]
    }
}

/// A boundary patch compacted to the nodes its faces use
///
/// Node `i` of the patch is mesh point `global_ids[i]`; `global_ids` is
/// ascending. Faces keep their mesh orientation.
#[derive(Debug, Clone)]
pub struct PatchGeometry {
    /// Patch name
    pub name: String,
    /// Local reference frame
    pub frame: LocalFrame,
    /// Mesh point index of every patch node
    pub global_ids: Vec<usize>,
    /// 3D coordinates of the patch nodes
    pub points: Vec<[f64; 3]>,
    /// Coordinates of the patch nodes in the `(t1, t2)` plane
    pub local: Vec<[f64; 2]>,
    /// Quadrilateral faces in patch node numbering
    pub faces: Vec<[usize; 4]>,
}

/// Unit normal `-(l1 x l2)/|l1 x l2|` of a quad, `None` if degenerate
fn face_normal(x: [&[f64; 3]; 4]) -> Option<[f64; 3]> {
    let l1 = sub(x[1], x[0]);
    let l2 = sub(x[3], x[0]);
    let c = cross(&l1, &l2);
    let magnitude = norm(&c);
    if !magnitude.is_finite() || magnitude <= f64::EPSILON * norm(&l1) * norm(&l2) {
        return None;
    }
    Some(scale(&c, -1.0 / magnitude))
}

impl PatchGeometry {
    /// Extract patch `name` from `mesh`
    pub fn extract(mesh: &FoamMesh, name: &str) -> Result<Self> {
        let patch = mesh.patch(name)?;
        let start = patch.start_face;
        let end = match start.checked_add(patch.n_faces) {
            Some(end) if end <= mesh.faces.len() => end,
            _ => {
                return Err(MeshError::FaceRangeOutOfBounds {
                    patch: name.to_string(),
                    start,
                    end: start.saturating_add(patch.n_faces),
                    available: mesh.faces.len(),
                });
            }
        };
        if patch.n_faces == 0 {
            return Err(MeshError::EmptyPatch(name.to_string()));
        }

        let mut quads = Vec::with_capacity(patch.n_faces);
        for (face, nodes) in mesh.faces[start..end].iter().enumerate() {
            let face = start + face;
            let quad: [usize; 4] = nodes.as_slice().try_into().map_err(|_| MeshError::NonQuadFace {
                face,
                nodes: nodes.len(),
            })?;
            if let Some(&node) = quad.iter().find(|&&n| n >= mesh.points.len()) {
                return Err(MeshError::NodeOutOfRange {
                    face,
                    node,
                    available: mesh.points.len(),
                });
            }
            quads.push(quad);
        }

        let frame = local_frame(mesh, &quads, start, name)?;

        let mut global_ids: Vec<usize> = quads.iter().flatten().copied().collect();
        global_ids.sort_unstable();
        global_ids.dedup();

        let faces = quads
            .iter()
            .map(|quad| {
                quad.map(|g| {
                    // global_ids holds every node of `quads`
                    global_ids.binary_search(&g).unwrap_or_default()
                })
            })
            .collect();
        let points: Vec<[f64; 3]> = global_ids.iter().map(|&g| mesh.points[g]).collect();
        let local = points.iter().map(|p| frame.project(p)).collect();

        info!(
            "Patch '{name}': {} faces, {} nodes",
            quads.len(),
            global_ids.len()
        );
        debug!(
            "Patch frame t1={:?} t2={:?} n={:?} origin={:?}",
            frame.t1, frame.t2, frame.normal, frame.origin
        );

        Ok(Self {
            name: name.to_string(),
            frame,
            global_ids,
            points,
            local,
            faces,
        })
    }

    /// Number of patch nodes
    pub fn num_nodes(&self) -> usize {
        self.points.len()
    }

    /// Number of patch faces
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }
}

fn local_frame(
    mesh: &FoamMesh,
    quads: &[[usize; 4]],
    start: usize,
    name: &str,
) -> Result<LocalFrame> {
    let corners = |quad: &[usize; 4]| quad.map(|n| &mesh.points[n]);

    let mut sum = [0.0; 3];
    for (i, quad) in quads.iter().enumerate() {
        let n = face_normal(corners(quad)).ok_or(MeshError::DegenerateFace { face: start + i })?;
        for k in 0..3 {
            sum[k] += n[k];
        }
    }
    let mean = scale(&sum, 1.0 / quads.len() as f64);
    let magnitude = norm(&mean);
    if magnitude <= NORMAL_TOL {
        return Err(MeshError::DegenerateNormal(name.to_string()));
    }
    let normal = scale(&mean, 1.0 / magnitude);

    let first = corners(&quads[0]);
    let l1 = sub(first[1], first[0]);
    let in_plane = sub(&l1, &scale(&normal, dot(&l1, &normal)));
    let length = norm(&in_plane);
    if length <= f64::EPSILON * norm(&l1) || length == 0.0 {
        return Err(MeshError::DegenerateFace { face: start });
    }
    let t1 = scale(&in_plane, 1.0 / length);
    let t2 = cross(&normal, &t1);

    let origin = centroid(quads.iter().map(|q| &mesh.points[q[0]]));

    Ok(LocalFrame {
        t1,
        t2,
        normal,
        origin,
    })
}
