//! Shared vertex and face detection, Platonic overlay
//!
//! A vertex is shared when two or more anchor embeddings coincide within a
//! tolerance; a face needs three or more shared vertices close together.
//! The Platonic overlay contributes the 50 canonical solid vertices as
//! reference positions for the same detection pass.

use crate::anchors::{euclidean, AnchorStore};

/// Default co-location tolerance in embedding space
pub const VERTEX_TOLERANCE: f64 = 1e-6;

/// Anchors co-located at one embedding position
#[derive(Debug, Clone)]
pub struct SharedVertex {
    pub position: Vec<f64>,
    pub anchor_indices: Vec<usize>,
    /// Fraction of all anchors co-located here
    pub confidence: f64,
}

/// Three or more shared vertices spanning a face
#[derive(Debug, Clone)]
pub struct SharedFace {
    pub vertex_indices: Vec<usize>,
    pub confidence: f64,
}

/// Group anchors into shared vertices by greedy co-location
pub fn detect_shared_vertices(anchors: &AnchorStore, tolerance: f64) -> Vec<SharedVertex> {
    let total = anchors.len();
    let mut assigned = vec![false; total];
    let mut vertices = Vec::new();

    for i in 0..total {
        if assigned[i] {
            continue;
        }
        let pos_i = &anchors.get(i).expect("index in range").pos_q;
        let mut members = vec![i];
        for j in (i + 1)..total {
            if assigned[j] {
                continue;
            }
            let pos_j = &anchors.get(j).expect("index in range").pos_q;
            if euclidean(pos_i, pos_j) <= tolerance {
                members.push(j);
            }
        }
        if members.len() >= 2 {
            for &m in &members {
                assigned[m] = true;
            }
            vertices.push(SharedVertex {
                position: pos_i.clone(),
                confidence: members.len() as f64 / total as f64,
                anchor_indices: members,
            });
        }
    }
    vertices
}

/// Faces spanned by triples of shared vertices within 10x the vertex
/// tolerance of each other
pub fn detect_shared_faces(vertices: &[SharedVertex], tolerance: f64) -> Vec<SharedFace> {
    let face_tol = tolerance * 10.0;
    let mut faces = Vec::new();
    for i in 0..vertices.len() {
        for j in (i + 1)..vertices.len() {
            if euclidean(&vertices[i].position, &vertices[j].position) > face_tol {
                continue;
            }
            for k in (j + 1)..vertices.len() {
                if euclidean(&vertices[i].position, &vertices[k].position) <= face_tol
                    && euclidean(&vertices[j].position, &vertices[k].position) <= face_tol
                {
                    let confidence = (vertices[i].confidence
                        + vertices[j].confidence
                        + vertices[k].confidence)
                        / 3.0;
                    faces.push(SharedFace {
                        vertex_indices: vec![i, j, k],
                        confidence,
                    });
                }
            }
        }
    }
    faces
}

/// The five Platonic solids
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatonicSolid {
    Tetrahedron,
    Cube,
    Octahedron,
    Dodecahedron,
    Icosahedron,
}

impl PlatonicSolid {
    /// Canonical unnormalized vertex coordinates
    pub fn vertices(&self) -> Vec<[f64; 3]> {
        let phi = (1.0 + 5.0f64.sqrt()) / 2.0;
        let inv = 1.0 / phi;
        match self {
            PlatonicSolid::Tetrahedron => vec![
                [1.0, 1.0, 1.0],
                [1.0, -1.0, -1.0],
                [-1.0, 1.0, -1.0],
                [-1.0, -1.0, 1.0],
            ],
            PlatonicSolid::Cube => {
                let mut v = Vec::with_capacity(8);
                for &x in &[-1.0, 1.0] {
                    for &y in &[-1.0, 1.0] {
                        for &z in &[-1.0, 1.0] {
                            v.push([x, y, z]);
                        }
                    }
                }
                v
            }
            PlatonicSolid::Octahedron => vec![
                [1.0, 0.0, 0.0],
                [-1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, -1.0, 0.0],
                [0.0, 0.0, 1.0],
                [0.0, 0.0, -1.0],
            ],
            PlatonicSolid::Dodecahedron => {
                let mut v = Vec::with_capacity(20);
                for &x in &[-1.0, 1.0] {
                    for &y in &[-1.0, 1.0] {
                        for &z in &[-1.0, 1.0] {
                            v.push([x, y, z]);
                        }
                    }
                }
                for &a in &[-phi, phi] {
                    for &b in &[-inv, inv] {
                        v.push([0.0, a, b]);
                        v.push([b, 0.0, a]);
                        v.push([a, b, 0.0]);
                    }
                }
                v
            }
            PlatonicSolid::Icosahedron => {
                let mut v = Vec::with_capacity(12);
                for &a in &[-1.0, 1.0] {
                    for &b in &[-phi, phi] {
                        v.push([0.0, a, b]);
                        v.push([a, b, 0.0]);
                        v.push([b, 0.0, a]);
                    }
                }
                v
            }
        }
    }
}

/// Coarse alignment radius for overlay matching; overlay vertices are
/// reference positions, not exact embeddings
pub const OVERLAY_TOLERANCE: f64 = 0.25;

/// Shared vertices seeded from the Platonic overlay: each overlay vertex
/// collects the anchors within the coarse radius
pub fn detect_overlay_vertices(anchors: &AnchorStore, dims: usize) -> Vec<SharedVertex> {
    let total = anchors.len();
    if total == 0 {
        return Vec::new();
    }
    platonic_overlay(dims)
        .into_iter()
        .filter_map(|position| {
            let members: Vec<usize> = anchors
                .iter()
                .filter(|a| euclidean(&a.pos_q, &position) <= OVERLAY_TOLERANCE)
                .map(|a| a.index)
                .collect();
            if members.is_empty() {
                None
            } else {
                Some(SharedVertex {
                    position,
                    confidence: members.len() as f64 / total as f64,
                    anchor_indices: members,
                })
            }
        })
        .collect()
}

/// All 50 overlay vertices, tiled out to `dims` components by cycling the
/// three coordinates
pub fn platonic_overlay(dims: usize) -> Vec<Vec<f64>> {
    let solids = [
        PlatonicSolid::Tetrahedron,
        PlatonicSolid::Cube,
        PlatonicSolid::Octahedron,
        PlatonicSolid::Dodecahedron,
        PlatonicSolid::Icosahedron,
    ];
    solids
        .iter()
        .flat_map(|s| s.vertices())
        .map(|v| (0..dims).map(|d| v[d % 3]).collect())
        .collect()
}
