//! Geometric analyzer
//!
//! Derives every geometric structure from the anchor set in one
//! `initialize` pass: planar tori over dimension pairs, shared
//! vertices/faces, torus intersection curves, tetration attractors and the
//! kissing-sphere hierarchy. Re-running on an unchanged anchor set yields
//! identical counts.

pub mod fractal;
pub mod quadrant;
pub mod spheres;
pub mod tetration;
pub mod torus;
pub mod vertices;

use log::info;

use crate::anchors::AnchorStore;
use crate::config::EngineConfig;
use crate::primes;

pub use fractal::{partition_bounds, reduce_entropy, FractalPartition};
pub use quadrant::{fold, FoldedPosition, Quadrant};
pub use spheres::{KissingSphere, SphereArena};
pub use tetration::{default_attractors, TetrationAttractor};
pub use torus::{IntersectionCurve, PlanarTorus};
pub use vertices::{platonic_overlay, SharedFace, SharedVertex};

/// All derived structures, owned by the recovery context
#[derive(Debug, Clone, Default)]
pub struct GeometricStructures {
    pub tori: Vec<PlanarTorus>,
    pub shared_vertices: Vec<SharedVertex>,
    pub shared_faces: Vec<SharedFace>,
    pub intersection_curves: Vec<IntersectionCurve>,
    pub attractors: Vec<TetrationAttractor>,
    pub sphere_arena: SphereArena,
    /// Anchor census after folding the first two embedding dimensions,
    /// indexed I..IV
    pub quadrant_counts: [usize; 4],
}

impl GeometricStructures {
    pub fn counts(&self) -> (usize, usize, usize, usize, usize) {
        (
            self.tori.len(),
            self.shared_vertices.len(),
            self.shared_faces.len(),
            self.intersection_curves.len(),
            self.attractors.len(),
        )
    }
}

/// Run the full analysis pass
pub fn initialize(anchors: &AnchorStore, config: &EngineConfig) -> GeometricStructures {
    let freqs = primes::cache().frequency_table(config.num_dimensions);

    let tori = torus::detect_tori(anchors, &freqs);
    let mut shared_vertices =
        vertices::detect_shared_vertices(anchors, vertices::VERTEX_TOLERANCE);
    shared_vertices.extend(vertices::detect_overlay_vertices(
        anchors,
        config.num_dimensions,
    ));
    let shared_faces =
        vertices::detect_shared_faces(&shared_vertices, vertices::VERTEX_TOLERANCE);
    let intersection_curves = torus::detect_intersection_curves(&tori);
    let attractors = tetration::build_attractors(
        &config.bases,
        &config.heights,
        config.damping,
        tetration::TETRATION_MODULUS,
    );
    let sphere_arena = SphereArena::build(anchors, config.max_recursion_depth);

    let mut quadrant_counts = [0usize; 4];
    for anchor in anchors.iter() {
        if anchor.pos_q.len() >= 2 {
            let folded = quadrant::fold(anchor.pos_q[0], anchor.pos_q[1]);
            quadrant_counts[folded.source as usize] += 1;
        }
    }

    let structures = GeometricStructures {
        tori,
        shared_vertices,
        shared_faces,
        intersection_curves,
        attractors,
        sphere_arena,
        quadrant_counts,
    };
    let (t, v, f, c, a) = structures.counts();
    info!(
        "geometry initialized: {} tori, {} shared vertices, {} faces, {} curves, {} attractors",
        t, v, f, c, a
    );
    structures
}
