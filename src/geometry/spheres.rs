//! Kissing-sphere hierarchy
//!
//! Spheres live in a flat arena and refer to neighbors by index, which
//! keeps the hierarchy acyclic and single-owner. Each sphere kisses at
//! most twelve neighbors, matching the 3D kissing number; depth is bounded
//! by configuration.

use crate::anchors::{euclidean, AnchorStore};

/// Maximum neighbors per sphere
pub const KISSING_NUMBER: usize = 12;

/// One sphere record; neighbors are arena indices
#[derive(Debug, Clone)]
pub struct KissingSphere {
    pub center: Vec<f64>,
    pub radius: f64,
    pub depth: u32,
    pub neighbors: Vec<usize>,
    pub position3: [f64; 3],
    pub is_anchor: bool,
    pub confidence: f64,
}

/// Flat arena of spheres; index 0 is the root
#[derive(Debug, Clone, Default)]
pub struct SphereArena {
    pub spheres: Vec<KissingSphere>,
    pub max_depth: u32,
}

impl SphereArena {
    /// Build the hierarchy from the anchor cloud: the root sits at the
    /// centroid, each level attaches up to twelve nearest anchors as
    /// kissing neighbors at half the parent radius.
    pub fn build(anchors: &AnchorStore, max_depth: u32) -> Self {
        let mut arena = SphereArena {
            spheres: Vec::new(),
            max_depth,
        };
        let stats = match anchors.statistics() {
            Some(s) => s,
            None => return arena,
        };

        let root_radius = stats.max_pair_distance.max(1e-9) / 2.0;
        arena.spheres.push(KissingSphere {
            center: stats.centroid.clone(),
            radius: root_radius,
            depth: 0,
            neighbors: Vec::new(),
            position3: project3(&stats.centroid),
            is_anchor: false,
            confidence: 1.0,
        });

        let mut frontier = vec![0usize];
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for parent in frontier {
                next.extend(arena.attach_level(anchors, parent, max_depth));
            }
            frontier = next;
        }
        arena
    }

    fn attach_level(&mut self, anchors: &AnchorStore, parent: usize, max_depth: u32) -> Vec<usize> {
        let depth = self.spheres[parent].depth + 1;
        if depth > max_depth {
            return Vec::new();
        }
        let center = self.spheres[parent].center.clone();
        let radius = self.spheres[parent].radius / 2.0;

        let mut attached = Vec::new();
        let nearest = anchors.k_nearest(&center, KISSING_NUMBER);
        for idx in nearest {
            let anchor = match anchors.get(idx) {
                Some(a) => a,
                None => continue,
            };
            let dist = euclidean(&anchor.pos_q, &center);
            // an anchor sphere's nearest anchor is itself; don't re-attach it
            if dist == 0.0 && self.spheres[parent].is_anchor {
                continue;
            }
            let sphere_index = self.spheres.len();
            self.spheres.push(KissingSphere {
                center: anchor.pos_q.clone(),
                radius,
                depth,
                neighbors: vec![parent],
                position3: project3(&anchor.pos_q),
                is_anchor: true,
                confidence: 1.0 / (1.0 + dist),
            });
            if self.spheres[parent].neighbors.len() < KISSING_NUMBER {
                self.spheres[parent].neighbors.push(sphere_index);
            }
            attached.push(sphere_index);
        }
        attached
    }

    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }
}

// first three embedding components as the 3D view
fn project3(pos: &[f64]) -> [f64; 3] {
    let mut out = [0.0; 3];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = pos.get(i).copied().unwrap_or(0.0);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::Embedder;
    use crate::math::bigint::BigInt256;
    use crate::math::curve::Curve;

    fn store(n: u64) -> AnchorStore {
        let curve = Curve::secp128r1();
        let embedder = Embedder::new(13, curve.coord_bytes());
        let mut store = AnchorStore::new();
        for i in 1..=n {
            let k = BigInt256::from_u64(i * 7919);
            store.add(k, curve.scalar_mul_base(&k), &embedder);
        }
        store
    }

    #[test]
    fn test_arena_respects_kissing_number() {
        let arena = SphereArena::build(&store(30), 2);
        assert!(!arena.is_empty());
        for sphere in &arena.spheres {
            assert!(sphere.neighbors.len() <= KISSING_NUMBER);
            assert!(sphere.depth <= 2);
            // neighbor indices stay inside the arena
            for &n in &sphere.neighbors {
                assert!(n < arena.len());
            }
        }
    }

    #[test]
    fn test_root_is_centroid() {
        let s = store(10);
        let stats = s.statistics().unwrap();
        let arena = SphereArena::build(&s, 1);
        assert_eq!(arena.spheres[0].center, stats.centroid);
        assert!(!arena.spheres[0].is_anchor);
    }

    #[test]
    fn test_hierarchy_reaches_configured_depth() {
        let arena = SphereArena::build(&store(30), 3);
        let deepest = arena.spheres.iter().map(|s| s.depth).max().unwrap();
        assert_eq!(deepest, 3);
        // every level below the cap is populated
        for d in 1..=3 {
            assert!(arena.spheres.iter().any(|s| s.depth == d));
        }
        // parent links from a deepest sphere walk back to the root
        let mut idx = arena
            .spheres
            .iter()
            .position(|s| s.depth == deepest)
            .unwrap();
        let mut steps = 0;
        while idx != 0 {
            idx = arena.spheres[idx].neighbors[0];
            steps += 1;
        }
        assert_eq!(steps, deepest);
    }

    #[test]
    fn test_empty_store_empty_arena() {
        assert!(SphereArena::build(&AnchorStore::new(), 3).is_empty());
    }
}
