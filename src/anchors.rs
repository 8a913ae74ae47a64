//! Anchor store
//!
//! Owns the known (k, Q) pairs and their embeddings for the life of a
//! recovery context. Anchors are immutable once added; indices returned by
//! nearest-neighbor queries stay valid as the store grows.

use log::debug;

use crate::embedding::Embedder;
use crate::math::bigint::BigInt256;
use crate::math::curve::Point;

/// One known (k, Q) pair with both embeddings
#[derive(Debug, Clone)]
pub struct Anchor {
    pub k: BigInt256,
    pub q: Point,
    pub pos_k: Vec<f64>,
    pub pos_q: Vec<f64>,
    pub index: usize,
}

/// Summary statistics over the stored anchor embeddings
#[derive(Debug, Clone)]
pub struct AnchorStatistics {
    pub centroid: Vec<f64>,
    pub variance: Vec<f64>,
    pub min_pair_distance: f64,
    pub max_pair_distance: f64,
    pub avg_pair_distance: f64,
}

/// Append-only anchor collection with k-nearest queries in embedding space
#[derive(Debug, Default)]
pub struct AnchorStore {
    anchors: Vec<Anchor>,
}

/// Euclidean distance in ℝ^D
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

impl AnchorStore {
    pub fn new() -> Self {
        AnchorStore {
            anchors: Vec::new(),
        }
    }

    /// Embed and append one (k, Q) pair; returns its index
    pub fn add(&mut self, k: BigInt256, q: Point, embedder: &Embedder) -> usize {
        let index = self.anchors.len();
        let pos_k = embedder.embed_scalar(&k);
        let pos_q = embedder.embed_point(&q);
        self.anchors.push(Anchor {
            k,
            q,
            pos_k,
            pos_q,
            index,
        });
        index
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Anchor> {
        self.anchors.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Anchor> {
        self.anchors.iter()
    }

    /// Indices of the `count` anchors closest to `target_pos` by the
    /// point-embedding distance. Ties break toward earlier insertion.
    pub fn k_nearest(&self, target_pos: &[f64], count: usize) -> Vec<usize> {
        let mut scored: Vec<(f64, usize)> = self
            .anchors
            .iter()
            .map(|a| (euclidean(&a.pos_q, target_pos), a.index))
            .collect();
        // stable sort keeps insertion order among equal distances
        scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.into_iter().take(count).map(|(_, i)| i).collect()
    }

    /// Centroid, per-dimension variance and a pairwise-distance summary of
    /// the point embeddings; None when the store is empty
    pub fn statistics(&self) -> Option<AnchorStatistics> {
        if self.anchors.is_empty() {
            return None;
        }
        let dims = self.anchors[0].pos_q.len();
        let n = self.anchors.len() as f64;

        let mut centroid = vec![0.0; dims];
        for a in &self.anchors {
            for (c, v) in centroid.iter_mut().zip(&a.pos_q) {
                *c += v;
            }
        }
        for c in centroid.iter_mut() {
            *c /= n;
        }

        let mut variance = vec![0.0; dims];
        for a in &self.anchors {
            for d in 0..dims {
                let diff = a.pos_q[d] - centroid[d];
                variance[d] += diff * diff;
            }
        }
        for v in variance.iter_mut() {
            *v /= n;
        }

        let mut min_d = f64::INFINITY;
        let mut max_d: f64 = 0.0;
        let mut sum_d = 0.0;
        let mut pairs = 0u64;
        for i in 0..self.anchors.len() {
            for j in (i + 1)..self.anchors.len() {
                let d = euclidean(&self.anchors[i].pos_q, &self.anchors[j].pos_q);
                min_d = min_d.min(d);
                max_d = max_d.max(d);
                sum_d += d;
                pairs += 1;
            }
        }
        let avg = if pairs > 0 { sum_d / pairs as f64 } else { 0.0 };
        if pairs == 0 {
            min_d = 0.0;
        }

        debug!(
            "anchor stats: {} anchors, pair distance min {:.4} max {:.4} avg {:.4}",
            self.anchors.len(),
            min_d,
            max_d,
            avg
        );

        Some(AnchorStatistics {
            centroid,
            variance,
            min_pair_distance: min_d,
            max_pair_distance: max_d,
            avg_pair_distance: avg,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::curve::Curve;

    fn store_with(n: u64) -> (AnchorStore, Embedder, Curve) {
        let curve = Curve::secp128r1();
        let embedder = Embedder::new(13, curve.coord_bytes());
        let mut store = AnchorStore::new();
        for i in 1..=n {
            let k = BigInt256::from_u64(i * 1000 + 7);
            let q = curve.scalar_mul_base(&k);
            store.add(k, q, &embedder);
        }
        (store, embedder, curve)
    }

    #[test]
    fn test_add_increments_and_preserves_indices() {
        let (mut store, embedder, curve) = store_with(5);
        assert_eq!(store.len(), 5);
        let before: Vec<usize> = (0..5).collect();
        let k = BigInt256::from_u64(99);
        store.add(k, curve.scalar_mul_base(&k), &embedder);
        assert_eq!(store.len(), 6);
        for i in before {
            assert_eq!(store.get(i).unwrap().index, i);
        }
    }

    #[test]
    fn test_k_nearest_finds_self() {
        let (store, _, _) = store_with(10);
        let target = store.get(3).unwrap().pos_q.clone();
        let nearest = store.k_nearest(&target, 3);
        assert_eq!(nearest[0], 3);
        assert_eq!(nearest.len(), 3);
    }

    #[test]
    fn test_k_nearest_tie_breaks_by_insertion() {
        let curve = Curve::secp128r1();
        let embedder = Embedder::new(13, curve.coord_bytes());
        let mut store = AnchorStore::new();
        // same Q twice: identical embeddings, earlier index must win
        let k = BigInt256::from_u64(77);
        let q = curve.scalar_mul_base(&k);
        store.add(k, q, &embedder);
        store.add(BigInt256::from_u64(78), q, &embedder);
        let target = store.get(0).unwrap().pos_q.clone();
        assert_eq!(store.k_nearest(&target, 2), vec![0, 1]);
    }

    #[test]
    fn test_statistics() {
        let (store, _, _) = store_with(8);
        let stats = store.statistics().unwrap();
        assert_eq!(stats.centroid.len(), 13);
        assert!(stats.min_pair_distance <= stats.avg_pair_distance);
        assert!(stats.avg_pair_distance <= stats.max_pair_distance);
        assert!(AnchorStore::new().statistics().is_none());
    }
}
