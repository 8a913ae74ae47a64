//! Planar torus detection over dimension pairs
//!
//! For every (d1, d2) plane the anchor cloud is fitted with a torus whose
//! center is the projected centroid, major radius the mean projected
//! radius and minor radius the radius spread. Tori whose minor-radius
//! shells can touch contribute an abstract intersection curve.

use crate::anchors::AnchorStore;

/// Reported complexity budget per torus; never enumerated
pub const TORUS_COMPLEXITY_BUDGET: u64 = 1 << 40;

/// Number of interpolated points per intersection curve
const CURVE_SAMPLES: usize = 16;

/// Torus fitted to one dimension pair
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarTorus {
    /// Dimension pair spanning the plane
    pub d1: usize,
    pub d2: usize,
    pub center: (f64, f64),
    pub major_radius: f64,
    pub minor_radius: f64,
    pub frequency: f64,
    pub complexity_budget: u64,
}

/// Abstract intersection curve between two tori
#[derive(Debug, Clone)]
pub struct IntersectionCurve {
    pub torus_a: usize,
    pub torus_b: usize,
    pub points: Vec<(f64, f64)>,
}

/// Fit one torus per dimension pair from the anchor point embeddings
pub fn detect_tori(anchors: &AnchorStore, freqs: &[f64]) -> Vec<PlanarTorus> {
    let dims = freqs.len();
    let mut tori = Vec::new();
    if anchors.is_empty() {
        return tori;
    }

    for d1 in 0..dims {
        for d2 in (d1 + 1)..dims {
            let projected: Vec<(f64, f64)> = anchors
                .iter()
                .map(|a| (a.pos_q[d1], a.pos_q[d2]))
                .collect();
            let n = projected.len() as f64;

            let cx = projected.iter().map(|p| p.0).sum::<f64>() / n;
            let cy = projected.iter().map(|p| p.1).sum::<f64>() / n;

            let radii: Vec<f64> = projected
                .iter()
                .map(|p| ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt())
                .collect();
            let major = radii.iter().sum::<f64>() / n;
            let variance = radii.iter().map(|r| (r - major) * (r - major)).sum::<f64>() / n;
            let minor = variance.sqrt();

            tori.push(PlanarTorus {
                d1,
                d2,
                center: (cx, cy),
                major_radius: major,
                minor_radius: minor,
                frequency: (freqs[d1] + freqs[d2]) / 2.0,
                complexity_budget: TORUS_COMPLEXITY_BUDGET,
            });
        }
    }
    tori
}

/// Record an intersection curve for each torus pair whose center distance
/// lies within [|r1 - r2|, r1 + r2] of the minor radii
pub fn detect_intersection_curves(tori: &[PlanarTorus]) -> Vec<IntersectionCurve> {
    let mut curves = Vec::new();
    for i in 0..tori.len() {
        for j in (i + 1)..tori.len() {
            let a = &tori[i];
            let b = &tori[j];
            let dist = ((a.center.0 - b.center.0).powi(2) + (a.center.1 - b.center.1).powi(2))
                .sqrt();
            let lo = (a.minor_radius - b.minor_radius).abs();
            let hi = a.minor_radius + b.minor_radius;
            if dist >= lo && dist <= hi && hi > 0.0 {
                curves.push(IntersectionCurve {
                    torus_a: i,
                    torus_b: j,
                    points: interpolate_curve(a, b),
                });
            }
        }
    }
    curves
}

// linear blend between the two torus rims; the exact shape is at the
// analyzer's discretion
fn interpolate_curve(a: &PlanarTorus, b: &PlanarTorus) -> Vec<(f64, f64)> {
    (0..CURVE_SAMPLES)
        .map(|i| {
            let t = i as f64 / CURVE_SAMPLES as f64;
            let angle = t * std::f64::consts::TAU;
            let ax = a.center.0 + a.major_radius * angle.cos();
            let ay = a.center.1 + a.major_radius * angle.sin();
            let bx = b.center.0 + b.major_radius * angle.cos();
            let by = b.center.1 + b.major_radius * angle.sin();
            (ax * (1.0 - t) + bx * t, ay * (1.0 - t) + by * t)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::Embedder;
    use crate::math::bigint::BigInt256;
    use crate::math::curve::Curve;
    use crate::primes;

    fn store() -> AnchorStore {
        let curve = Curve::secp128r1();
        let embedder = Embedder::new(6, curve.coord_bytes());
        let mut store = AnchorStore::new();
        for i in 1..=20u64 {
            let k = BigInt256::from_u64(i * 997);
            store.add(k, curve.scalar_mul_base(&k), &embedder);
        }
        store
    }

    #[test]
    fn test_detect_tori_covers_all_pairs() {
        let freqs = primes::cache().frequency_table(6);
        let tori = detect_tori(&store(), &freqs);
        assert_eq!(tori.len(), 6 * 5 / 2);
        for t in &tori {
            assert!(t.major_radius >= 0.0);
            assert!(t.minor_radius >= 0.0);
            assert_eq!(t.complexity_budget, 1 << 40);
        }
    }

    #[test]
    fn test_detection_is_deterministic() {
        let freqs = primes::cache().frequency_table(6);
        let s = store();
        let a = detect_tori(&s, &freqs);
        let b = detect_tori(&s, &freqs);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_store_no_tori() {
        let freqs = primes::cache().frequency_table(6);
        assert!(detect_tori(&AnchorStore::new(), &freqs).is_empty());
    }

    #[test]
    fn test_intersection_curve_band() {
        let make = |cx: f64, minor: f64| PlanarTorus {
            d1: 0,
            d2: 1,
            center: (cx, 0.0),
            major_radius: 1.0,
            minor_radius: minor,
            frequency: 3.0,
            complexity_budget: TORUS_COMPLEXITY_BUDGET,
        };
        // centers 1.0 apart, minor radii 0.6 + 0.6 -> touchable
        let touching = [make(0.0, 0.6), make(1.0, 0.6)];
        assert_eq!(detect_intersection_curves(&touching).len(), 1);

        // centers too far apart for the shells
        let apart = [make(0.0, 0.1), make(5.0, 0.1)];
        assert!(detect_intersection_curves(&apart).is_empty());
    }
}
