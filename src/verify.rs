//! Candidate verification
//!
//! The authoritative success predicate: a candidate k is accepted iff
//! k·G equals the target point. The normalized point and scalar distances
//! are oscillation signals only, never success criteria.

use crate::math::bigint::BigInt256;
use crate::math::curve::{Curve, Point};

/// EC verification and distance measures bound to one curve
#[derive(Debug, Clone)]
pub struct Verifier {
    curve: Curve,
}

impl Verifier {
    pub fn new(curve: Curve) -> Self {
        Verifier { curve }
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    /// True iff candidate_k · G == target
    pub fn verify(&self, candidate_k: &BigInt256, target: &Point) -> bool {
        self.curve.scalar_mul_base(candidate_k) == *target
    }

    /// Normalized point distance in [0, 1]: XOR of the padded affine
    /// coordinates, differing bits over x and y counted against 2·bits(n).
    /// The identity is maximally distant from any finite point.
    pub fn point_distance(&self, q1: &Point, q2: &Point) -> f64 {
        match (q1.affine(), q2.affine()) {
            (None, None) => 0.0,
            (None, Some(_)) | (Some(_), None) => 1.0,
            (Some((x1, y1)), Some((x2, y2))) => {
                let width = self.curve.coord_bytes();
                let bits = hamming_bytes(&x1, &x2, width) + hamming_bytes(&y1, &y2, width);
                bits as f64 / (2.0 * self.curve.order_bits() as f64)
            }
        }
    }

    /// Normalized scalar Hamming distance in [0, 1]
    pub fn hamming_distance(&self, k1: &BigInt256, k2: &BigInt256) -> f64 {
        let width = self.curve.coord_bytes();
        hamming_bytes(k1, k2, width) as f64 / self.curve.order_bits() as f64
    }
}

fn hamming_bytes(a: &BigInt256, b: &BigInt256, width: usize) -> u32 {
    let mut buf_a = vec![0u8; width];
    let mut buf_b = vec![0u8; width];
    a.write_bytes_be(&mut buf_a);
    b.write_bytes_be(&mut buf_b);
    buf_a
        .iter()
        .zip(buf_b.iter())
        .map(|(x, y)| (x ^ y).count_ones())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_soundness() {
        let curve = Curve::secp128r1();
        let verifier = Verifier::new(curve.clone());
        let k = BigInt256::from_u64(123_456);
        let q = curve.scalar_mul_base(&k);

        assert!(verifier.verify(&k, &q));
        assert!(!verifier.verify(&(k + BigInt256::one()), &q));
    }

    #[test]
    fn test_point_distance_range() {
        let curve = Curve::secp128r1();
        let verifier = Verifier::new(curve.clone());
        let q1 = curve.scalar_mul_base(&BigInt256::from_u64(10));
        let q2 = curve.scalar_mul_base(&BigInt256::from_u64(9_999_999));

        assert_eq!(verifier.point_distance(&q1, &q1), 0.0);

        let d = verifier.point_distance(&q1, &q2);
        assert!(d > 0.0 && d <= 1.0);

        assert_eq!(verifier.point_distance(&Point::infinity(), &q1), 1.0);
        assert_eq!(
            verifier.point_distance(&Point::infinity(), &Point::infinity()),
            0.0
        );
    }

    #[test]
    fn test_hamming_distance() {
        let curve = Curve::secp128r1();
        let verifier = Verifier::new(curve);
        let a = BigInt256::from_u64(0b1010);
        let b = BigInt256::from_u64(0b0101);
        let d = verifier.hamming_distance(&a, &b);
        assert!((d - 4.0 / 128.0).abs() < 1e-12);
        assert_eq!(verifier.hamming_distance(&a, &a), 0.0);
    }
}
