//! Prime-indexed lattice embedder
//!
//! Maps scalars and curve points into ℝ^D through the π·φ projection:
//! prime frequencies modulate a golden-ratio-damped cosine per dimension.
//! The map is deterministic and bounded (|pos[d]| ≤ Φ^4 + Φ^4/2) but not
//! injective. A Babylonian clock view of the same angle feeds the
//! clock-recovery heuristics.

use std::f64::consts::{PI, TAU};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::math::bigint::BigInt256;
use crate::math::constants::{CLOCK_RADIUS_THRESHOLDS, CLOCK_RINGS, PHI, PI_PHI};
use crate::math::curve::Point;
use crate::primes;

/// Auxiliary clock view of an embedding angle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClockPosition {
    /// Ring index, innermost first (sizes 12, 60, 60, 100)
    pub ring: usize,
    /// Slot on the ring
    pub position: u32,
    /// Angle in [0, 2π)
    pub angle: f64,
    /// One of 0.25, 0.50, 0.75, 1.00
    pub normalized_radius: f64,
}

/// Scalar/point to ℝ^D projection with a fixed frequency table
#[derive(Debug, Clone)]
pub struct Embedder {
    dims: usize,
    /// Coordinate width in bytes of the curve in use
    coord_bytes: usize,
    freqs: Vec<f64>,
}

impl Embedder {
    pub fn new(dims: usize, coord_bytes: usize) -> Self {
        let freqs = primes::cache().frequency_table(dims);
        Embedder {
            dims,
            coord_bytes,
            freqs,
        }
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    /// π·φ scalar projection: θ = k·π·(1+√5),
    /// pos[d] = cos(θ·φ[d]) · Φ^(d mod 5)
    pub fn embed_scalar(&self, k: &BigInt256) -> Vec<f64> {
        let theta = k.low_u64() as f64 * PI_PHI;
        (0..self.dims)
            .map(|d| {
                let arg = (theta * self.freqs[d]).rem_euclid(TAU);
                arg.cos() * PHI.powi((d % 5) as i32)
            })
            .collect()
    }

    /// Point projection from the top 16 hex nibbles of each affine
    /// coordinate. The identity has no coordinates; it embeds to the zero
    /// vector with a single warning.
    pub fn embed_point(&self, point: &Point) -> Vec<f64> {
        let (x, y) = match point.affine() {
            Some(coords) => coords,
            None => {
                warn!("point embedding fell back to the zero vector (identity point)");
                return vec![0.0; self.dims];
            }
        };
        let x_val = self.top_word(&x);
        let y_val = self.top_word(&y);

        let x_rad = (x_val % 360) as f64 * PI / 180.0;
        let y_rad = (y_val % 360) as f64 * PI / 180.0;

        (0..self.dims)
            .map(|d| {
                let cx = (x_rad * self.freqs[d]).rem_euclid(TAU).cos();
                let sy = (y_rad * self.freqs[d]).rem_euclid(TAU).sin();
                cx * PHI.powi((d % 5) as i32) + 0.5 * sy * PHI.powi(((d + 1) % 5) as i32)
            })
            .collect()
    }

    /// Top 8 bytes of the coordinate at the curve's byte width
    fn top_word(&self, coord: &BigInt256) -> u64 {
        let mut buf = vec![0u8; self.coord_bytes.max(8)];
        coord.write_bytes_be(&mut buf);
        let mut word = [0u8; 8];
        word.copy_from_slice(&buf[..8]);
        u64::from_be_bytes(word)
    }

    /// Embedding angle of a scalar, before per-dimension modulation
    pub fn scalar_angle(&self, k: &BigInt256) -> f64 {
        (k.low_u64() as f64 * PI_PHI).rem_euclid(TAU)
    }
}

/// Map an angle and a radial coordinate onto the Babylonian clock:
/// four concentric rings of sizes (12, 60, 60, 100), equal-arc slots.
pub fn clock_position(theta: f64, radius: f64) -> ClockPosition {
    let angle = theta.rem_euclid(TAU);
    let r = radius.clamp(0.0, 1.0);

    let ring = CLOCK_RADIUS_THRESHOLDS
        .iter()
        .position(|&t| r < t)
        .unwrap_or(CLOCK_RINGS.len() - 1);
    let size = CLOCK_RINGS[ring];
    let position = ((angle / TAU) * size as f64) as u32 % size;
    let normalized_radius = 0.25 * (ring as f64 + 1.0);

    ClockPosition {
        ring,
        position,
        angle,
        normalized_radius,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::curve::Curve;

    fn embedder() -> Embedder {
        Embedder::new(13, Curve::secp128r1().coord_bytes())
    }

    #[test]
    fn test_scalar_embedding_deterministic() {
        let e = embedder();
        let k = BigInt256::from_u64(123_456_789);
        let a = e.embed_scalar(&k);
        let b = e.embed_scalar(&k);
        assert_eq!(a, b);
        assert_eq!(a.len(), 13);
        let bound = PHI.powi(4) + 1e-9;
        for v in &a {
            assert!(v.is_finite());
            assert!(v.abs() <= bound);
        }
    }

    #[test]
    fn test_scalar_embedding_uses_full_low_word() {
        // scalars differing only above bit 32 must project differently
        let e = embedder();
        let low = BigInt256::from_u64(5);
        let high = BigInt256::from_u64((1u64 << 32) + 5);
        assert_ne!(e.embed_scalar(&low), e.embed_scalar(&high));
        assert_ne!(e.scalar_angle(&low), e.scalar_angle(&high));
    }

    #[test]
    fn test_point_embedding_bounded() {
        let curve = Curve::secp128r1();
        let e = embedder();
        let q = curve.scalar_mul_base(&BigInt256::from_u64(42));
        let pos = e.embed_point(&q);
        assert_eq!(pos.len(), 13);
        let bound = PHI.powi(4) * 1.5 + 1e-9;
        for v in &pos {
            assert!(v.is_finite());
            assert!(v.abs() <= bound);
        }
        assert_eq!(pos, e.embed_point(&q));
    }

    #[test]
    fn test_identity_point_embeds_to_zero() {
        let e = embedder();
        assert_eq!(e.embed_point(&Point::infinity()), vec![0.0; 13]);
    }

    #[test]
    fn test_clock_rings() {
        let inner = clock_position(0.1, 0.1);
        assert_eq!(inner.ring, 0);
        assert_eq!(inner.normalized_radius, 0.25);

        let outer = clock_position(0.1, 0.95);
        assert_eq!(outer.ring, 3);
        assert_eq!(outer.normalized_radius, 1.0);

        // a full turn wraps to slot zero
        let wrapped = clock_position(TAU + 0.01, 0.5);
        assert_eq!(wrapped.ring, 1);
        assert!(wrapped.position < 60);
    }
}
