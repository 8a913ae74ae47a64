//! Anchor triangulation
//!
//! Interpolates a candidate scalar from the three nearest anchors with
//! inverse-square-distance weights. Two lanes share the weighted
//! accumulation: `triangulate` returns the plain reduced sum, while
//! `triangulate_k_with_truncation` reverses the byte order of the extended
//! accumulator (one byte past the order width, at most 33 bytes) before
//! reducing modulo n. The reversal exercises the +1-bit boundary crossing
//! and is a fixed behavioral contract.

use log::trace;

use crate::anchors::{euclidean, AnchorStore};
use crate::math::bigint::{BigInt256, BigInt512};
use crate::math::constants::{EXTENDED_BYTES, WEIGHT_SCALE};

/// Distance guard against division by zero
const EPSILON: f64 = 1e-10;

/// Squared-distance threshold below which a target counts as an exact
/// position hit
const EXACT_HIT: f64 = 1e-18;

struct WeightedAnchors {
    indices: Vec<usize>,
    weights: Vec<f64>,
    nearest_dist2: f64,
}

fn weighted_nearest(target_pos: &[f64], anchors: &AnchorStore) -> Option<WeightedAnchors> {
    let indices = anchors.k_nearest(target_pos, 3);
    if indices.is_empty() {
        return None;
    }

    let dist2: Vec<f64> = indices
        .iter()
        .map(|&i| {
            let d = euclidean(&anchors.get(i).expect("index from k_nearest").pos_q, target_pos);
            d * d
        })
        .collect();

    let raw: Vec<f64> = dist2.iter().map(|d2| 1.0 / (d2 + EPSILON)).collect();
    let total: f64 = raw.iter().sum();
    let weights: Vec<f64> = raw.iter().map(|w| w / total).collect();

    Some(WeightedAnchors {
        nearest_dist2: dist2[0],
        indices,
        weights,
    })
}

/// Fixed-point weighted sum of the selected anchor scalars, left at the
/// extended width. The weighted sum of reduced scalars stays below n, so
/// the 257-bit buffer only ever crosses 2^256 through the reversal lane.
fn weighted_sum(selected: &WeightedAnchors, anchors: &AnchorStore) -> BigInt512 {
    let mut acc = BigInt512::zero();
    for (&idx, &w) in selected.indices.iter().zip(&selected.weights) {
        let anchor = anchors.get(idx).expect("index from k_nearest");
        let w_scaled = (w * WEIGHT_SCALE as f64) as u64;
        acc.add_assign(&anchor.k.mul_u64_wide(w_scaled));
    }
    acc.div_u64(WEIGHT_SCALE)
}

/// Plain triangulation lane: weighted interpolation reduced modulo n.
/// An exact position hit short-circuits to that anchor's scalar, which
/// bounds the rounding error at zero there and at k/WEIGHT_SCALE + 3
/// elsewhere. None when the store is empty.
pub fn triangulate(
    target_pos: &[f64],
    anchors: &AnchorStore,
    n: &BigInt256,
) -> Option<BigInt256> {
    let selected = weighted_nearest(target_pos, anchors)?;

    if selected.nearest_dist2 <= EXACT_HIT {
        let anchor = anchors.get(selected.indices[0]).expect("index from k_nearest");
        trace!("triangulation exact hit on anchor {}", anchor.index);
        return Some(anchor.k.rem(n));
    }

    Some(weighted_sum(&selected, anchors).rem(n))
}

/// Truncation lane: the weighted sum is serialized into the order-width
/// extended buffer, the byte order is reversed, and only then is the value
/// reduced modulo n. Reverse first, reduce second; the order is load-bearing.
pub fn triangulate_k_with_truncation(
    target_pos: &[f64],
    anchors: &AnchorStore,
    n: &BigInt256,
) -> Option<BigInt256> {
    let selected = weighted_nearest(target_pos, anchors)?;
    let sum = weighted_sum(&selected, anchors);
    Some(reverse_and_reduce(&sum.to_bigint256(), n))
}

/// Width of the extended buffer for a given modulus: one byte past the
/// order width, capped at EXTENDED_BYTES for 256-bit moduli
pub fn extended_width(n: &BigInt256) -> usize {
    ((n.bit_length() + 8) / 8).min(EXTENDED_BYTES)
}

/// The reversal step in isolation: serialize into the order-width extended
/// buffer big-endian, reverse the buffer, reduce modulo n
pub fn reverse_and_reduce(value: &BigInt256, n: &BigInt256) -> BigInt256 {
    let mut buf = [0u8; EXTENDED_BYTES];
    let width = extended_width(n);
    value.write_bytes_be(&mut buf[..width]);
    buf[..width].reverse();
    BigInt512::from_bytes_be(&buf[..width]).rem(n)
}
