//! Fractal partition bounds and entropy reduction
//!
//! Per-dimension bounds enclose the anchors plus the target position; the
//! partition size is reported as a power of two. `reduce_entropy` halves a
//! magnitude until it drops to the threshold, landing in (τ/2, τ].

use crate::anchors::AnchorStore;

/// Axis-aligned bounds with a power-of-two partition size
#[derive(Debug, Clone, PartialEq)]
pub struct FractalPartition {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub partition_size: u64,
}

/// Bounds over the anchors and the target position
pub fn partition_bounds(anchors: &AnchorStore, target_pos: &[f64]) -> FractalPartition {
    let dims = target_pos.len();
    let mut lower = target_pos.to_vec();
    let mut upper = target_pos.to_vec();
    for anchor in anchors.iter() {
        for d in 0..dims.min(anchor.pos_q.len()) {
            lower[d] = lower[d].min(anchor.pos_q[d]);
            upper[d] = upper[d].max(anchor.pos_q[d]);
        }
    }
    let cells = (anchors.len() + 1).next_power_of_two() as u64;
    FractalPartition {
        lower,
        upper,
        partition_size: cells,
    }
}

/// Halve `x` until it is at most `tau`. For x >= tau the result lies in
/// (tau/2, tau]; smaller inputs pass through unchanged.
pub fn reduce_entropy(mut x: f64, tau: f64) -> f64 {
    if tau <= 0.0 || !x.is_finite() {
        return x;
    }
    while x > tau {
        x /= 2.0;
    }
    x
}
