//! Recovery orchestrator
//!
//! Drives the end-to-end attempt: anchors in, geometric structures
//! initialized, then a candidate stream through the triangulator and
//! verifier. Candidate positions follow a seeded local random walk for the
//! first hundred iterations and a Halton low-discrepancy sequence after
//! that, with the verifier's point distance halving the step on
//! regressions. Instability past the configured threshold scales the
//! embedding dimension by 2 and the anchor budget by 10, up to max_scales.

use anyhow::{anyhow, Result};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::anchors::AnchorStore;
use crate::config::EngineConfig;
use crate::embedding::{self, ClockPosition, Embedder};
use crate::geometry::{self, GeometricStructures};
use crate::math::bigint::BigInt256;
use crate::math::curve::{Curve, Point};
use crate::oscillation;
use crate::tracker::MultiTorusTracker;
use crate::triangulate;
use crate::utils::logging::{
    log_anchor_stats, log_interval_reduction, log_scale_up, log_torus_summary, log_verification,
    PerformanceTimer, ProgressTracker,
};
use crate::verify::Verifier;

/// Iterations spent on the local random walk before Halton takes over
const WALK_ITERATIONS: usize = 100;

/// Candidate batch width for parallel evaluation
const BATCH: usize = 32;

/// Multiplier folding the target point into a deterministic seed scalar
const TARGET_MIX: u64 = 31337;

/// Orchestrator lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryState {
    Init,
    AnchorsAdded,
    Initialized,
    Recovering,
    Success,
    Exhausted,
    ScaledUp,
}

impl std::fmt::Display for RecoveryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RecoveryState::Init => "INIT",
            RecoveryState::AnchorsAdded => "ANCHORS_ADDED",
            RecoveryState::Initialized => "INITIALIZED",
            RecoveryState::Recovering => "RECOVERING",
            RecoveryState::Success => "SUCCESS",
            RecoveryState::Exhausted => "EXHAUSTED",
            RecoveryState::ScaledUp => "SCALED_UP",
        };
        write!(f, "{}", s)
    }
}

/// Terminal result of one recovery call
#[derive(Debug, Clone)]
pub struct RecoveryOutcome {
    pub k: Option<BigInt256>,
    /// 1 for a verified scalar, 0 otherwise
    pub confidence: f64,
    pub iterations: usize,
    pub state: RecoveryState,
    /// Last valid multi-torus interval, if any
    pub interval: Option<(f64, f64)>,
}

/// The recovery context: owns the anchors, derived geometry and trackers
pub struct RecoveryContext {
    pub config: EngineConfig,
    curve: Curve,
    embedder: Embedder,
    anchors: AnchorStore,
    verifier: Verifier,
    structures: GeometricStructures,
    state: RecoveryState,
    scale: usize,
    tracker: MultiTorusTracker,
}

impl RecoveryContext {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let curve = Curve::new(config.curve.parse()?);
        let embedder = Embedder::new(config.num_dimensions, curve.coord_bytes());
        let original_space = 2f64.powi((curve.order_bits() / 2).min(512) as i32);
        let tracker = MultiTorusTracker::new(config.history_size, original_space);
        Ok(RecoveryContext {
            verifier: Verifier::new(curve.clone()),
            curve,
            embedder,
            anchors: AnchorStore::new(),
            structures: GeometricStructures::default(),
            state: RecoveryState::Init,
            scale: 0,
            tracker,
            config,
        })
    }

    pub fn state(&self) -> RecoveryState {
        self.state
    }

    pub fn num_dimensions(&self) -> usize {
        self.config.num_dimensions
    }

    pub fn anchor_budget(&self) -> usize {
        self.config.num_anchors
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    /// Add one known (k, Q) pair
    pub fn add_anchor(&mut self, k: BigInt256, q: Point) {
        self.anchors.add(k, q, &self.embedder);
        if self.state == RecoveryState::Init {
            self.state = RecoveryState::AnchorsAdded;
        }
    }

    /// Generate `count` random anchors from a seeded generator; returns the
    /// scalars for test harnesses that need a known target
    pub fn generate_anchors(&mut self, count: usize, seed: u64) -> Vec<BigInt256> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut scalars = Vec::with_capacity(count);
        for _ in 0..count {
            let k = self.curve.rand_scalar(&mut rng);
            let q = self.curve.scalar_mul_base(&k);
            self.add_anchor(k, q);
            scalars.push(k);
        }
        scalars
    }

    /// Derive every geometric structure from the current anchor set
    pub fn initialize(&mut self) -> Result<()> {
        if self.anchors.is_empty() {
            return Err(anyhow!("cannot initialize with zero anchors"));
        }
        self.structures = geometry::initialize(&self.anchors, &self.config);
        if let Some(stats) = self.anchors.statistics() {
            let variance =
                stats.variance.iter().sum::<f64>() / stats.variance.len().max(1) as f64;
            log_anchor_stats(self.anchors.len(), stats.avg_pair_distance, variance);
        }
        self.state = RecoveryState::Initialized;
        Ok(())
    }

    pub fn structures(&self) -> &GeometricStructures {
        &self.structures
    }

    /// Attempt to recover the scalar behind `target`. Success means the
    /// verifier accepted a candidate; everything else is NotFound output
    /// with confidence 0.
    pub fn recover(&mut self, target: &Point) -> RecoveryOutcome {
        if self.state != RecoveryState::Initialized {
            warn!("recover called in state {}, no candidates generated", self.state);
            return self.terminal(None, 0, RecoveryState::Exhausted);
        }
        self.state = RecoveryState::Recovering;

        let target_pos = self.embedder.embed_point(target);
        let seed_k = self.derive_target_scalar(target);
        let base_pos = self.embedder.embed_scalar(&seed_k);
        let bounds = geometry::partition_bounds(&self.anchors, &target_pos);
        let halton_bases = crate::primes::cache().halton_bases(self.config.num_dimensions);

        let mut step_scale = 1.0f64;
        let mut last_distance = f64::INFINITY;

        let _timer = PerformanceTimer::new("recovery pass");
        let mut progress = ProgressTracker::new(
            self.config.max_iterations as u64,
            (self.config.max_iterations as u64 / 4).max(BATCH as u64),
        );
        let mut iteration = 0usize;
        while iteration < self.config.max_iterations {
            let end = (iteration + BATCH).min(self.config.max_iterations);
            let positions: Vec<(usize, Vec<f64>)> = (iteration..end)
                .map(|i| {
                    let pos = if i < WALK_ITERATIONS {
                        walk_position(&base_pos, i, step_scale)
                    } else {
                        halton_position(&bounds.lower, &bounds.upper, i, &halton_bases)
                    };
                    (i, pos)
                })
                .collect();

            // each candidate evaluation is independent; lowest iteration
            // index among verified candidates wins the batch
            let anchors = &self.anchors;
            let verifier = &self.verifier;
            let n = self.curve.n;
            let tgt_pos = &target_pos;
            let hit = positions
                .par_iter()
                .filter_map(|(i, pos)| {
                    for candidate in candidate_set(pos, tgt_pos, anchors, &n) {
                        if verifier.verify(&candidate, target) {
                            return Some((*i, candidate));
                        }
                    }
                    None
                })
                .min_by_key(|(i, _)| *i);

            if let Some((i, k)) = hit {
                info!("candidate verified at iteration {}", i);
                log_verification(&k.to_hex(), true);
                return self.terminal(Some(k), i + 1, RecoveryState::Success);
            }

            // distance feedback from the batch's first plain candidate
            if let Some(plain) =
                triangulate::triangulate(&positions[0].1, &self.anchors, &self.curve.n)
            {
                let q = self.curve.scalar_mul_base(&plain);
                let dist = self.verifier.point_distance(&q, target);
                if dist > last_distance {
                    step_scale /= 2.0;
                    debug!("distance rose ({:.4} -> {:.4}), step halved", last_distance, dist);
                }
                last_distance = dist;
                self.tracker.add_sample(plain.low_u64() as f64);
            }

            progress.increment((end - iteration) as u64);
            iteration = end;
        }
        progress.complete();

        // iteration cap hit: decide between exhaustion and a scale-up
        let magnitude = self.oscillation_magnitude();
        if self.evaluate_scale(magnitude) {
            return self.terminal(None, self.config.max_iterations, RecoveryState::ScaledUp);
        }
        self.terminal(None, self.config.max_iterations, RecoveryState::Exhausted)
    }

    /// Normalized oscillation magnitude of the estimate history, folded
    /// under the entropy reduction threshold
    pub fn oscillation_magnitude(&mut self) -> f64 {
        if self.tracker.num_samples() < 4 {
            return 0.0;
        }
        self.tracker.identify_tori(5);
        if let Some(strongest) = self.tracker.tori.first() {
            log_torus_summary(self.tracker.tori.len(), strongest.period, strongest.amplitude);
        }
        let amp = self
            .tracker
            .tori
            .first()
            .map(|t| t.amplitude)
            .unwrap_or(0.0);
        geometry::reduce_entropy(
            amp / self.tracker.original_space,
            self.config.entropy_reduction_threshold,
        )
    }

    /// Scale up when the magnitude exceeds the stability threshold and
    /// scales remain: D doubles, the anchor budget grows tenfold, anchors
    /// are re-embedded and the geometry is rebuilt. Returns whether a
    /// scale-up happened.
    pub fn evaluate_scale(&mut self, magnitude: f64) -> bool {
        if !self.config.dynamic_scaling_enabled
            || magnitude <= self.config.stability_threshold
            || self.scale >= self.config.max_scales
        {
            return false;
        }
        self.scale += 1;
        self.config.num_dimensions = (self.config.num_dimensions * 2).min(208);
        self.config.num_anchors *= 10;
        log_scale_up(self.scale, self.config.num_dimensions, self.config.num_anchors);

        // re-embed the anchor set at the new dimension
        self.embedder = Embedder::new(self.config.num_dimensions, self.curve.coord_bytes());
        let pairs: Vec<(BigInt256, Point)> =
            self.anchors.iter().map(|a| (a.k, a.q)).collect();
        self.anchors = AnchorStore::new();
        for (k, q) in pairs {
            self.anchors.add(k, q, &self.embedder);
        }
        self.state = RecoveryState::ScaledUp;
        if !self.anchors.is_empty() {
            self.structures = geometry::initialize(&self.anchors, &self.config);
            self.state = RecoveryState::Initialized;
        }
        true
    }

    /// Number of scale-ups performed so far
    pub fn scale_level(&self) -> usize {
        self.scale
    }

    /// Tori fitted to the estimate history so far
    pub fn tracker_tori(&self) -> &[crate::tracker::TorusDescriptor] {
        &self.tracker.tori
    }

    /// Babylonian clock view of a scalar's embedding angle at the middle
    /// radius
    pub fn clock_view(&self, k: &BigInt256) -> ClockPosition {
        embedding::clock_position(self.embedder.scalar_angle(k), 0.5)
    }

    /// Interval variant of `recover`: the last valid multi-torus
    /// intersection instead of an exact scalar
    pub fn recover_interval(&mut self, target: &Point) -> RecoveryOutcome {
        let mut outcome = self.recover(target);
        if outcome.k.is_none() {
            self.tracker.identify_tori(5);
            outcome.interval = self.tracker.compute_intersection();
            if let Some((k_min, k_max)) = outcome.interval {
                let size = (k_max - k_min).max(1.0);
                log_interval_reduction(k_min, k_max, self.tracker.original_space / size);
            }
        }
        outcome
    }

    /// Deterministic seed scalar from the target point:
    /// (Qx·31337 + Qy) mod 2^(bit_scale/2) over the low coordinate words
    fn derive_target_scalar(&self, target: &Point) -> BigInt256 {
        let (qx, qy) = match target.affine() {
            Some(c) => c,
            None => return BigInt256::one(),
        };
        let mixed = qx
            .low_u64()
            .wrapping_mul(TARGET_MIX)
            .wrapping_add(qy.low_u64());
        let half_bits = (self.curve.order_bits() / 2).min(64) as u32;
        let masked = if half_bits >= 64 {
            mixed
        } else {
            mixed & ((1u64 << half_bits) - 1)
        };
        BigInt256::from_u64(masked)
    }

    /// Sample a trajectory around a scalar and decompose it; used by the
    /// offline analysis paths
    pub fn oscillation_map(&self, k_start: &BigInt256) -> oscillation::OscillationMap {
        let count = self
            .config
            .orbit_samples
            .min(self.config.fft_max_n)
            .max(self.config.min_seq_len_for_ntt);
        let samples = oscillation::sample_trajectory(
            &self.curve,
            &self.embedder,
            k_start,
            &BigInt256::one(),
            count,
        );
        oscillation::analyze_trajectory(&samples)
    }

    fn terminal(
        &mut self,
        k: Option<BigInt256>,
        iterations: usize,
        state: RecoveryState,
    ) -> RecoveryOutcome {
        let confidence = if k.is_some() { 1.0 } else { 0.0 };
        if state != RecoveryState::ScaledUp {
            self.state = state;
        }
        RecoveryOutcome {
            k,
            confidence,
            iterations,
            state,
            interval: None,
        }
    }
}

/// Candidates for one sampled position: the nearest anchors' own scalars,
/// the plain interpolation and the byte-reversed truncation lane
fn candidate_set(
    pos: &[f64],
    target_pos: &[f64],
    anchors: &AnchorStore,
    n: &BigInt256,
) -> Vec<BigInt256> {
    let mut out = Vec::with_capacity(8);
    for idx in anchors.k_nearest(target_pos, 3) {
        if let Some(anchor) = anchors.get(idx) {
            out.push(anchor.k.rem(n));
        }
    }
    if let Some(plain) = triangulate::triangulate(pos, anchors, n) {
        out.push(plain);
    }
    if let Some(reversed) = triangulate::triangulate_k_with_truncation(pos, anchors, n) {
        out.push(reversed);
    }
    out
}

/// Seeded local random walk around the base position with slowly growing
/// radius; seed = iter·1000 + dim
fn walk_position(base: &[f64], iteration: usize, step_scale: f64) -> Vec<f64> {
    let step = (0.1 + 0.4 * iteration as f64 / WALK_ITERATIONS as f64) * step_scale;
    base.iter()
        .enumerate()
        .map(|(d, &v)| {
            let seed = (iteration * 1000 + d) as u64;
            let r = (seed % 10_000) as f64 / 10_000.0;
            v + (r - 0.5) * 2.0 * step
        })
        .collect()
}

/// Halton low-discrepancy point mapped into the partition bounds
fn halton_position(lower: &[f64], upper: &[f64], index: usize, bases: &[u64]) -> Vec<f64> {
    (0..lower.len())
        .map(|d| {
            let u = radical_inverse(index as u64 + 1, bases[d % bases.len()]);
            lower[d] + u * (upper[d] - lower[d])
        })
        .collect()
}

fn radical_inverse(mut index: u64, base: u64) -> f64 {
    let mut result = 0.0;
    let mut fraction = 1.0 / base as f64;
    while index > 0 {
        result += (index % base) as f64 * fraction;
        index /= base;
        fraction /= base as f64;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_context() -> RecoveryContext {
        let config = EngineConfig {
            num_anchors: 20,
            max_iterations: 64,
            orbit_samples: 32,
            ..EngineConfig::default()
        };
        RecoveryContext::new(config).unwrap()
    }

    #[test]
    fn test_state_transitions() {
        let mut ctx = small_context();
        assert_eq!(ctx.state(), RecoveryState::Init);
        ctx.generate_anchors(5, 42);
        assert_eq!(ctx.state(), RecoveryState::AnchorsAdded);
        ctx.initialize().unwrap();
        assert_eq!(ctx.state(), RecoveryState::Initialized);
    }

    #[test]
    fn test_initialize_requires_anchors() {
        let mut ctx = small_context();
        assert!(ctx.initialize().is_err());
    }

    #[test]
    fn test_self_recovery_on_anchor() {
        let mut ctx = small_context();
        let scalars = ctx.generate_anchors(20, 7);
        ctx.initialize().unwrap();
        let k_a = scalars[11];
        let target = ctx.curve().scalar_mul_base(&k_a);

        let outcome = ctx.recover(&target);
        assert_eq!(outcome.state, RecoveryState::Success);
        assert_eq!(outcome.k, Some(k_a));
        assert_eq!(outcome.confidence, 1.0);
        assert!(outcome.iterations <= 32);
    }

    #[test]
    fn test_unrecoverable_target_reports_not_found() {
        let mut config = EngineConfig::default();
        config.max_iterations = 32;
        config.dynamic_scaling_enabled = false;
        let mut ctx = RecoveryContext::new(config).unwrap();
        ctx.generate_anchors(5, 99);
        ctx.initialize().unwrap();

        // a scalar far from every anchor
        let k = BigInt256::from_hex("deadbeefcafebabe112233445566");
        let target = ctx.curve().scalar_mul_base(&k);
        let outcome = ctx.recover(&target);
        assert_eq!(outcome.state, RecoveryState::Exhausted);
        assert_eq!(outcome.k, None);
        assert_eq!(outcome.confidence, 0.0);
        assert_eq!(outcome.iterations, 32);
    }

    #[test]
    fn test_dynamic_scaling_sequence() {
        let mut ctx = small_context();
        ctx.generate_anchors(10, 3);
        ctx.initialize().unwrap();
        assert_eq!(ctx.num_dimensions(), 13);

        // synthetic oscillation magnitudes: three unstable, then stable
        let mut dims = vec![ctx.num_dimensions()];
        for magnitude in [0.5, 0.3, 0.15, 0.08] {
            ctx.evaluate_scale(magnitude);
            dims.push(ctx.num_dimensions());
        }
        assert_eq!(dims, vec![13, 26, 52, 104, 104]);
        assert_eq!(ctx.scale_level(), 3);
        assert_eq!(ctx.state(), RecoveryState::Initialized);
    }

    #[test]
    fn test_scaling_respects_max_scales() {
        let mut config = EngineConfig::default();
        config.max_scales = 1;
        let mut ctx = RecoveryContext::new(config).unwrap();
        ctx.generate_anchors(5, 1);
        ctx.initialize().unwrap();
        assert!(ctx.evaluate_scale(0.9));
        assert!(!ctx.evaluate_scale(0.9));
        assert_eq!(ctx.num_dimensions(), 26);
    }

    #[test]
    fn test_oscillation_map_covers_all_dimensions() {
        let ctx = small_context();
        let map = ctx.oscillation_map(&BigInt256::from_u64(5));
        assert_eq!(map.num_dimensions, 13);
        assert_eq!(map.signatures.len(), 13);
        for d in 0..13 {
            assert!((map.cross_correlations[d][d] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_halton_in_unit_interval() {
        for i in 1..50u64 {
            let v = radical_inverse(i, 2);
            assert!((0.0..1.0).contains(&v));
        }
        // base-2 radical inverse of 1 is 0.5
        assert_eq!(radical_inverse(1, 2), 0.5);
    }
}
