//! Engine configuration
//!
//! clap::Parser struct carrying every tunable of the recovery pipeline,
//! with the stock defaults (D = 13, 100 anchors, 5 scales) and validation
//! that surfaces configuration errors before any work starts. Unknown
//! command-line keys are rejected by clap itself.

use anyhow::{anyhow, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

/// Geometric recovery engine configuration
#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(author, version, about, long_about = None)]
pub struct EngineConfig {
    /// Embedding dimension D
    #[arg(long, default_value_t = 13)]
    pub num_dimensions: usize,

    /// Anchor count N
    #[arg(long, default_value_t = 100)]
    pub num_anchors: usize,

    /// Maximum dynamic scale-up steps
    #[arg(long, default_value_t = 5)]
    pub max_scales: usize,

    /// Trajectory samples per oscillation pass
    #[arg(long, default_value_t = 1000)]
    pub orbit_samples: usize,

    /// Minimum series length before spectral decomposition kicks in
    #[arg(long, default_value_t = 16)]
    pub min_seq_len_for_ntt: usize,

    /// Allow the orchestrator to scale D and N up on instability
    #[arg(long, default_value_t = true)]
    pub dynamic_scaling_enabled: bool,

    /// Oscillation magnitude above which a scale-up triggers
    #[arg(long, default_value_t = 0.1)]
    pub stability_threshold: f64,

    /// Target for entropy reduction of oscillation magnitudes
    #[arg(long, default_value_t = 1.0)]
    pub entropy_reduction_threshold: f64,

    /// Kissing-sphere hierarchy depth bound
    #[arg(long, default_value_t = 3)]
    pub max_recursion_depth: u32,

    /// Largest FFT length the engine will allocate
    #[arg(long, default_value_t = 4096)]
    pub fft_max_n: usize,

    /// Tetration attractor bases (primes)
    #[arg(long, value_delimiter = ',', default_values_t = vec![2u64, 3, 5, 7, 11, 13])]
    pub bases: Vec<u64>,

    /// Tetration attractor heights
    #[arg(long, value_delimiter = ',', default_values_t = vec![2u32, 3, 4])]
    pub heights: Vec<u32>,

    /// Tetration exponent damping in [0, 1]
    #[arg(long, default_value_t = 1.0)]
    pub damping: f64,

    /// Curve the recovery runs on
    #[arg(long, default_value = "secp128r1")]
    pub curve: String,

    /// Iteration cap per recovery call
    #[arg(long, default_value_t = 10_000)]
    pub max_iterations: usize,

    /// Scalar-estimate history length for the multi-torus tracker
    #[arg(long, default_value_t = 128)]
    pub history_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            num_dimensions: 13,
            num_anchors: 100,
            max_scales: 5,
            orbit_samples: 1000,
            min_seq_len_for_ntt: 16,
            dynamic_scaling_enabled: true,
            stability_threshold: 0.1,
            entropy_reduction_threshold: 1.0,
            max_recursion_depth: 3,
            fft_max_n: 4096,
            bases: vec![2, 3, 5, 7, 11, 13],
            heights: vec![2, 3, 4],
            damping: 1.0,
            curve: "secp128r1".to_string(),
            max_iterations: 10_000,
            history_size: 128,
        }
    }
}

impl EngineConfig {
    /// Validate ranges; configuration errors surface before any work
    pub fn validate(&self) -> Result<()> {
        if !(4..=208).contains(&self.num_dimensions) {
            return Err(anyhow!(
                "num_dimensions must be in [4, 208], got {}",
                self.num_dimensions
            ));
        }
        if self.num_anchors == 0 {
            return Err(anyhow!("num_anchors must be nonzero"));
        }
        if !self.fft_max_n.is_power_of_two() {
            return Err(anyhow!(
                "fft_max_n must be a power of two, got {}",
                self.fft_max_n
            ));
        }
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(anyhow!("damping must lie in [0, 1], got {}", self.damping));
        }
        if self.stability_threshold <= 0.0 {
            return Err(anyhow!(
                "stability_threshold must be positive, got {}",
                self.stability_threshold
            ));
        }
        if self.bases.is_empty() || self.heights.is_empty() {
            return Err(anyhow!("attractor bases and heights must be non-empty"));
        }
        if self.orbit_samples < self.min_seq_len_for_ntt {
            return Err(anyhow!(
                "orbit_samples ({}) below min_seq_len_for_ntt ({})",
                self.orbit_samples,
                self.min_seq_len_for_ntt
            ));
        }
        if self.history_size < 4 {
            return Err(anyhow!("history_size must be at least 4"));
        }
        Ok(())
    }
}
