//! Multi-torus tracker
//!
//! Consumes a stream of scalar estimates through a bounded ring buffer,
//! decomposes it into up to N dominant oscillation components, fits each
//! into a torus descriptor and intersects the per-torus scalar intervals.
//! CSV writers report per-torus rows and per-sample intersection summaries.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::oscillation::{dominant_bin, power_spectrum, transform, Complex};

/// Bound multiplier for the k interval around a torus center; tighter than
/// the full amplitude on purpose
const BOUND_MULTIPLIER: f64 = 0.5;

/// Torus fitted to one oscillation component of the estimate stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TorusDescriptor {
    pub torus_id: usize,
    pub frequency: f64,
    pub period: u32,
    pub amplitude: f64,
    pub phase: f64,
    pub major_radius: f64,
    pub minor_radius: f64,
    pub center_k: f64,
    pub k_min: f64,
    pub k_max: f64,
    pub confidence: f64,
}

/// N-way interval intersection over several trackers
#[derive(Debug, Clone)]
pub struct IntersectionResult {
    pub num_samples: usize,
    pub intersection_k_min: f64,
    pub intersection_k_max: f64,
    pub intersection_size: f64,
    pub reduction_factor: f64,
    pub contains_true_k: bool,
    pub original_space: f64,
}

/// Ring-buffered scalar-estimate stream with torus identification
#[derive(Debug, Clone)]
pub struct MultiTorusTracker {
    history: Vec<f64>,
    history_size: usize,
    write_index: usize,
    wrapped: bool,
    /// Extent of the search space the intervals are clipped to
    pub original_space: f64,
    pub tori: Vec<TorusDescriptor>,
}

impl MultiTorusTracker {
    pub fn new(history_size: usize, original_space: f64) -> Self {
        MultiTorusTracker {
            history: Vec::with_capacity(history_size),
            history_size,
            write_index: 0,
            wrapped: false,
            original_space,
            tori: Vec::new(),
        }
    }

    /// Append one scalar estimate; overwrites the oldest slot once full
    pub fn add_sample(&mut self, k_estimate: f64) {
        if self.history.len() < self.history_size {
            self.history.push(k_estimate);
        } else {
            self.history[self.write_index] = k_estimate;
            self.wrapped = true;
        }
        self.write_index = (self.write_index + 1) % self.history_size;
    }

    pub fn num_samples(&self) -> usize {
        self.history.len()
    }

    /// History in arrival order, oldest first
    fn ordered_history(&self) -> Vec<f64> {
        if !self.wrapped {
            return self.history.clone();
        }
        let mut out = Vec::with_capacity(self.history_size);
        out.extend_from_slice(&self.history[self.write_index..]);
        out.extend_from_slice(&self.history[..self.write_index]);
        out
    }

    /// Decompose the history and fit up to `max_tori` tori, strongest
    /// component first. Empty history or max_tori == 0 yields no tori.
    pub fn identify_tori(&mut self, max_tori: usize) -> &[TorusDescriptor] {
        self.tori.clear();
        let series = self.ordered_history();
        let n = series.len();
        if n < 4 || max_tori == 0 {
            return &self.tori;
        }

        let mean = series.iter().sum::<f64>() / n as f64;
        let input: Vec<Complex> = series.iter().map(|&v| Complex::from_real(v)).collect();
        let spectrum = transform(&input);
        let power = power_spectrum(&spectrum);

        let signal_energy: f64 = series.iter().map(|&v| (v - mean) * (v - mean)).sum();

        // all non-DC bins below Nyquist, strongest first
        let mut bins: Vec<usize> = (1..n / 2).collect();
        bins.sort_by(|&a, &b| {
            power[b]
                .partial_cmp(&power[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        for (id, &bin) in bins.iter().take(max_tori).enumerate() {
            let amplitude = 2.0 * spectrum[bin].magnitude() / n as f64;
            if amplitude < 1e-9 {
                break;
            }
            let frequency = bin as f64 / n as f64;
            let period = (1.0 / frequency).round() as u32;
            let phase = spectrum[bin].arg();

            let k_min = (mean - amplitude * BOUND_MULTIPLIER).max(0.0);
            let k_max = (mean + amplitude * BOUND_MULTIPLIER).min(self.original_space);

            let component_energy = amplitude * amplitude * n as f64 / 2.0;
            let confidence = if signal_energy > 1e-18 {
                (component_energy / signal_energy).min(1.0)
            } else {
                0.0
            };

            self.tori.push(TorusDescriptor {
                torus_id: id,
                frequency,
                period,
                amplitude,
                phase,
                major_radius: amplitude,
                minor_radius: amplitude * BOUND_MULTIPLIER,
                center_k: mean,
                k_min,
                k_max,
                confidence,
            });
        }

        debug!(
            "identified {} tori from {} samples",
            self.tori.len(),
            n
        );
        &self.tori
    }

    /// Install an externally fitted torus (model replay, synthetic suites)
    pub fn push_torus(&mut self, torus: TorusDescriptor) {
        self.tori.push(torus);
    }

    /// Common interval of this tracker's tori: (max of mins, min of maxes).
    /// None when there are no tori or the interval is empty.
    pub fn compute_intersection(&self) -> Option<(f64, f64)> {
        let first = self.tori.first()?;
        let mut k_min = first.k_min;
        let mut k_max = first.k_max;
        for torus in &self.tori[1..] {
            k_min = k_min.max(torus.k_min);
            k_max = k_max.min(torus.k_max);
        }
        if k_max > k_min {
            Some((k_min, k_max))
        } else {
            None
        }
    }
}

/// Intersect the interval of every tracker; `true_k` membership and the
/// reduction factor against `max_k + 1` states are reported alongside.
/// Order of trackers does not affect the result.
pub fn compute_multi_sample_intersection(
    trackers: &[&MultiTorusTracker],
    true_k: f64,
    max_k: f64,
) -> Option<IntersectionResult> {
    let mut intervals = trackers.iter().filter_map(|t| t.compute_intersection());
    let (mut k_min, mut k_max) = intervals.next()?;
    for (lo, hi) in intervals {
        k_min = k_min.max(lo);
        k_max = k_max.min(hi);
    }
    if k_max <= k_min {
        return None;
    }

    let original_space = max_k + 1.0;
    let intersection_size = k_max - k_min;
    let result = IntersectionResult {
        num_samples: trackers.len(),
        intersection_k_min: k_min,
        intersection_k_max: k_max,
        intersection_size,
        reduction_factor: original_space / intersection_size,
        contains_true_k: true_k >= k_min && true_k <= k_max,
        original_space,
    };
    info!(
        "intersection over {} samples: [{:.2}, {:.2}], reduction {:.1}x",
        result.num_samples, k_min, k_max, result.reduction_factor
    );
    Some(result)
}

/// One row of the per-sample report
#[derive(Debug, Clone)]
pub struct SampleReportRow {
    pub sample_id: usize,
    pub true_k: f64,
    pub num_tori: usize,
    pub intersection_size: f64,
    pub reduction_factor: f64,
    pub contains_true_k: bool,
    pub torus_centers: Vec<f64>,
    pub torus_amplitudes: Vec<f64>,
    pub torus_frequencies: Vec<f64>,
}

/// Write one torus per row with the fixed column set
pub fn write_torus_csv(path: &Path, tori: &[TorusDescriptor]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create torus CSV at {}", path.display()))?;
    let mut w = BufWriter::new(file);
    writeln!(
        w,
        "torus_id,frequency,period,amplitude,phase,major_radius,minor_radius,center_k,k_min,k_max,confidence"
    )?;
    for t in tori {
        writeln!(
            w,
            "{},{:.6},{},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.4}",
            t.torus_id,
            t.frequency,
            t.period,
            t.amplitude,
            t.phase,
            t.major_radius,
            t.minor_radius,
            t.center_k,
            t.k_min,
            t.k_max,
            t.confidence
        )?;
    }
    Ok(())
}

/// Write the per-sample intersection report
pub fn write_per_sample_csv(path: &Path, rows: &[SampleReportRow]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create sample CSV at {}", path.display()))?;
    let mut w = BufWriter::new(file);
    writeln!(
        w,
        "sample_id,true_k,num_tori,intersection_size,reduction_factor,contains_true_k,torus_centers,torus_amplitudes,torus_frequencies"
    )?;
    for r in rows {
        let join = |v: &[f64]| {
            v.iter()
                .map(|x| format!("{:.4}", x))
                .collect::<Vec<_>>()
                .join(";")
        };
        writeln!(
            w,
            "{},{:.2},{},{:.4},{:.4},{},{},{},{}",
            r.sample_id,
            r.true_k,
            r.num_tori,
            r.intersection_size,
            r.reduction_factor,
            r.contains_true_k as u8,
            join(&r.torus_centers),
            join(&r.torus_amplitudes),
            join(&r.torus_frequencies)
        )?;
    }
    Ok(())
}
