//! Oscillation engine
//!
//! Samples a scalar-parameterized trajectory through the embedding and
//! decomposes it: O(N²) DFT for arbitrary lengths, radix-2 FFT for powers
//! of two, inverse transform by conjugation, power spectrum, per-dimension
//! frequency signatures and a Pearson cross-correlation matrix.

use std::f64::consts::TAU;

use log::debug;

use crate::embedding::Embedder;
use crate::error::{EngineError, EngineResult};
use crate::math::bigint::BigInt256;
use crate::math::curve::Curve;

/// Complex number for the transforms
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub fn new(re: f64, im: f64) -> Self {
        Complex { re, im }
    }

    pub fn from_real(re: f64) -> Self {
        Complex { re, im: 0.0 }
    }

    pub fn magnitude(&self) -> f64 {
        (self.re * self.re + self.im * self.im).sqrt()
    }

    pub fn arg(&self) -> f64 {
        self.im.atan2(self.re)
    }

    pub fn conj(&self) -> Complex {
        Complex::new(self.re, -self.im)
    }

    fn add(&self, other: &Complex) -> Complex {
        Complex::new(self.re + other.re, self.im + other.im)
    }

    fn sub(&self, other: &Complex) -> Complex {
        Complex::new(self.re - other.re, self.im - other.im)
    }

    fn mul(&self, other: &Complex) -> Complex {
        Complex::new(
            self.re * other.re - self.im * other.im,
            self.re * other.im + self.im * other.re,
        )
    }
}

/// One trajectory sample: the scalar, its point embedding and polar view
#[derive(Debug, Clone)]
pub struct TrajectorySample {
    pub k: BigInt256,
    pub coords: Vec<f64>,
    pub magnitude: f64,
    pub angle: f64,
}

/// Per-dimension oscillation signature
#[derive(Debug, Clone)]
pub struct OscillationSignature {
    pub frequency: f64,
    pub amplitude: f64,
    pub phase: f64,
    pub period: u32,
    pub is_stable: bool,
    pub convergence_rate: f64,
}

/// Full decomposition over all embedding dimensions
#[derive(Debug, Clone)]
pub struct OscillationMap {
    pub num_dimensions: usize,
    pub signatures: Vec<OscillationSignature>,
    /// Row-major D×D Pearson matrix; diagonal exactly 1
    pub cross_correlations: Vec<Vec<f64>>,
    pub is_converging: bool,
    pub iterations_to_convergence: f64,
    pub global_amplitude: f64,
}

/// Round up to the next power of two
pub fn next_power_of_2(n: usize) -> usize {
    n.next_power_of_two()
}

/// O(N²) discrete Fourier transform, any length
pub fn dft(input: &[Complex]) -> Vec<Complex> {
    let n = input.len();
    let mut out = vec![Complex::default(); n];
    for (k, slot) in out.iter_mut().enumerate() {
        let mut acc = Complex::default();
        for (i, x) in input.iter().enumerate() {
            let angle = -TAU * k as f64 * i as f64 / n as f64;
            let tw = Complex::new(angle.cos(), angle.sin());
            acc = acc.add(&x.mul(&tw));
        }
        *slot = acc;
    }
    out
}

/// Radix-2 Cooley-Tukey FFT; the length must be a power of two
pub fn fft(input: &[Complex]) -> EngineResult<Vec<Complex>> {
    let n = input.len();
    if n == 0 || !n.is_power_of_two() {
        return Err(EngineError::config(format!(
            "FFT length must be a nonzero power of two, got {}",
            n
        )));
    }
    Ok(fft_recursive(input))
}

fn fft_recursive(input: &[Complex]) -> Vec<Complex> {
    let n = input.len();
    if n == 1 {
        return vec![input[0]];
    }
    let even: Vec<Complex> = input.iter().step_by(2).copied().collect();
    let odd: Vec<Complex> = input.iter().skip(1).step_by(2).copied().collect();
    let even_fft = fft_recursive(&even);
    let odd_fft = fft_recursive(&odd);

    let mut out = vec![Complex::default(); n];
    for k in 0..n / 2 {
        let angle = -TAU * k as f64 / n as f64;
        let tw = Complex::new(angle.cos(), angle.sin()).mul(&odd_fft[k]);
        out[k] = even_fft[k].add(&tw);
        out[k + n / 2] = even_fft[k].sub(&tw);
    }
    out
}

/// Inverse FFT via conjugation; same length constraint as `fft`
pub fn ifft(input: &[Complex]) -> EngineResult<Vec<Complex>> {
    let n = input.len() as f64;
    let conj: Vec<Complex> = input.iter().map(|c| c.conj()).collect();
    let transformed = fft(&conj)?;
    Ok(transformed
        .iter()
        .map(|c| Complex::new(c.re / n, -c.im / n))
        .collect())
}

/// |X[k]|² for each bin
pub fn power_spectrum(input: &[Complex]) -> Vec<f64> {
    input
        .iter()
        .map(|c| c.re * c.re + c.im * c.im)
        .collect()
}

/// Dominant frequency of a power spectrum: argmax over (0, N/2),
/// skipping the DC bin, scaled to cycles per unit time
pub fn find_dominant_frequency(spectrum: &[f64], sampling_rate: f64) -> f64 {
    let n = spectrum.len();
    if n < 4 {
        return 0.0;
    }
    let bin = dominant_bin(spectrum);
    bin as f64 * sampling_rate / n as f64
}

/// Argmax bin over (0, N/2)
pub fn dominant_bin(spectrum: &[f64]) -> usize {
    let n = spectrum.len();
    let mut best = 1;
    for k in 1..n / 2 {
        if spectrum[k] > spectrum[best] {
            best = k;
        }
    }
    best
}

/// FFT for power-of-two lengths, DFT otherwise
pub fn transform(input: &[Complex]) -> Vec<Complex> {
    if input.len().is_power_of_two() {
        fft_recursive(input)
    } else {
        dft(input)
    }
}

/// Sample the trajectory k_start + i·k_step for i in [0, count), embedding
/// each point k·G
pub fn sample_trajectory(
    curve: &Curve,
    embedder: &Embedder,
    k_start: &BigInt256,
    k_step: &BigInt256,
    count: usize,
) -> Vec<TrajectorySample> {
    let mut samples = Vec::with_capacity(count);
    let mut k = *k_start;
    for _ in 0..count {
        let q = curve.scalar_mul_base(&k);
        let coords = embedder.embed_point(&q);
        let magnitude = coords.iter().map(|v| v * v).sum::<f64>().sqrt();
        let angle = if coords.len() >= 2 {
            coords[1].atan2(coords[0])
        } else {
            0.0
        };
        samples.push(TrajectorySample {
            k,
            coords,
            magnitude,
            angle,
        });
        k = k.add_mod(k_step, &curve.n);
    }
    samples
}

/// Signature of one real-valued series
pub fn analyze_series(series: &[f64]) -> OscillationSignature {
    let n = series.len();
    if n < 4 {
        return OscillationSignature {
            frequency: 0.0,
            amplitude: 0.0,
            phase: 0.0,
            period: 0,
            is_stable: true,
            convergence_rate: 0.0,
        };
    }

    let input: Vec<Complex> = series.iter().map(|&v| Complex::from_real(v)).collect();
    let spectrum = transform(&input);
    let power = power_spectrum(&spectrum);
    let bin = dominant_bin(&power);

    let frequency = bin as f64 / n as f64;
    let amplitude = 2.0 * spectrum[bin].magnitude() / n as f64;
    let phase = spectrum[bin].arg();
    let period = if frequency > 0.0 {
        (1.0 / frequency).round() as u32
    } else {
        0
    };

    // trend over the full window vs dominant amplitude
    let slope = regression_slope(series);
    let drift = slope.abs() * (n - 1) as f64;
    let is_stable = drift <= 0.25 * amplitude + 1e-9;

    // ratio of deviation energy between half-windows
    let half = n / 2;
    let amp_first = rms_deviation(&series[..half]);
    let amp_second = rms_deviation(&series[half..]);
    let ratio = amp_second / (amp_first + 1e-12);
    let convergence_rate = (1.0 - ratio).clamp(0.0, 1.0);

    OscillationSignature {
        frequency,
        amplitude,
        phase,
        period,
        is_stable,
        convergence_rate,
    }
}

/// Decompose a trajectory column-by-column into an oscillation map
pub fn analyze_trajectory(samples: &[TrajectorySample]) -> OscillationMap {
    let dims = samples.first().map(|s| s.coords.len()).unwrap_or(0);
    let columns: Vec<Vec<f64>> = (0..dims)
        .map(|d| samples.iter().map(|s| s.coords[d]).collect())
        .collect();
    analyze_columns(&columns)
}

/// Decompose pre-extracted per-dimension columns
pub fn analyze_columns(columns: &[Vec<f64>]) -> OscillationMap {
    let dims = columns.len();
    let signatures: Vec<OscillationSignature> =
        columns.iter().map(|c| analyze_series(c)).collect();

    let mut cross = vec![vec![0.0; dims]; dims];
    for i in 0..dims {
        for j in 0..dims {
            cross[i][j] = if i == j {
                1.0
            } else {
                pearson(&columns[i], &columns[j])
            };
        }
    }

    let stable = signatures.iter().filter(|s| s.is_stable).count();
    let is_converging = dims > 0 && stable * 2 >= dims;
    let global_amplitude = signatures
        .iter()
        .map(|s| s.amplitude)
        .fold(0.0f64, f64::max);

    let slowest = signatures
        .iter()
        .map(|s| s.convergence_rate)
        .filter(|&r| r > 1e-9)
        .fold(f64::INFINITY, f64::min);
    let iterations_to_convergence = if slowest.is_finite() {
        global_amplitude / slowest
    } else {
        f64::INFINITY
    };

    debug!(
        "oscillation map: {} dims, {} stable, global amplitude {:.4}",
        dims, stable, global_amplitude
    );

    OscillationMap {
        num_dimensions: dims,
        signatures,
        cross_correlations: cross,
        is_converging,
        iterations_to_convergence,
        global_amplitude,
    }
}

/// Pearson correlation; 0 when either series is constant
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let nf = n as f64;
    let mean_a = a[..n].iter().sum::<f64>() / nf;
    let mean_b = b[..n].iter().sum::<f64>() / nf;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for i in 0..n {
        let da = a[i] - mean_a;
        let db = b[i] - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    if var_a < 1e-18 || var_b < 1e-18 {
        return 0.0;
    }
    cov / (var_a.sqrt() * var_b.sqrt())
}

fn regression_slope(series: &[f64]) -> f64 {
    let n = series.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = series.iter().sum::<f64>() / n;
    let mut num = 0.0;
    let mut den = 0.0;
    for (i, &y) in series.iter().enumerate() {
        let dx = i as f64 - mean_x;
        num += dx * (y - mean_y);
        den += dx * dx;
    }
    if den < 1e-18 {
        0.0
    } else {
        num / den
    }
}

fn rms_deviation(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    let mean = series.iter().sum::<f64>() / series.len() as f64;
    (series.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / series.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_fft_rejects_non_power_of_two() {
        let x = vec![Complex::from_real(1.0); 60];
        assert!(fft(&x).is_err());
    }

    #[test]
    fn test_fft_matches_dft() {
        let x: Vec<Complex> = (0..16)
            .map(|i| Complex::from_real((i as f64 * 0.7).sin() + 0.3 * (i as f64)))
            .collect();
        let a = fft(&x).unwrap();
        let b = dft(&x);
        for (u, v) in a.iter().zip(b.iter()) {
            assert!((u.re - v.re).abs() < 1e-9);
            assert!((u.im - v.im).abs() < 1e-9);
        }
    }

    #[test]
    fn test_ifft_roundtrip() {
        let x: Vec<Complex> = (0..64)
            .map(|i| Complex::from_real((i as f64 * 0.31).cos() * 2.5))
            .collect();
        let max = x.iter().map(|c| c.re.abs()).fold(0.0f64, f64::max);
        let back = ifft(&fft(&x).unwrap()).unwrap();
        for (u, v) in x.iter().zip(back.iter()) {
            assert!((u.re - v.re).abs() < 1e-9 * max.max(1.0));
            assert!(v.im.abs() < 1e-9 * max.max(1.0));
        }
    }

    #[test]
    fn test_pure_tone_bin() {
        let n = 64;
        let x: Vec<Complex> = (0..n)
            .map(|i| Complex::from_real((TAU * 4.0 * i as f64 / n as f64).sin()))
            .collect();
        let spectrum = fft(&x).unwrap();
        let power = power_spectrum(&spectrum);
        assert_eq!(dominant_bin(&power), 4);
        assert!((find_dominant_frequency(&power, 1.0) - 4.0 / 64.0).abs() < 1e-12);
    }

    #[test]
    fn test_analyze_series_sine() {
        let n = 100;
        let series: Vec<f64> = (0..n).map(|i| 2.0 * (PI * i as f64 / 2.0).sin()).collect();
        let sig = analyze_series(&series);
        assert_eq!(sig.period, 4);
        assert!((sig.amplitude - 2.0).abs() < 0.05);
        assert!(sig.is_stable);
    }

    #[test]
    fn test_ramp_is_unstable() {
        let series: Vec<f64> = (0..64).map(|i| i as f64 * 0.5).collect();
        let sig = analyze_series(&series);
        assert!(!sig.is_stable);
    }

    #[test]
    fn test_correlation_matrix_properties() {
        let a: Vec<f64> = (0..50).map(|i| (i as f64 * 0.4).sin()).collect();
        let b: Vec<f64> = (0..50).map(|i| (i as f64 * 0.4).cos()).collect();
        let map = analyze_columns(&[a, b]);
        assert!((map.cross_correlations[0][0] - 1.0).abs() < 1e-6);
        assert!((map.cross_correlations[1][1] - 1.0).abs() < 1e-6);
        for row in &map.cross_correlations {
            for &v in row {
                assert!(v.abs() <= 1.0 + 1e-6);
            }
        }
    }

    #[test]
    fn test_next_power_of_2() {
        assert_eq!(next_power_of_2(100), 128);
        assert_eq!(next_power_of_2(64), 64);
        assert_eq!(next_power_of_2(1), 1);
    }
}
