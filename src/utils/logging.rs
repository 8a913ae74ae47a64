//! Structured logging utilities
//!
//! Logs for anchor statistics, scale-ups, verification outcomes and
//! long-running pass progress

use log::{debug, error, info};
use std::time::Instant;

/// Setup structured logging
pub fn setup_logging() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    Ok(())
}

/// Log anchor set statistics
pub fn log_anchor_stats(count: usize, avg_pair_distance: f64, variance: f64) {
    info!(
        "Anchor set: {} anchors, avg pair distance {:.4}, variance {:.4}",
        count, avg_pair_distance, variance
    );
}

/// Log torus identification summary
pub fn log_torus_summary(num_tori: usize, strongest_period: u32, strongest_amplitude: f64) {
    info!(
        "Torus fit: {} tori, strongest period {} (amplitude {:.4})",
        num_tori, strongest_period, strongest_amplitude
    );
}

/// Log an interval reduction
pub fn log_interval_reduction(k_min: f64, k_max: f64, reduction_factor: f64) {
    info!(
        "Interval: [{:.1}, {:.1}], reduction factor {:.2}x",
        k_min, k_max, reduction_factor
    );
}

/// Log a dynamic scale-up
pub fn log_scale_up(level: usize, dimensions: usize, anchor_budget: usize) {
    info!(
        "SCALE-UP {}: dimensions {}, anchor budget {}",
        level, dimensions, anchor_budget
    );
}

/// Log candidate verification outcome
pub fn log_verification(candidate_hex: &str, verified: bool) {
    if verified {
        info!("CANDIDATE VERIFIED: {}", candidate_hex);
    } else {
        error!("CANDIDATE VERIFICATION FAILED: {}", candidate_hex);
    }
}

/// Performance monitoring timer
pub struct PerformanceTimer {
    start: Instant,
    label: String,
}

impl PerformanceTimer {
    pub fn new(label: &str) -> Self {
        debug!("Starting timer: {}", label);
        PerformanceTimer {
            start: Instant::now(),
            label: label.to_string(),
        }
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }
}

impl Drop for PerformanceTimer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        debug!("Timer {} completed in {:.2}ms", self.label, elapsed.as_millis());
    }
}

/// Progress tracker for long-running operations
pub struct ProgressTracker {
    total: u64,
    current: u64,
    start_time: Instant,
    last_report: Instant,
    report_interval: u64, // Report every N items
}

impl ProgressTracker {
    pub fn new(total: u64, report_interval: u64) -> Self {
        ProgressTracker {
            total,
            current: 0,
            start_time: Instant::now(),
            last_report: Instant::now(),
            report_interval,
        }
    }

    pub fn increment(&mut self, amount: u64) {
        self.current += amount;

        if self.current % self.report_interval == 0
            || self.last_report.elapsed().as_secs() >= 10
        {
            self.report_progress();
            self.last_report = Instant::now();
        }
    }

    pub fn set_current(&mut self, current: u64) {
        self.current = current;
        self.report_progress();
    }

    fn report_progress(&self) {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let progress = self.current as f64 / self.total as f64;
        let eta_seconds = if progress > 0.0 {
            elapsed / progress * (1.0 - progress)
        } else {
            0.0
        };

        info!(
            "Progress: {}/{} ({:.1}%), {:.0}s elapsed, ETA {:.0}s",
            self.current,
            self.total,
            progress * 100.0,
            elapsed,
            eta_seconds
        );
    }

    pub fn complete(&self) {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let rate = self.current as f64 / elapsed;
        info!(
            "Completed: {} items in {:.2}s ({:.0} items/sec)",
            self.current, elapsed, rate
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_elapsed_monotonic() {
        let timer = PerformanceTimer::new("test");
        let first = timer.elapsed_ms();
        let second = timer.elapsed_ms();
        assert!(second >= first);
    }

    #[test]
    fn test_progress_tracker_counts() {
        let mut tracker = ProgressTracker::new(100, 50);
        tracker.increment(30);
        tracker.increment(20);
        tracker.set_current(100);
        tracker.complete();
    }
}
