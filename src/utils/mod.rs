//! Utility functions and helpers
//!
//! Logging, timing, and other utilities

pub mod logging;

// Re-export commonly used utilities
pub use logging::{setup_logging, PerformanceTimer, ProgressTracker};
