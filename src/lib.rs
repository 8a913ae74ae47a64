//! GeoRecover - geometric scalar recovery research engine
//!
//! Research framework probing whether ECDLP instances Q = k·G leak
//! structure through prime-indexed lattice embeddings: anchors with known
//! scalars are projected into ℝ^D, candidate scalars are triangulated and
//! byte-reversed back out, oscillation spectra drive multi-torus interval
//! reduction, and every candidate passes through exact curve verification
//! before anything is reported.
//!
//! Guarantees:
//! - A reported scalar always satisfies k·G = Q on the configured curve
//! - Embeddings and candidate streams are fully deterministic per config
//! - No unsafe code usage

#![deny(unsafe_code)]

pub mod anchors;
pub mod config;
pub mod embedding;
pub mod error;
pub mod geometry;
pub mod math;
pub mod model;
pub mod oscillation;
pub mod primes;
pub mod recovery;
pub mod samples;
pub mod tracker;
pub mod triangulate;
pub mod utils;
pub mod verify;

// Re-export key types for library usage
pub use anchors::{Anchor, AnchorStore};
pub use config::EngineConfig;
pub use embedding::Embedder;
pub use error::{EngineError, EngineResult};
pub use math::{BigInt256, BigInt512, Curve, CurveName, Point};
pub use model::{MicroModel, ModelStore};
pub use recovery::{RecoveryContext, RecoveryOutcome, RecoveryState};
pub use tracker::{MultiTorusTracker, TorusDescriptor};
pub use verify::Verifier;
