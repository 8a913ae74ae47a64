//! Mathematics module: big integers and elliptic curve primitives

pub mod bigint;
pub mod constants;
pub mod curve;

// Re-export commonly used types
pub use bigint::{BigInt256, BigInt512};
pub use curve::{Curve, CurveName, Point};
