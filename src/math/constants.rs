//! Curve parameters and projection constants
//!
//! Hex constants for the supported named curves plus the golden-ratio
//! machinery shared by the lattice embedder and the clock view.

/// secp256k1 field prime
pub const SECP256K1_P: &str = "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFC2F";
/// secp256k1 group order
pub const SECP256K1_N: &str = "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141";
/// secp256k1 curve coefficient a
pub const SECP256K1_A: &str = "0";
/// secp256k1 curve coefficient b
pub const SECP256K1_B: &str = "7";
/// secp256k1 generator x
pub const SECP256K1_GX: &str = "79BE667EF9DCBBAC55A06295CE870B07029BFCDB2DCE28D959F2815B16F81798";
/// secp256k1 generator y
pub const SECP256K1_GY: &str = "483ADA7726A3C4655DA4FBFC0E1108A8FD17B448A68554199C47D08FFB10D4B8";

/// secp128r1 field prime
pub const SECP128R1_P: &str = "FFFFFFFDFFFFFFFFFFFFFFFFFFFFFFFF";
/// secp128r1 group order
pub const SECP128R1_N: &str = "FFFFFFFE0000000075A30D1B9038A115";
/// secp128r1 curve coefficient a
pub const SECP128R1_A: &str = "FFFFFFFDFFFFFFFFFFFFFFFFFFFFFFFC";
/// secp128r1 curve coefficient b
pub const SECP128R1_B: &str = "E87579C11079F43DD824993C2CEE5ED3";
/// secp128r1 generator x
pub const SECP128R1_GX: &str = "161FF7528B899B2D0C28607CA52C5B86";
/// secp128r1 generator y
pub const SECP128R1_GY: &str = "CF5AC8395BAFEB13C02DA292DDED7A83";

/// Golden ratio Φ = (1+√5)/2
pub const PHI: f64 = 1.618033988749894848204586834365638118;

/// Angular factor π·(1+√5) of the scalar projection
pub const PI_PHI: f64 = std::f64::consts::PI * 3.23606797749978969640917366873;

/// Seed of the prime frequency table; extended deterministically for
/// higher dimensions
pub const PRIME_FREQUENCIES: [u64; 13] = [3, 7, 31, 12, 19, 5, 11, 13, 17, 23, 29, 37, 41];

/// Babylonian clock ring sizes, innermost first
pub const CLOCK_RINGS: [u32; 4] = [12, 60, 60, 100];

/// Radius thresholds separating the clock rings
pub const CLOCK_RADIUS_THRESHOLDS: [f64; 3] = [0.375, 0.625, 0.875];

/// Triangulation fixed-point weight scale
pub const WEIGHT_SCALE: u64 = 1_000_000_000;

/// Maximum width of the extended triangulation buffer: 256 bits plus the
/// boundary-crossing bit, in whole bytes. Smaller orders use one byte
/// past their own width.
pub const EXTENDED_BYTES: usize = 33;
