//! Tetration attractors
//!
//! Right-associative iterated exponentiation in a modular group. The
//! exponent at each level is reduced modulo the Euler totient of the
//! current modulus, after damping scales it down. The default table is the
//! 18-attractor grid bases {2,3,5,7,11,13} × heights {2,3,4}.

use crate::primes;

/// Modulus for the default attractor table; prime, below 2^32
pub const TETRATION_MODULUS: u64 = 4_294_967_291;

/// One attractor: base^^height mod modulus with damped exponents
#[derive(Debug, Clone, PartialEq)]
pub struct TetrationAttractor {
    pub base: u64,
    pub height: u32,
    pub value: u64,
    pub damping: f64,
    pub modulus: u64,
}

/// Euler totient by trial-division factorization
pub fn euler_totient(mut n: u64) -> u64 {
    if n == 0 {
        return 0;
    }
    let mut result = n;
    let mut p = 2u64;
    while p * p <= n {
        if n % p == 0 {
            while n % p == 0 {
                n /= p;
            }
            result -= result / p;
        }
        p += 1;
    }
    if n > 1 {
        result -= result / n;
    }
    result
}

fn mod_pow_u64(base: u64, mut exp: u64, modulus: u64) -> u64 {
    if modulus == 1 {
        return 0;
    }
    let mut result = 1u128;
    let m = modulus as u128;
    let mut b = base as u128 % m;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result * b % m;
        }
        b = b * b % m;
        exp >>= 1;
    }
    result as u64
}

/// base^^height mod modulus, right-associative, exponents damped and
/// totient-reduced level by level
pub fn tetration_mod(base: u64, height: u32, modulus: u64, damping: f64) -> u64 {
    if modulus == 1 {
        return 0;
    }
    if height == 0 {
        return 1 % modulus;
    }
    if height == 1 {
        return base % modulus;
    }
    let phi = euler_totient(modulus);
    let inner = tetration_mod(base, height - 1, phi, damping);
    let damped = ((inner as f64 * damping.clamp(0.0, 1.0)) as u64) % phi.max(1);
    mod_pow_u64(base, damped, modulus)
}

/// Build the attractor table for the given bases and heights
pub fn build_attractors(
    bases: &[u64],
    heights: &[u32],
    damping: f64,
    modulus: u64,
) -> Vec<TetrationAttractor> {
    let cache = primes::cache();
    bases
        .iter()
        .filter(|&&b| cache.is_prime(b))
        .flat_map(|&base| {
            heights.iter().map(move |&height| TetrationAttractor {
                base,
                height,
                value: tetration_mod(base, height, modulus, damping),
                damping,
                modulus,
            })
        })
        .collect()
}

/// The default 18-attractor grid
pub fn default_attractors(damping: f64) -> Vec<TetrationAttractor> {
    build_attractors(
        &[2, 3, 5, 7, 11, 13],
        &[2, 3, 4],
        damping,
        TETRATION_MODULUS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totient() {
        assert_eq!(euler_totient(1), 1);
        assert_eq!(euler_totient(10), 4);
        assert_eq!(euler_totient(4_294_967_291), 4_294_967_290); // prime
    }

    #[test]
    fn test_tetration_undamped_small() {
        // 2^^2 = 2^2 = 4; 2^^3 = 2^4 = 16 (modulus large enough)
        assert_eq!(tetration_mod(2, 2, 1_000_003, 1.0), 4);
        assert_eq!(tetration_mod(2, 3, 1_000_003, 1.0), 16);
        assert_eq!(tetration_mod(3, 2, 1_000_003, 1.0), 27);
    }

    #[test]
    fn test_damping_shrinks_exponent() {
        let full = tetration_mod(3, 3, 1_000_003, 1.0);
        let damped = tetration_mod(3, 3, 1_000_003, 0.5);
        // damping halves the inner exponent at every level:
        // 3 -> 1 inside, so the tower collapses to 3^1
        assert_eq!(full, mod_pow_u64(3, 27, 1_000_003));
        assert_eq!(damped, 3);
    }

    #[test]
    fn test_default_table_size() {
        let attractors = default_attractors(1.0);
        assert_eq!(attractors.len(), 18);
        for a in &attractors {
            assert!(a.value < a.modulus);
            assert!((0.0..=1.0).contains(&a.damping));
        }
    }

    #[test]
    fn test_height_zero_and_one() {
        assert_eq!(tetration_mod(7, 0, 100, 1.0), 1);
        assert_eq!(tetration_mod(7, 1, 100, 1.0), 7);
    }
}
