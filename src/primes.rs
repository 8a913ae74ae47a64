//! Process-wide prime cache
//!
//! The only module-level state in the engine. A sieve is built exactly once
//! per process; later `init` calls are no-ops. Lookups serve the embedding
//! frequency table, Halton bases and tetration attractor bases.

use std::sync::OnceLock;

use log::debug;

use crate::math::constants::PRIME_FREQUENCIES;

const SIEVE_LIMIT: usize = 100_000;

static CACHE: OnceLock<PrimeCache> = OnceLock::new();

/// Sieve-backed prime lookups
pub struct PrimeCache {
    primes: Vec<u64>,
    is_prime: Vec<bool>,
}

impl PrimeCache {
    fn build() -> Self {
        let mut is_prime = vec![true; SIEVE_LIMIT];
        is_prime[0] = false;
        is_prime[1] = false;
        let mut i = 2;
        while i * i < SIEVE_LIMIT {
            if is_prime[i] {
                let mut j = i * i;
                while j < SIEVE_LIMIT {
                    is_prime[j] = false;
                    j += i;
                }
            }
            i += 1;
        }
        let primes: Vec<u64> = (2..SIEVE_LIMIT).filter(|&i| is_prime[i]).map(|i| i as u64).collect();
        debug!("prime cache built: {} primes below {}", primes.len(), SIEVE_LIMIT);
        PrimeCache { primes, is_prime }
    }

    /// Primality for values inside the sieve range; trial division beyond it
    pub fn is_prime(&self, x: u64) -> bool {
        if (x as usize) < SIEVE_LIMIT {
            return self.is_prime[x as usize];
        }
        if x % 2 == 0 {
            return false;
        }
        let mut d = 3u64;
        while d * d <= x {
            if x % d == 0 {
                return false;
            }
            d += 2;
        }
        true
    }

    /// Zero-based: nth_prime(0) == 2
    pub fn nth_prime(&self, n: usize) -> u64 {
        self.primes[n % self.primes.len()]
    }

    /// Embedding frequency table of length `dims`: the fixed seed table,
    /// then consecutive primes past its largest entry
    pub fn frequency_table(&self, dims: usize) -> Vec<f64> {
        let mut table: Vec<f64> = PRIME_FREQUENCIES
            .iter()
            .take(dims)
            .map(|&p| p as f64)
            .collect();
        if dims > PRIME_FREQUENCIES.len() {
            let start = *PRIME_FREQUENCIES.iter().max().unwrap_or(&2);
            let mut extra: Vec<f64> = self
                .primes
                .iter()
                .filter(|&&p| p > start)
                .take(dims - PRIME_FREQUENCIES.len())
                .map(|&p| p as f64)
                .collect();
            table.append(&mut extra);
        }
        table
    }

    /// Per-dimension Halton bases: the first `dims` primes
    pub fn halton_bases(&self, dims: usize) -> Vec<u64> {
        (0..dims).map(|d| self.nth_prime(d)).collect()
    }
}

/// Initialize the cache if this is the first call; idempotent afterwards
pub fn init() -> &'static PrimeCache {
    CACHE.get_or_init(PrimeCache::build)
}

/// Access the cache, building it on first use
pub fn cache() -> &'static PrimeCache {
    init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_idempotent() {
        let a = init() as *const PrimeCache;
        let b = init() as *const PrimeCache;
        assert_eq!(a, b);
    }

    #[test]
    fn test_small_primes() {
        let c = cache();
        assert!(c.is_prime(2));
        assert!(c.is_prime(31337));
        assert!(!c.is_prime(1));
        assert!(!c.is_prime(99_991 + 2)); // 99993 = 3 * 33331
        assert_eq!(c.nth_prime(0), 2);
        assert_eq!(c.nth_prime(5), 13);
    }

    #[test]
    fn test_frequency_table_extension() {
        let c = cache();
        let t = c.frequency_table(16);
        assert_eq!(t.len(), 16);
        assert_eq!(&t[..4], &[3.0, 7.0, 31.0, 12.0]);
        // extension continues with primes above the seed maximum
        assert_eq!(t[13], 43.0);
        assert_eq!(t[14], 47.0);
    }

    #[test]
    fn test_halton_bases() {
        let bases = cache().halton_bases(6);
        assert_eq!(bases, vec![2, 3, 5, 7, 11, 13]);
    }
}
