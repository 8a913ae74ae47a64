//! Fixed-width big integers for scalar and field arithmetic
//!
//! BigInt256 (4 little-endian u64 limbs) carries scalars and field elements;
//! BigInt512 is the widening accumulator for products and the extended
//! triangulation sum, which needs more than 256 bits before reduction.

use std::fmt;
use std::ops::{Add, Sub};

use rand::Rng;

/// 256-bit integer represented as 4 u64 limbs (little-endian)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BigInt256 {
    /// Limbs in little-endian order (limb[0] is least significant)
    pub limbs: [u64; 4],
}

/// 512-bit integer represented as 8 u64 limbs (little-endian)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BigInt512 {
    /// Limbs in little-endian order (limb[0] is least significant)
    pub limbs: [u64; 8],
}

impl BigInt256 {
    /// Create zero
    pub fn zero() -> Self {
        BigInt256 { limbs: [0; 4] }
    }

    /// Create one
    pub fn one() -> Self {
        BigInt256 { limbs: [1, 0, 0, 0] }
    }

    /// Create from u64
    pub fn from_u64(x: u64) -> Self {
        BigInt256 { limbs: [x, 0, 0, 0] }
    }

    /// Create from hex string (at most 64 hex digits, shorter strings are
    /// zero-padded on the left). Panics on malformed hex; callers parsing
    /// untrusted input go through `from_bytes_be` instead.
    pub fn from_hex(hex: &str) -> Self {
        let hex = hex.trim_start_matches("0x");
        assert!(hex.len() <= 64, "hex string exceeds 256 bits");
        let padded = format!("{:0>64}", hex);
        let bytes = hex::decode(&padded).expect("invalid hex string");
        let mut buf = [0u8; 32];
        buf.copy_from_slice(&bytes);
        Self::from_bytes_be(&buf)
    }

    /// Create from big-endian bytes (up to 32; shorter slices are
    /// interpreted as the low-order bytes)
    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        debug_assert!(bytes.len() <= 32);
        let mut buf = [0u8; 32];
        let offset = 32 - bytes.len().min(32);
        buf[offset..].copy_from_slice(&bytes[..bytes.len().min(32)]);

        let mut limbs = [0u64; 4];
        for i in 0..4 {
            let mut chunk = [0u8; 8];
            chunk.copy_from_slice(&buf[(3 - i) * 8..(4 - i) * 8]);
            limbs[i] = u64::from_be_bytes(chunk);
        }
        BigInt256 { limbs }
    }

    /// Create from u64 array (little-endian)
    pub fn from_u64_array(arr: [u64; 4]) -> Self {
        BigInt256 { limbs: arr }
    }

    /// Convert to big-endian bytes
    pub fn to_bytes_be(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for i in 0..4 {
            let limb_bytes = self.limbs[3 - i].to_be_bytes();
            bytes[i * 8..(i + 1) * 8].copy_from_slice(&limb_bytes);
        }
        bytes
    }

    /// Serialize as big-endian into a caller-sized buffer, left-padded
    /// with zeros. Buffers shorter than the value truncate high bytes.
    pub fn write_bytes_be(&self, out: &mut [u8]) {
        let full = self.to_bytes_be();
        let n = out.len();
        out.fill(0);
        if n >= 32 {
            out[n - 32..].copy_from_slice(&full);
        } else {
            out.copy_from_slice(&full[32 - n..]);
        }
    }

    /// Convert to hex string (64 lowercase digits)
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes_be())
    }

    /// Least significant 64 bits
    pub fn low_u64(&self) -> u64 {
        self.limbs[0]
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.limbs == [0; 4]
    }

    /// Bit length
    pub fn bit_length(&self) -> usize {
        for i in (0..4).rev() {
            if self.limbs[i] != 0 {
                return 64 * (i + 1) - self.limbs[i].leading_zeros() as usize;
            }
        }
        0
    }

    /// Get bit at position
    pub fn get_bit(&self, bit: usize) -> bool {
        let limb = bit / 64;
        if limb >= 4 {
            return false;
        }
        (self.limbs[limb] >> (bit % 64)) & 1 != 0
    }

    fn set_bit(&mut self, bit: usize) {
        self.limbs[bit / 64] |= 1u64 << (bit % 64);
    }

    /// Division with remainder: returns (quotient, remainder)
    pub fn div_rem(&self, divisor: &BigInt256) -> (BigInt256, BigInt256) {
        assert!(!divisor.is_zero(), "division by zero");

        if *self < *divisor {
            return (BigInt256::zero(), *self);
        }

        let shift = self.bit_length() - divisor.bit_length();
        let mut quotient = BigInt256::zero();
        let mut remainder = *self;

        // divisor << s never exceeds 256 bits because s is bounded by the
        // bit-length gap
        for s in (0..=shift).rev() {
            let shifted = divisor.left_shift(s);
            if remainder >= shifted {
                remainder = remainder - shifted;
                quotient.set_bit(s);
            }
        }

        (quotient, remainder)
    }

    /// self mod m
    pub fn rem(&self, m: &BigInt256) -> BigInt256 {
        self.div_rem(m).1
    }

    /// (self + other) mod m; inputs must already be reduced
    pub fn add_mod(&self, other: &BigInt256, m: &BigInt256) -> BigInt256 {
        let (sum, carry) = self.overflowing_add(other);
        if carry || sum >= *m {
            // wrapping subtraction is exact here: carry means the true sum
            // is sum + 2^256, and 2^256 - m cancels the wrap
            sum - *m
        } else {
            sum
        }
    }

    /// (self - other) mod m; inputs must already be reduced
    pub fn sub_mod(&self, other: &BigInt256, m: &BigInt256) -> BigInt256 {
        if self >= other {
            *self - *other
        } else {
            *m - (*other - *self)
        }
    }

    /// (self * other) mod m via a widening product
    pub fn mul_mod(&self, other: &BigInt256, m: &BigInt256) -> BigInt256 {
        self.mul_wide(other).rem(m)
    }

    /// Full 512-bit schoolbook product
    pub fn mul_wide(&self, other: &BigInt256) -> BigInt512 {
        let mut result = [0u64; 8];
        for i in 0..4 {
            let mut carry = 0u128;
            for j in 0..4 {
                let prod = self.limbs[i] as u128 * other.limbs[j] as u128
                    + result[i + j] as u128
                    + carry;
                result[i + j] = prod as u64;
                carry = prod >> 64;
            }
            result[i + 4] = carry as u64;
        }
        BigInt512 { limbs: result }
    }

    /// 256 x 64 -> 320-bit product, widened to BigInt512
    pub fn mul_u64_wide(&self, word: u64) -> BigInt512 {
        let mut result = [0u64; 8];
        let mut carry = 0u128;
        for i in 0..4 {
            let prod = self.limbs[i] as u128 * word as u128 + carry;
            result[i] = prod as u64;
            carry = prod >> 64;
        }
        result[4] = carry as u64;
        BigInt512 { limbs: result }
    }

    /// Modular exponentiation (square-and-multiply)
    pub fn mod_pow(&self, exponent: &BigInt256, m: &BigInt256) -> BigInt256 {
        let mut result = BigInt256::one().rem(m);
        let mut base = self.rem(m);
        for bit in 0..exponent.bit_length() {
            if exponent.get_bit(bit) {
                result = result.mul_mod(&base, m);
            }
            base = base.mul_mod(&base, m);
        }
        result
    }

    /// Modular inverse for prime modulus via Fermat's little theorem.
    /// Returns None when self ≡ 0 (mod m).
    pub fn mod_inverse(&self, m: &BigInt256) -> Option<BigInt256> {
        if self.rem(m).is_zero() {
            return None;
        }
        let exp = *m - BigInt256::from_u64(2);
        Some(self.mod_pow(&exp, m))
    }

    /// Uniform-ish random value in [1, n)
    pub fn rand_below<R: Rng>(n: &BigInt256, rng: &mut R) -> BigInt256 {
        loop {
            let limbs = [rng.gen(), rng.gen(), rng.gen(), rng.gen()];
            let candidate = BigInt256 { limbs }.rem(n);
            if !candidate.is_zero() {
                return candidate;
            }
        }
    }

    fn overflowing_add(&self, other: &BigInt256) -> (BigInt256, bool) {
        let mut result = [0u64; 4];
        let mut carry = 0u64;
        for i in 0..4 {
            let (sum, c1) = self.limbs[i].overflowing_add(other.limbs[i]);
            let (sum, c2) = sum.overflowing_add(carry);
            result[i] = sum;
            carry = (c1 as u64) + (c2 as u64);
        }
        (BigInt256 { limbs: result }, carry != 0)
    }

    fn left_shift(&self, n: usize) -> BigInt256 {
        if n >= 256 {
            return BigInt256::zero();
        }
        let limb_shift = n / 64;
        let bit_shift = n % 64;
        let mut result = [0u64; 4];
        for i in (limb_shift..4).rev() {
            let src = i - limb_shift;
            result[i] = self.limbs[src] << bit_shift;
            if bit_shift > 0 && src > 0 {
                result[i] |= self.limbs[src - 1] >> (64 - bit_shift);
            }
        }
        BigInt256 { limbs: result }
    }
}

impl BigInt512 {
    /// Create from BigInt256 (zero-extended)
    pub fn from_bigint256(x: &BigInt256) -> Self {
        BigInt512 {
            limbs: [x.limbs[0], x.limbs[1], x.limbs[2], x.limbs[3], 0, 0, 0, 0],
        }
    }

    /// Create zero
    pub fn zero() -> Self {
        BigInt512 { limbs: [0; 8] }
    }

    /// Create from big-endian bytes (up to 64)
    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        debug_assert!(bytes.len() <= 64);
        let mut buf = [0u8; 64];
        let offset = 64 - bytes.len().min(64);
        buf[offset..].copy_from_slice(&bytes[..bytes.len().min(64)]);

        let mut limbs = [0u64; 8];
        for i in 0..8 {
            let mut chunk = [0u8; 8];
            chunk.copy_from_slice(&buf[(7 - i) * 8..(8 - i) * 8]);
            limbs[i] = u64::from_be_bytes(chunk);
        }
        BigInt512 { limbs }
    }

    /// Truncate to the low 256 bits
    pub fn to_bigint256(&self) -> BigInt256 {
        BigInt256 {
            limbs: [self.limbs[0], self.limbs[1], self.limbs[2], self.limbs[3]],
        }
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.limbs == [0; 8]
    }

    /// Bit length
    pub fn bit_length(&self) -> usize {
        for i in (0..8).rev() {
            if self.limbs[i] != 0 {
                return 64 * (i + 1) - self.limbs[i].leading_zeros() as usize;
            }
        }
        0
    }

    /// Accumulate another 512-bit value (wrapping; callers keep sums in range)
    pub fn add_assign(&mut self, other: &BigInt512) {
        let mut carry = 0u64;
        for i in 0..8 {
            let (sum, c1) = self.limbs[i].overflowing_add(other.limbs[i]);
            let (sum, c2) = sum.overflowing_add(carry);
            self.limbs[i] = sum;
            carry = (c1 as u64) + (c2 as u64);
        }
    }

    /// Exact division by a single word, truncating the remainder
    pub fn div_u64(&self, divisor: u64) -> BigInt512 {
        assert!(divisor != 0, "division by zero");
        let mut result = [0u64; 8];
        let mut remainder = 0u128;
        for i in (0..8).rev() {
            let acc = (remainder << 64) | self.limbs[i] as u128;
            result[i] = (acc / divisor as u128) as u64;
            remainder = acc % divisor as u128;
        }
        BigInt512 { limbs: result }
    }

    /// self mod m, for a nonzero 256-bit modulus. Bit-serial reduction:
    /// the running remainder stays below m, so one conditional subtraction
    /// per bit suffices.
    pub fn rem(&self, m: &BigInt256) -> BigInt256 {
        assert!(!m.is_zero(), "reduction by zero modulus");
        let mut rem = BigInt256::zero();
        for bit in (0..self.bit_length()).rev() {
            let msb = rem.get_bit(255);
            rem = rem.left_shift(1);
            let limb = bit / 64;
            if (self.limbs[limb] >> (bit % 64)) & 1 != 0 {
                rem.limbs[0] |= 1;
            }
            // msb set means the shifted value overflowed 2^256 and is
            // certainly >= m; wrapping subtraction stays exact
            if msb || rem >= *m {
                rem = rem - *m;
            }
        }
        rem
    }
}

// Limbs are little-endian, so a derived Ord would compare the least
// significant limb first. Compare from the most significant limb down.
impl Ord for BigInt256 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        for i in (0..4).rev() {
            match self.limbs[i].cmp(&other.limbs[i]) {
                std::cmp::Ordering::Equal => continue,
                ord => return ord,
            }
        }
        std::cmp::Ordering::Equal
    }
}

impl PartialOrd for BigInt256 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigInt512 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        for i in (0..8).rev() {
            match self.limbs[i].cmp(&other.limbs[i]) {
                std::cmp::Ordering::Equal => continue,
                ord => return ord,
            }
        }
        std::cmp::Ordering::Equal
    }
}

impl PartialOrd for BigInt512 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for BigInt256 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.overflowing_add(&other).0
    }
}

impl Sub for BigInt256 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        let mut result = [0u64; 4];
        let mut borrow = 0u64;
        for i in 0..4 {
            let (diff, b1) = self.limbs[i].overflowing_sub(other.limbs[i]);
            let (diff, b2) = diff.overflowing_sub(borrow);
            result[i] = diff;
            borrow = (b1 as u64) + (b2 as u64);
        }
        BigInt256 { limbs: result }
    }
}

impl fmt::Display for BigInt256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for i in (0..4).rev() {
            write!(f, "{:016x}", self.limbs[i])?;
        }
        Ok(())
    }
}
