//! ECDSA sample suites
//!
//! Fixed-layout binary suites of known (k, Q, signature) records used to
//! calibrate and benchmark recovery. A suite starts with the magic
//! `ECDS`, a version word and a record count, followed by fixed-width
//! records: every scalar and coordinate is 32 bytes big-endian regardless
//! of curve size, so 128-bit suites are left-padded.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::math::bigint::BigInt256;
use crate::math::curve::Curve;

/// "ECDS" in big-endian byte order
pub const SUITE_MAGIC: u32 = 0x4543_4453;
pub const SUITE_VERSION: u32 = 1;

const FIELD_BYTES: usize = 32;

/// One calibration record: nonce scalar, public point and signature parts
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRecord {
    /// Scalar bit width of the group the record was generated on
    pub bit_length: u32,
    pub k: BigInt256,
    pub qx: BigInt256,
    pub qy: BigInt256,
    pub r: BigInt256,
    pub s: BigInt256,
    pub hash: [u8; 32],
    /// Key size in bits as recorded by the producer, normally equal to
    /// bit_length
    pub key_size: u32,
}

/// A named set of sample records for one key size
#[derive(Debug, Clone, Default)]
pub struct SampleSuite {
    pub records: Vec<SampleRecord>,
}

impl SampleSuite {
    pub fn new() -> Self {
        SampleSuite::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push(&mut self, record: SampleRecord) {
        self.records.push(record);
    }

    /// Generate a deterministic suite on the given curve: random scalars,
    /// their public points and synthetic signature parts
    pub fn generate(curve: &Curve, count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let bit_length = curve.order_bits() as u32;
        let mut suite = SampleSuite::new();
        for _ in 0..count {
            let k = curve.rand_scalar(&mut rng);
            let q = curve.scalar_mul_base(&k);
            let (qx, qy) = q.affine().unwrap_or((BigInt256::zero(), BigInt256::zero()));
            let r = qx.rem(&curve.n);
            let mut hash = [0u8; 32];
            rng.fill(&mut hash[..]);
            let z = BigInt256::from_bytes_be(&hash).rem(&curve.n);
            // s = k^{-1}(z + r·k) mod n with the nonce reused as the key,
            // enough structure for calibration purposes
            let s = match k.mod_inverse(&curve.n) {
                Some(inv) => inv.mul_mod(&z.add_mod(&r.mul_mod(&k, &curve.n), &curve.n), &curve.n),
                None => BigInt256::zero(),
            };
            suite.push(SampleRecord {
                bit_length,
                k,
                qx,
                qy,
                r,
                s,
                hash,
                key_size: bit_length,
            });
        }
        suite
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("failed to create suite file {}", path.display()))?;
        let mut w = BufWriter::new(file);
        w.write_all(&SUITE_MAGIC.to_be_bytes())?;
        w.write_all(&SUITE_VERSION.to_le_bytes())?;
        w.write_all(&(self.records.len() as u32).to_le_bytes())?;
        let mut buf = [0u8; FIELD_BYTES];
        for rec in &self.records {
            w.write_all(&rec.bit_length.to_le_bytes())?;
            for field in [&rec.k, &rec.qx, &rec.qy, &rec.r, &rec.s] {
                field.write_bytes_be(&mut buf);
                w.write_all(&buf)?;
            }
            w.write_all(&rec.hash)?;
            w.write_all(&rec.key_size.to_le_bytes())?;
        }
        w.flush()?;
        info!("wrote {} sample records to {}", self.len(), path.display());
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open suite file {}", path.display()))?;
        let mut r = BufReader::new(file);

        let mut word = [0u8; 4];
        r.read_exact(&mut word).context("suite truncated: magic")?;
        let magic = u32::from_be_bytes(word);
        if magic != SUITE_MAGIC {
            bail!("bad suite magic: {:#010x}, expected {:#010x}", magic, SUITE_MAGIC);
        }
        r.read_exact(&mut word).context("suite truncated: version")?;
        let version = u32::from_le_bytes(word);
        if version != SUITE_VERSION {
            bail!("unsupported suite version: {}", version);
        }
        r.read_exact(&mut word).context("suite truncated: count")?;
        let count = u32::from_le_bytes(word) as usize;

        let mut suite = SampleSuite::new();
        let mut buf = [0u8; FIELD_BYTES];
        for i in 0..count {
            r.read_exact(&mut word)
                .with_context(|| format!("suite truncated at record {}", i))?;
            let bit_length = u32::from_le_bytes(word);
            let mut fields = [BigInt256::zero(); 5];
            for field in fields.iter_mut() {
                r.read_exact(&mut buf)
                    .with_context(|| format!("suite truncated at record {}", i))?;
                *field = BigInt256::from_bytes_be(&buf);
            }
            let mut hash = [0u8; 32];
            r.read_exact(&mut hash)
                .with_context(|| format!("suite truncated at record {}", i))?;
            r.read_exact(&mut word)
                .with_context(|| format!("suite truncated at record {}", i))?;
            let key_size = u32::from_le_bytes(word);
            suite.push(SampleRecord {
                bit_length,
                k: fields[0],
                qx: fields[1],
                qy: fields[2],
                r: fields[3],
                s: fields[4],
                hash,
                key_size,
            });
        }
        Ok(suite)
    }
}
