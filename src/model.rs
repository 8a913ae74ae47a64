//! Micro-model store
//!
//! A micro-model captures what a finished run learned about one curve:
//! the generator's estimated scalar-space location, its clock view, the
//! fitted tori and the interval-reduction statistics. Models are persisted
//! with bincode (JSON export for inspection) and replayed later to seed a
//! search interval without re-running the full analysis.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::embedding::ClockPosition;
use crate::math::bigint::BigInt256;
use crate::tracker::TorusDescriptor;

/// Serialized model format version
const MODEL_VERSION: u32 = 1;

/// Everything a run learned about one curve, small enough to ship around
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MicroModel {
    pub version: u32,
    pub name: String,
    /// Scalar bit width of the modeled group
    pub bit_length: usize,
    /// Group order, big-endian hex
    pub n: String,
    pub num_tori: usize,
    /// Estimated scalar-space location of the generator
    pub g_estimate: f64,
    pub g_confidence: f64,
    pub clock_p: Option<ClockPosition>,
    pub clock_q: Option<ClockPosition>,
    pub torus_parameters: Vec<TorusDescriptor>,
    pub reduction_factor: f64,
    pub best_reduction: f64,
    /// Fraction of calibration samples whose true scalar fell inside the
    /// predicted interval
    pub capture_rate: f64,
}

impl MicroModel {
    pub fn new(name: &str, n: &BigInt256) -> Self {
        MicroModel {
            version: MODEL_VERSION,
            name: name.to_string(),
            bit_length: n.bit_length(),
            n: n.to_hex(),
            num_tori: 0,
            g_estimate: 0.0,
            g_confidence: 0.0,
            clock_p: None,
            clock_q: None,
            torus_parameters: Vec::new(),
            reduction_factor: 1.0,
            best_reduction: 1.0,
            capture_rate: 0.0,
        }
    }

    pub fn order(&self) -> BigInt256 {
        BigInt256::from_hex(&self.n)
    }

    pub fn set_g_estimate(&mut self, estimate: f64, confidence: f64) {
        self.g_estimate = estimate;
        self.g_confidence = confidence.clamp(0.0, 1.0);
    }

    pub fn set_clock_info(&mut self, clock_p: ClockPosition, clock_q: ClockPosition) {
        self.clock_p = Some(clock_p);
        self.clock_q = Some(clock_q);
    }

    pub fn add_torus(&mut self, torus: TorusDescriptor) {
        self.torus_parameters.push(torus);
        self.num_tori = self.torus_parameters.len();
    }

    pub fn record_reduction(&mut self, reduction_factor: f64, capture_rate: f64) {
        self.reduction_factor = reduction_factor;
        self.best_reduction = self.best_reduction.max(reduction_factor);
        self.capture_rate = capture_rate.clamp(0.0, 1.0);
    }

    /// Predicted scalar interval for a new target: the generator estimate
    /// widened by the strongest torus amplitude, clipped to [0, 2^bits)
    pub fn recover_interval(&self) -> (f64, f64) {
        let amplitude = self
            .torus_parameters
            .first()
            .map(|t| t.amplitude)
            .unwrap_or(0.0);
        let space = 2f64.powi(self.bit_length.min(512) as i32);
        let lo = (self.g_estimate - amplitude).max(0.0);
        let hi = (self.g_estimate + amplitude).min(space - 1.0);
        (lo, hi)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("failed to create model file {}", path.display()))?;
        bincode::serialize_into(BufWriter::new(file), self)
            .context("failed to serialize model")?;
        info!("saved model '{}' to {}", self.name, path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open model file {}", path.display()))?;
        let model: MicroModel = bincode::deserialize_from(BufReader::new(file))
            .context("failed to deserialize model")?;
        if model.version != MODEL_VERSION {
            anyhow::bail!(
                "model version mismatch: found {}, expected {}",
                model.version,
                MODEL_VERSION
            );
        }
        Ok(model)
    }

    /// Human-readable export next to the binary form
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("failed to create json file {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .context("failed to write model json")?;
        Ok(())
    }
}

/// On-disk collection of models keyed by name
#[derive(Debug, Default)]
pub struct ModelStore {
    models: Vec<MicroModel>,
}

impl ModelStore {
    pub fn new() -> Self {
        ModelStore::default()
    }

    /// Insert or replace by name
    pub fn put(&mut self, model: MicroModel) {
        if let Some(existing) = self.models.iter_mut().find(|m| m.name == model.name) {
            *existing = model;
        } else {
            self.models.push(model);
        }
    }

    pub fn get(&self, name: &str) -> Option<&MicroModel> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Load every `.model` file in a directory
    pub fn load_dir(path: &Path) -> Result<Self> {
        let mut store = ModelStore::new();
        for entry in std::fs::read_dir(path)
            .with_context(|| format!("failed to read model directory {}", path.display()))?
        {
            let entry = entry?;
            if entry.path().extension().map(|e| e == "model").unwrap_or(false) {
                store.put(MicroModel::load(&entry.path())?);
            }
        }
        info!("loaded {} models from {}", store.len(), path.display());
        Ok(store)
    }

    pub fn save_dir(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("failed to create model directory {}", path.display()))?;
        for model in &self.models {
            model.save(&path.join(format!("{}.model", model.name)))?;
        }
        Ok(())
    }
}
