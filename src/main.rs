//! GeoRecover - geometric scalar recovery engine
//!
//! Embeds anchor scalars into a prime-indexed lattice, triangulates
//! candidates for a target point and verifies them on-curve.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use log::{info, warn};

use georecover::config::EngineConfig;
use georecover::math::bigint::BigInt256;
use georecover::math::curve::Point;
use georecover::model::MicroModel;
use georecover::recovery::{RecoveryContext, RecoveryState};
use georecover::samples::SampleSuite;
use georecover::tracker::write_torus_csv;
use georecover::utils::logging::setup_logging;

/// Command line arguments
#[derive(Parser)]
#[command(name = "georecover", about = "Geometric scalar recovery engine")]
struct Args {
    #[command(flatten)]
    config: EngineConfig,

    /// Recover a scalar we planted ourselves: anchors are generated, one
    /// becomes the target, and the run must find it again
    #[arg(long)]
    self_test: bool,

    /// Target public point, x coordinate (hex)
    #[arg(long)]
    target_x: Option<String>,

    /// Target public point, y coordinate (hex)
    #[arg(long)]
    target_y: Option<String>,

    /// Seed for anchor generation
    #[arg(long, default_value_t = 0xC0FFEE)]
    seed: u64,

    /// Write the fitted tori to a CSV file
    #[arg(long)]
    torus_csv: Option<PathBuf>,

    /// Persist a micro-model of the run
    #[arg(long)]
    model_out: Option<PathBuf>,

    /// Run calibration over an ECDS sample suite instead of a single target
    #[arg(long)]
    suite: Option<PathBuf>,

    /// Generate an ECDS sample suite with this many records and exit
    #[arg(long)]
    generate_suite: Option<usize>,

    /// Output path for --generate-suite
    #[arg(long, default_value = "calibration.ecds")]
    suite_out: PathBuf,
}

fn parse_hex_scalar(s: &str) -> Result<BigInt256> {
    let trimmed = s.trim_start_matches("0x");
    if trimmed.is_empty() || trimmed.len() > 64 {
        return Err(anyhow!("hex scalar must be 1..=64 digits: {}", s));
    }
    let bytes = hex::decode(format!("{:0>width$}", trimmed, width = (trimmed.len() + 1) / 2 * 2))
        .map_err(|e| anyhow!("bad hex scalar {}: {}", s, e))?;
    Ok(BigInt256::from_bytes_be(&bytes))
}

fn main() -> Result<()> {
    setup_logging().map_err(|e| anyhow!("failed to init logging: {}", e))?;
    let args = Args::parse();
    args.config.validate()?;

    let mut ctx = RecoveryContext::new(args.config.clone())?;

    if let Some(count) = args.generate_suite {
        let suite = SampleSuite::generate(ctx.curve(), count, args.seed);
        suite.write(&args.suite_out)?;
        info!("suite written to {}", args.suite_out.display());
        return Ok(());
    }

    info!(
        "engine start: curve {}, D={}, {} anchors, {} max iterations",
        ctx.curve().name,
        args.config.num_dimensions,
        args.config.num_anchors,
        args.config.max_iterations
    );

    let scalars = ctx.generate_anchors(args.config.num_anchors, args.seed);
    ctx.initialize()?;

    if let Some(path) = &args.suite {
        return run_suite(&mut ctx, path);
    }

    let (target, planted) = select_target(&args, &mut ctx, &scalars)?;
    let outcome = ctx.recover(&target);

    match outcome.state {
        RecoveryState::Success => {
            let k = outcome.k.ok_or_else(|| anyhow!("success without a scalar"))?;
            info!(
                "recovered scalar in {} iterations: {}",
                outcome.iterations,
                k.to_hex()
            );
            if let Some(expected) = planted {
                if k != expected {
                    warn!("recovered a different preimage than the planted scalar");
                }
            }
        }
        state => {
            warn!(
                "no verified scalar after {} iterations (terminal state {})",
                outcome.iterations, state
            );
        }
    }

    write_artifacts(&args, &mut ctx)?;
    Ok(())
}

fn select_target(
    args: &Args,
    ctx: &mut RecoveryContext,
    scalars: &[BigInt256],
) -> Result<(Point, Option<BigInt256>)> {
    if let (Some(x), Some(y)) = (&args.target_x, &args.target_y) {
        let point = Point {
            x: parse_hex_scalar(x)?,
            y: parse_hex_scalar(y)?,
            infinity: false,
        };
        if !ctx.curve().is_on_curve(&point) {
            return Err(anyhow!("target point is not on {}", ctx.curve().name));
        }
        return Ok((point, None));
    }
    if args.self_test {
        let k = *scalars
            .get(scalars.len() / 2)
            .ok_or_else(|| anyhow!("no anchors generated"))?;
        let q = ctx.curve().scalar_mul_base(&k);
        info!("self-test target planted from anchor scalar");
        return Ok((q, Some(k)));
    }
    Err(anyhow!(
        "no target: pass --target-x/--target-y or --self-test"
    ))
}

fn run_suite(ctx: &mut RecoveryContext, path: &PathBuf) -> Result<()> {
    let suite = SampleSuite::read(path)?;
    info!("calibration suite: {} records", suite.len());
    let mut recovered = 0usize;
    for (i, rec) in suite.records.iter().enumerate() {
        let target = Point {
            x: rec.qx,
            y: rec.qy,
            infinity: false,
        };
        ctx.add_anchor(rec.k, ctx.curve().scalar_mul_base(&rec.k));
        ctx.initialize()?;
        let outcome = ctx.recover(&target);
        if outcome.k == Some(rec.k.rem(&ctx.curve().n)) {
            recovered += 1;
        } else {
            warn!("record {}: scalar not recovered", i);
        }
    }
    info!(
        "calibration: {}/{} records recovered ({:.1}%)",
        recovered,
        suite.len(),
        100.0 * recovered as f64 / suite.len().max(1) as f64
    );
    Ok(())
}

fn write_artifacts(args: &Args, ctx: &mut RecoveryContext) -> Result<()> {
    let magnitude = ctx.oscillation_magnitude();
    if let Some(path) = &args.torus_csv {
        // identify_tori already ran inside oscillation_magnitude
        let _ = magnitude;
        write_torus_csv(path, ctx.tracker_tori())?;
        info!("torus CSV written to {}", path.display());
    }
    if let Some(path) = &args.model_out {
        let (name, n) = {
            let curve = ctx.curve();
            (curve.name.to_string(), curve.n)
        };
        let mut model = MicroModel::new(&name, &n);
        let clock_g = ctx.clock_view(&BigInt256::one());
        if let Some(center) = ctx.tracker_tori().first().map(|t| t.center_k) {
            let clock_center = ctx.clock_view(&BigInt256::from_u64(center.max(0.0) as u64));
            model.set_clock_info(clock_g, clock_center);
            model.set_g_estimate(center, 0.0);
        }
        for torus in ctx.tracker_tori() {
            model.add_torus(torus.clone());
        }
        model.save(path)?;
        if let Some(stem) = path.file_stem() {
            let json = path.with_file_name(format!("{}.json", stem.to_string_lossy()));
            model.save_json(&json)?;
        }
    }
    Ok(())
}
