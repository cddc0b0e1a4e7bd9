//! Runs both estimators over a synthetic translating texture and logs how
//! close the recovered velocity is to the true one.
//!
//! ```text
//! cargo run -p lkflow --example synthetic_flow -- 0.5 -0.25
//! ```

use anyhow::{bail, Context, Result};

use common::log_setup::setup_logging;
use lkflow::{Dims, DogConfig, FlowField, LkConfig, LucasKanade, LucasKanadeDog};

const DIMS: Dims = Dims::new(120, 160);
const FRAMES: usize = 8;
const MARGIN: usize = 16;
/// The synthetic texture changes by a few grey levels per pixel, below the
/// default threshold meant to reject sensor noise.
const NOISE_THRESHOLD: f64 = 1e-5;

fn parse_velocity() -> Result<(f64, f64)> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => Ok((0.5, -0.25)),
        [vx, vy] => Ok((
            vx.parse().with_context(|| format!("Invalid vx: {}", vx))?,
            vy.parse().with_context(|| format!("Invalid vy: {}", vy))?,
        )),
        _ => bail!("Usage: synthetic_flow [VX VY]"),
    }
}

fn frame_at(t: usize, vx: f64, vy: f64) -> Vec<u8> {
    let mut data = Vec::with_capacity(DIMS.len());
    for y in 0..DIMS.rows {
        for x in 0..DIMS.cols {
            let x = x as f64 - vx * t as f64;
            let y = y as f64 - vy * t as f64;
            let v = 128.0 + 20.0 * ((0.3 * x).sin() + (0.25 * y).cos() + (0.2 * (x + y)).sin());
            data.push(v.round().clamp(0.0, 255.0) as u8);
        }
    }
    data
}

fn interior_mean(field: &FlowField<f32>) -> (f64, f64) {
    let (mut sx, mut sy, mut n) = (0.0, 0.0, 0usize);
    for y in MARGIN..DIMS.rows - MARGIN {
        for x in MARGIN..DIMS.cols - MARGIN {
            let (vx, vy) = field.get(x, y);
            sx += vx as f64;
            sy += vy as f64;
            n += 1;
        }
    }
    (sx / n as f64, sy / n as f64)
}

fn report(name: &str, t: usize, field: &FlowField<f32>, truth: (f64, f64)) {
    let (mx, my) = interior_mean(field);
    let stats = field.stats();
    tracing::info!(
        "{} frame {}: mean=({:.3}, {:.3}) error=({:.3}, {:.3}) full={} normal={} rejected={} latency={}",
        name,
        t,
        mx,
        my,
        mx - truth.0,
        my - truth.1,
        stats.full,
        stats.normal,
        stats.rejected,
        field.latency()
    );
}

fn main() -> Result<()> {
    setup_logging("info");
    let truth = parse_velocity()?;
    tracing::info!("True velocity ({}, {}) on a {} texture", truth.0, truth.1, DIMS);

    let lk_config = LkConfig {
        noise_threshold: NOISE_THRESHOLD,
        ..Default::default()
    };
    let dog_config = DogConfig {
        noise_threshold: NOISE_THRESHOLD,
        ..Default::default()
    };
    let mut lk = LucasKanade::<u8>::new(DIMS, lk_config)?;
    let mut dog = LucasKanadeDog::<u8>::new(DIMS, dog_config)?;

    for t in 0..FRAMES {
        let frame = frame_at(t, truth.0, truth.1);
        let lk_field = lk.estimate(&frame)?;
        let dog_field = dog.estimate(&frame)?;
        report("LK", t, &lk_field, truth);
        report("DoG", t, &dog_field, truth);
    }

    Ok(())
}
