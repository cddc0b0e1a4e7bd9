//! Shared helpers for the integration tests.
//!
//! `texture`, `sample_plane` and `shifted_texture` are the same functions as
//! in the crate's `#[cfg(test)]` `testing` module, which integration tests
//! cannot import. Keep the two in step. The texture has unit amplitude in
//! both; callers scale it (the 8-bit frames here use
//! `128 + U8_TEXTURE_GAIN * texture`).

#![allow(dead_code)]

use lkflow::{Dims, Real};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Gain applied to `texture` for 8-bit frames, keeping them inside 0..=255.
pub const U8_TEXTURE_GAIN: f64 = 20.0;

pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Smooth texture with gradients in every direction, values within ±3.
pub fn texture(x: f64, y: f64) -> f64 {
    (0.3 * x).sin() + (0.25 * y).cos() + (0.2 * (x + y)).sin()
}

pub fn sample_plane<T: Real>(dims: Dims, f: impl Fn(f64, f64) -> f64) -> Vec<T> {
    let mut data = Vec::with_capacity(dims.len());
    for y in 0..dims.rows {
        for x in 0..dims.cols {
            data.push(T::from_f64(f(x as f64, y as f64)));
        }
    }
    data
}

pub fn shifted_texture<T: Real>(dims: Dims, dx: f64, dy: f64) -> Vec<T> {
    sample_plane(dims, |x, y| texture(x - dx, y - dy))
}

/// `texture` scaled by `U8_TEXTURE_GAIN` around mid-grey and rounded.
pub fn shifted_texture_u8(dims: Dims, dx: f64, dy: f64) -> Vec<u8> {
    to_u8(sample_plane(dims, |x, y| {
        128.0 + U8_TEXTURE_GAIN * texture(x - dx, y - dy)
    }))
}

/// Mid-grey frame with independent ±1 grey-level noise on every pixel.
pub fn noisy_flat_frame_u8(dims: Dims, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..dims.len())
        .map(|_| (128 + rng.random_range(-1i32..=1)) as u8)
        .collect()
}

pub fn random_frame_u8(dims: Dims, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..dims.len()).map(|_| rng.random::<u8>()).collect()
}

pub fn to_f32(frame: &[u8]) -> Vec<f32> {
    frame.iter().map(|&v| v as f32).collect()
}

fn to_u8(values: Vec<f64>) -> Vec<u8> {
    values
        .into_iter()
        .map(|v| v.round().clamp(0.0, 255.0) as u8)
        .collect()
}

pub fn mean_over<T: Real>(plane: &[T], dims: Dims, margin: usize) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;
    for y in margin..dims.rows - margin {
        for x in margin..dims.cols - margin {
            sum += plane[dims.index(y, x)].as_f64();
            n += 1;
        }
    }
    sum / n as f64
}
