//! Testing utilities for lkflow.

#![allow(dead_code)]

use crate::plane::Dims;
use crate::sample::Real;

/// Initialize tracing subscriber for tests.
/// Safe to call multiple times - will only initialize once.
/// Respects RUST_LOG env var, defaults to "info".
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Smooth texture with gradients in every direction, values within ±3.
/// `tests/helpers` carries the same definition for the integration tests.
pub fn texture(x: f64, y: f64) -> f64 {
    (0.3 * x).sin() + (0.25 * y).cos() + (0.2 * (x + y)).sin()
}

/// Samples `f(x, y)` over `dims`, row-major.
pub fn sample_plane<T: Real>(dims: Dims, f: impl Fn(f64, f64) -> f64) -> Vec<T> {
    let mut data = Vec::with_capacity(dims.len());
    for y in 0..dims.rows {
        for x in 0..dims.cols {
            data.push(T::from_f64(f(x as f64, y as f64)));
        }
    }
    data
}

/// `texture` translated by `(dx, dy)`.
pub fn shifted_texture<T: Real>(dims: Dims, dx: f64, dy: f64) -> Vec<T> {
    sample_plane(dims, |x, y| texture(x - dx, y - dy))
}

/// Step edge between columns `edge - 1` and `edge`: `low` left, `high` right.
pub fn vertical_edge<T: Real>(dims: Dims, edge: usize, low: f64, high: f64) -> Vec<T> {
    sample_plane(dims, |x, _| if (x as usize) < edge { low } else { high })
}
