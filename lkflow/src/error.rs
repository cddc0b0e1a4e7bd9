//! Error types for flow estimation.

use thiserror::Error;

use crate::plane::Dims;

/// Errors reported by the configuration and estimator layers.
///
/// The low-level flow functions treat malformed buffers as programmer
/// errors and panic; everything that wraps them returns these instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("Image dimensions must be non-zero, got {0}")]
    EmptyDims(Dims),

    #[error("Frame size mismatch for {dims} image: expected {expected} samples, got {actual}")]
    DimensionMismatch {
        dims: Dims,
        expected: usize,
        actual: usize,
    },

    #[error("Noise threshold must be finite and non-negative, got {0}")]
    InvalidThreshold(f64),

    #[error("{name} must be finite and positive, got {value}")]
    InvalidSigma { name: &'static str, value: f64 },

    #[error("At least 2 frames are required for temporal filtering, got {0}")]
    TooFewFrames(usize),

    #[error("Kernel '{0}' must not be empty")]
    EmptyKernel(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
