//! Lkflow - dense Lucas-Kanade optical flow.
//!
//! Two estimators share one solver:
//! - Two-frame Lucas-Kanade with 5-tap derivative and window filters
//! - Multi-frame derivative-of-Gaussian (DoG) Lucas-Kanade over a frame history
//!
//! Inputs may be `u8`, `f32` or `f64`; 8-bit frames are promoted to `f32`.
//! Pixels where the structure tensor is too weak to trust get zero velocity,
//! or optionally the flow component along the image gradient.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lkflow::{Dims, DogConfig, LucasKanadeDog};
//!
//! let dims = Dims::new(480, 640);
//! let mut estimator = LucasKanadeDog::<u8>::new(dims, DogConfig::default())?;
//!
//! for frame in frames {
//!     let field = estimator.estimate(&frame)?;
//!     println!("{} confident pixels", field.stats().full);
//! }
//! ```
//!
//! The free functions [`lk_flow`] and [`dog_flow`] do the same work on
//! caller-owned buffers without keeping any state.

mod config;
pub mod convolution;
mod engine;
mod error;
mod estimator;
mod frame_stack;
mod gradient;
mod plane;
mod sample;
mod solver;

#[cfg(test)]
pub mod testing;

// ============================================================================
// Core types
// ============================================================================

pub use error::{Error, Result};
pub use plane::{Dims, Plane};
pub use sample::{promote_into, Real, Sample};

// ============================================================================
// Configuration
// ============================================================================

pub use config::{DogConfig, LkConfig, DEFAULT_NOISE_THRESHOLD};

// ============================================================================
// Filters and moments
// ============================================================================

pub use convolution::kernels::{
    binomial_window_5, central_difference_5, gaussian_derivative_kernel_1d,
    gaussian_derivative_kernel_1d_with_len, gaussian_kernel_1d, gaussian_kernel_1d_with_len,
};
pub use frame_stack::{centred_offset, DelayLine, FrameStack};
pub use gradient::{dog_moments, two_frame_moments, DogKernels, Moments};

// ============================================================================
// Solver
// ============================================================================

pub use solver::{solve_field, Estimate, FlowParams, SolveStats, StructureTensor};

// ============================================================================
// Flow entry points
// ============================================================================

pub use engine::{
    dog_flow, dog_flow_f32, dog_flow_f64, dog_flow_u8, lk_flow, lk_flow_f32, lk_flow_f64,
    lk_flow_u8, DogParams, FlowOutput, LkParams,
};

// ============================================================================
// Streaming estimators
// ============================================================================

pub use estimator::{FlowField, LucasKanade, LucasKanadeDog};
