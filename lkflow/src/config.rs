//! Configuration for the streaming estimators.
//!
//! Both structs are flat, serializable and come with defaults that work for
//! every sample type. Call `validate()` before use; the estimators do so on
//! construction.
//!
//! `noise_threshold` is given for intensities on a 0..1 scale. Structure
//! tensor entries grow with the square of the intensity scale, so
//! `flow_params::<S>()` multiplies it by `S::RANGE²`: about 254 for `u8`
//! frames, unchanged for float frames.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::gradient::DogKernels;
use crate::sample::{Real, Sample};
use crate::solver::FlowParams;

/// Default minimum eigenvalue for a confident estimate, on a 0..1 intensity
/// scale (one 8-bit grey level, 1/255).
pub const DEFAULT_NOISE_THRESHOLD: f64 = 0.0039;

// ============================================================================
// Two-frame
// ============================================================================

/// Two-frame Lucas-Kanade settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LkConfig {
    /// Minimum eigenvalue of the structure tensor on a 0..1 intensity scale.
    /// Pixels below it get zero velocity (or normal flow, if enabled).
    pub noise_threshold: f64,
    /// Estimate the gradient-direction component along straight edges.
    pub include_normal_flow: bool,
}

impl Default for LkConfig {
    fn default() -> Self {
        Self {
            noise_threshold: DEFAULT_NOISE_THRESHOLD,
            include_normal_flow: false,
        }
    }
}

impl LkConfig {
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.noise_threshold)
    }

    /// Gating parameters for `S` frames, threshold scaled by `S::RANGE²`.
    pub fn flow_params<S: Sample>(&self) -> FlowParams<S::Real> {
        FlowParams::new(scaled_threshold::<S>(self.noise_threshold), self.include_normal_flow)
    }
}

// ============================================================================
// Multi-frame (derivative of Gaussian)
// ============================================================================

/// Derivative-of-Gaussian Lucas-Kanade settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DogConfig {
    /// Frames spanned by the temporal filters, current frame included.
    pub num_frames: usize,
    /// Standard deviation of the image smoothing filter. The spatial and
    /// temporal derivative filters are derivatives of this Gaussian.
    pub image_filter_sigma: f64,
    /// Standard deviation of the window that weights gradient products.
    pub gradient_filter_sigma: f64,
    pub noise_threshold: f64,
    pub include_normal_flow: bool,
}

impl Default for DogConfig {
    fn default() -> Self {
        Self {
            num_frames: 3,
            image_filter_sigma: 1.5,
            gradient_filter_sigma: 1.0,
            noise_threshold: DEFAULT_NOISE_THRESHOLD,
            include_normal_flow: false,
        }
    }
}

impl DogConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_frames < 2 {
            return Err(Error::TooFewFrames(self.num_frames));
        }
        validate_sigma("image_filter_sigma", self.image_filter_sigma)?;
        validate_sigma("gradient_filter_sigma", self.gradient_filter_sigma)?;
        validate_threshold(self.noise_threshold)
    }

    /// Builds the five filter kernels after validating the settings.
    pub fn kernels<T: Real>(&self) -> Result<DogKernels<T>> {
        self.validate()?;
        let kernels = DogKernels::from_sigmas(
            self.num_frames,
            self.image_filter_sigma,
            self.gradient_filter_sigma,
        );
        kernels.validate()?;
        Ok(kernels)
    }

    /// Gating parameters for `S` frames, threshold scaled by `S::RANGE²`.
    pub fn flow_params<S: Sample>(&self) -> FlowParams<S::Real> {
        FlowParams::new(scaled_threshold::<S>(self.noise_threshold), self.include_normal_flow)
    }

    /// How many frames behind the newest one the estimate refers to.
    ///
    /// The temporal filters are centred on the middle of their window, so
    /// even frame counts land half-way between two frames.
    pub fn latency(&self) -> f64 {
        self.num_frames.saturating_sub(1) as f64 / 2.0
    }
}

fn scaled_threshold<S: Sample>(threshold: f64) -> S::Real {
    <S::Real as Real>::from_f64(threshold * S::RANGE * S::RANGE)
}

fn validate_threshold(value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidThreshold(value))
    }
}

fn validate_sigma(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidSigma { name, value })
    }
}
