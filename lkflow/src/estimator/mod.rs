//! Streaming estimators that keep frame history between calls.
//!
//! [`LucasKanade`] compares each frame with the one before it.
//! [`LucasKanadeDog`] keeps a [`DelayLine`] of `num_frames - 1` frames and
//! runs the derivative-of-Gaussian filters over it. Both check frame sizes
//! and report problems as [`Error`] values instead of panicking.

#[cfg(test)]
mod tests;

use crate::config::{DogConfig, LkConfig};
use crate::engine::{dog_flow, lk_flow, FlowOutput};
use crate::error::{Error, Result};
use crate::frame_stack::DelayLine;
use crate::gradient::{DogKernels, Moments};
use crate::plane::{Dims, Plane};
use crate::sample::{Real, Sample};
use crate::solver::{FlowParams, SolveStats};

// ============================================================================
// Flow field
// ============================================================================

/// Owned velocity field returned by the estimators.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowField<T> {
    vx: Plane<T>,
    vy: Plane<T>,
    stats: SolveStats,
    latency: f64,
}

impl<T: Real> FlowField<T> {
    pub fn new(vx: Plane<T>, vy: Plane<T>, stats: SolveStats, latency: f64) -> Self {
        assert_eq!(vx.dims(), vy.dims(), "Velocity planes must have equal dimensions");
        Self {
            vx,
            vy,
            stats,
            latency,
        }
    }

    /// Column (x) velocity in pixels per frame.
    #[inline]
    pub fn vx(&self) -> &Plane<T> {
        &self.vx
    }

    /// Row (y) velocity in pixels per frame.
    #[inline]
    pub fn vy(&self) -> &Plane<T> {
        &self.vy
    }

    #[inline]
    pub fn dims(&self) -> Dims {
        self.vx.dims()
    }

    #[inline]
    pub fn stats(&self) -> SolveStats {
        self.stats
    }

    /// Frames between the newest input and the frame the field refers to.
    #[inline]
    pub fn latency(&self) -> f64 {
        self.latency
    }

    /// `(vx, vy)` at column `x`, row `y`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> (T, T) {
        (*self.vx.get(x, y), *self.vy.get(x, y))
    }

    /// Speed at every pixel.
    pub fn magnitude(&self) -> Plane<T> {
        self.map(|vx, vy| vx.hypot(vy))
    }

    /// Direction of motion in radians, `atan2(vy, vx)`.
    pub fn orientation(&self) -> Plane<T> {
        self.map(|vx, vy| vy.atan2(vx))
    }

    pub fn into_parts(self) -> (Plane<T>, Plane<T>) {
        (self.vx, self.vy)
    }

    fn map(&self, f: impl Fn(T, T) -> T) -> Plane<T> {
        let data = self
            .vx
            .iter()
            .zip(self.vy.iter())
            .map(|(&vx, &vy)| f(vx, vy))
            .collect();
        Plane::new(self.dims(), data)
    }
}

fn check_frame<S>(frame: &[S], dims: Dims) -> Result<()> {
    if frame.len() != dims.len() {
        return Err(Error::DimensionMismatch {
            dims,
            expected: dims.len(),
            actual: frame.len(),
        });
    }
    Ok(())
}

fn check_dims(dims: Dims) -> Result<()> {
    if dims.is_empty() {
        return Err(Error::EmptyDims(dims));
    }
    Ok(())
}

fn snapshot<T: Real>(output: &FlowOutput<T>, stats: SolveStats, latency: f64) -> FlowField<T> {
    FlowField::new(output.vel_c.clone(), output.vel_r.clone(), stats, latency)
}

// ============================================================================
// Two-frame estimator
// ============================================================================

/// Two-frame Lucas-Kanade over a stream of frames.
///
/// The first frame (and the first after [`LucasKanade::reset`]) is compared
/// with itself and yields zero flow.
#[derive(Debug)]
pub struct LucasKanade<S: Sample> {
    config: LkConfig,
    params: FlowParams<S::Real>,
    dims: Dims,
    previous: Option<Vec<S>>,
    output: FlowOutput<S::Real>,
}

impl<S: Sample> LucasKanade<S> {
    pub fn new(dims: Dims, config: LkConfig) -> Result<Self> {
        check_dims(dims)?;
        config.validate()?;
        tracing::debug!(
            "LK estimator {}: threshold={}, normal_flow={}",
            dims,
            config.noise_threshold,
            config.include_normal_flow
        );
        Ok(Self {
            config,
            params: config.flow_params::<S>(),
            dims,
            previous: None,
            output: FlowOutput::new(dims),
        })
    }

    /// Flow from the previous frame to `frame`.
    pub fn estimate(&mut self, frame: &[S]) -> Result<FlowField<S::Real>> {
        check_frame(frame, self.dims)?;

        let previous = self.previous.as_deref().unwrap_or(frame);
        let stats = lk_flow(previous, frame, self.dims, &self.params, &mut self.output);

        match &mut self.previous {
            Some(previous) => previous.copy_from_slice(frame),
            None => self.previous = Some(frame.to_vec()),
        }
        Ok(snapshot(&self.output, stats, 0.0))
    }

    /// Forgets the previous frame.
    pub fn reset(&mut self) {
        self.previous = None;
    }

    pub fn config(&self) -> &LkConfig {
        &self.config
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    /// Moment images of the last estimate.
    pub fn moments(&self) -> &Moments<S::Real> {
        &self.output.moments
    }
}

// ============================================================================
// Multi-frame estimator
// ============================================================================

/// Derivative-of-Gaussian Lucas-Kanade over a stream of frames.
///
/// The temporal filters span `num_frames` frames; estimates refer to the
/// centre of that window, [`DogConfig::latency`] frames behind the newest.
/// Until the history fills up the oldest available frame stands in for the
/// missing ones.
#[derive(Debug)]
pub struct LucasKanadeDog<S: Sample> {
    config: DogConfig,
    params: FlowParams<S::Real>,
    dims: Dims,
    kernels: DogKernels<S::Real>,
    history: DelayLine<S>,
    output: FlowOutput<S::Real>,
}

impl<S: Sample> LucasKanadeDog<S> {
    pub fn new(dims: Dims, config: DogConfig) -> Result<Self> {
        check_dims(dims)?;
        let kernels = config.kernels()?;
        tracing::debug!(
            "DoG estimator {}: num_frames={}, image_sigma={}, gradient_sigma={}, threshold={}",
            dims,
            config.num_frames,
            config.image_filter_sigma,
            config.gradient_filter_sigma,
            config.noise_threshold
        );
        Ok(Self {
            config,
            params: config.flow_params::<S>(),
            dims,
            kernels,
            history: DelayLine::new(dims, config.num_frames - 1),
            output: FlowOutput::new(dims),
        })
    }

    /// Adds `frame` to the stream and estimates flow at the window centre.
    pub fn estimate(&mut self, frame: &[S]) -> Result<FlowField<S::Real>> {
        check_frame(frame, self.dims)?;

        let index_table = self.history.index_table();
        let stats = dog_flow(
            frame,
            self.history.buffer(),
            &index_table,
            &self.kernels,
            self.dims,
            &self.params,
            &mut self.output,
        );
        self.history.push(frame);

        Ok(snapshot(&self.output, stats, self.config.latency()))
    }

    /// Forgets all buffered frames.
    pub fn reset(&mut self) {
        self.history.reset();
    }

    pub fn config(&self) -> &DogConfig {
        &self.config
    }

    pub fn kernels(&self) -> &DogKernels<S::Real> {
        &self.kernels
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    /// Buffered frames, not counting the next one passed to `estimate`.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn moments(&self) -> &Moments<S::Real> {
        &self.output.moments
    }
}
