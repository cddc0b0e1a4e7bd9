//! Flow entry points writing into caller-owned buffers.
//!
//! [`lk_flow`] and [`dog_flow`] are generic over the input sample type; the
//! `_f64`, `_f32` and `_u8` variants fix it for callers that prefer a
//! concrete signature. Nothing is retained between calls.


use crate::frame_stack::FrameStack;
use crate::gradient::{dog_moments, two_frame_moments, DogKernels, Moments};
use crate::plane::{Dims, Plane};
use crate::sample::{Real, Sample};
use crate::solver::{solve_field, FlowParams, SolveStats};

/// Two-frame gating parameters.
pub type LkParams<T> = FlowParams<T>;

/// Multi-frame gating parameters.
pub type DogParams<T> = FlowParams<T>;

/// Velocity planes and the moment images they were solved from.
///
/// Every plane is overwritten on each call. `vel_c` also serves as the
/// scratch plane while the moments are filtered.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowOutput<T> {
    /// Column (x) velocity.
    pub vel_c: Plane<T>,
    /// Row (y) velocity.
    pub vel_r: Plane<T>,
    pub moments: Moments<T>,
}

impl<T: Real> FlowOutput<T> {
    pub fn new(dims: Dims) -> Self {
        Self {
            vel_c: Plane::new_default(dims),
            vel_r: Plane::new_default(dims),
            moments: Moments::new(dims),
        }
    }

    #[inline]
    pub fn dims(&self) -> Dims {
        self.vel_c.dims()
    }

    fn check(&self, dims: Dims, params: &FlowParams<T>) {
        assert_eq!(self.dims(), dims, "Output dimensions must match the frames");
        assert_eq!(self.vel_r.dims(), dims, "Output dimensions must match the frames");
        assert!(
            params.eig_threshold >= T::zero(),
            "Eigenvalue threshold must be non-negative, got {:?}",
            params.eig_threshold
        );
    }
}

/// Two-frame Lucas-Kanade flow from `frame_a` to `frame_b`.
///
/// # Panics
/// If a buffer disagrees with `dims` or the threshold is negative.
pub fn lk_flow<S: Sample>(
    frame_a: &[S],
    frame_b: &[S],
    dims: Dims,
    params: &LkParams<S::Real>,
    out: &mut FlowOutput<S::Real>,
) -> SolveStats {
    out.check(dims, params);
    let FlowOutput {
        vel_c,
        vel_r,
        moments,
    } = out;

    two_frame_moments(frame_a, frame_b, dims, moments, vel_c);
    let stats = solve_field(moments, params, vel_c, vel_r);

    tracing::debug!(
        "LK flow {}: full={}, normal={}, rejected={}",
        dims,
        stats.full,
        stats.normal,
        stats.rejected
    );
    stats
}

pub fn lk_flow_f64(
    frame_a: &[f64],
    frame_b: &[f64],
    dims: Dims,
    params: &LkParams<f64>,
    out: &mut FlowOutput<f64>,
) -> SolveStats {
    lk_flow(frame_a, frame_b, dims, params, out)
}

pub fn lk_flow_f32(
    frame_a: &[f32],
    frame_b: &[f32],
    dims: Dims,
    params: &LkParams<f32>,
    out: &mut FlowOutput<f32>,
) -> SolveStats {
    lk_flow(frame_a, frame_b, dims, params, out)
}

pub fn lk_flow_u8(
    frame_a: &[u8],
    frame_b: &[u8],
    dims: Dims,
    params: &LkParams<f32>,
    out: &mut FlowOutput<f32>,
) -> SolveStats {
    lk_flow(frame_a, frame_b, dims, params, out)
}

/// Multi-frame derivative-of-Gaussian flow.
///
/// `delay_line` packs previous frames back to back; `index_table[i]` is the
/// slot of the i-th oldest one. With an empty table only spatial gradients
/// are formed and the result is all zeros.
///
/// # Panics
/// If a buffer disagrees with `dims`, an index is out of range, a kernel is
/// empty or the threshold is negative.
pub fn dog_flow<S: Sample>(
    current: &[S],
    delay_line: &[S],
    index_table: &[usize],
    kernels: &DogKernels<S::Real>,
    dims: Dims,
    params: &DogParams<S::Real>,
    out: &mut FlowOutput<S::Real>,
) -> SolveStats {
    out.check(dims, params);
    let stack = FrameStack::resolve(current, delay_line, index_table, dims);
    let FlowOutput {
        vel_c,
        vel_r,
        moments,
    } = out;

    dog_moments(&stack, kernels, moments, vel_c);
    let stats = solve_field(moments, params, vel_c, vel_r);

    tracing::debug!(
        "DoG flow {} over {} frames: full={}, normal={}, rejected={}",
        dims,
        stack.len(),
        stats.full,
        stats.normal,
        stats.rejected
    );
    stats
}

pub fn dog_flow_f64(
    current: &[f64],
    delay_line: &[f64],
    index_table: &[usize],
    kernels: &DogKernels<f64>,
    dims: Dims,
    params: &DogParams<f64>,
    out: &mut FlowOutput<f64>,
) -> SolveStats {
    dog_flow(current, delay_line, index_table, kernels, dims, params, out)
}

pub fn dog_flow_f32(
    current: &[f32],
    delay_line: &[f32],
    index_table: &[usize],
    kernels: &DogKernels<f32>,
    dims: Dims,
    params: &DogParams<f32>,
    out: &mut FlowOutput<f32>,
) -> SolveStats {
    dog_flow(current, delay_line, index_table, kernels, dims, params, out)
}

pub fn dog_flow_u8(
    current: &[u8],
    delay_line: &[u8],
    index_table: &[usize],
    kernels: &DogKernels<f32>,
    dims: Dims,
    params: &DogParams<f32>,
    out: &mut FlowOutput<f32>,
) -> SolveStats {
    dog_flow(current, delay_line, index_table, kernels, dims, params, out)
}
