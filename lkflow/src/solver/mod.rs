//! Per-pixel structure tensor solve with minimum-eigenvalue gating.
//!
//! For tensor `M = [[xx, xy], [xy, yy]]` and `b = -[xt, yt]`:
//!
//! - both eigenvalues above the threshold: full solve `v = M⁻¹ b`;
//! - only the larger one above it and normal flow enabled: the velocity
//!   component along the dominant gradient direction;
//! - otherwise zero.
//!
//! Pixels with non-finite moments fail every comparison and end up at zero.


use common::parallel::ParZipMut;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::gradient::Moments;
use crate::sample::Real;

/// Symmetric 2×2 structure tensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructureTensor<T> {
    pub xx: T,
    pub xy: T,
    pub yy: T,
}

/// Outcome of the solve at one pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Estimate<T> {
    /// Full 2D velocity.
    Full { vx: T, vy: T },
    /// Velocity along the dominant gradient only.
    Normal { vx: T, vy: T },
    Rejected,
}

impl<T: Real> Estimate<T> {
    /// `(vx, vy)`, zero when rejected.
    #[inline]
    pub fn velocity(&self) -> (T, T) {
        match *self {
            Estimate::Full { vx, vy } | Estimate::Normal { vx, vy } => (vx, vy),
            Estimate::Rejected => (T::zero(), T::zero()),
        }
    }
}

/// Gating parameters shared by both estimators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowParams<T> {
    /// Minimum eigenvalue for a confident estimate. Must be `>= 0`.
    pub eig_threshold: T,
    /// Fall back to normal flow where only one eigenvalue passes.
    pub include_normal_flow: bool,
}

impl<T: Real> FlowParams<T> {
    pub fn new(eig_threshold: T, include_normal_flow: bool) -> Self {
        Self {
            eig_threshold,
            include_normal_flow,
        }
    }
}

/// Per-call solve diagnostics. These never signal failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveStats {
    pub full: usize,
    pub normal: usize,
    pub rejected: usize,
}

impl SolveStats {
    #[inline]
    pub fn total(&self) -> usize {
        self.full + self.normal + self.rejected
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            full: self.full + other.full,
            normal: self.normal + other.normal,
            rejected: self.rejected + other.rejected,
        }
    }

    fn record<T>(&mut self, estimate: &Estimate<T>) {
        match estimate {
            Estimate::Full { .. } => self.full += 1,
            Estimate::Normal { .. } => self.normal += 1,
            Estimate::Rejected => self.rejected += 1,
        }
    }
}

impl<T: Real> StructureTensor<T> {
    pub fn new(xx: T, xy: T, yy: T) -> Self {
        Self { xx, xy, yy }
    }

    #[inline]
    pub fn trace(&self) -> T {
        self.xx + self.yy
    }

    #[inline]
    pub fn determinant(&self) -> T {
        self.xx * self.yy - self.xy * self.xy
    }

    /// `(λ_max, λ_min)`, computed as `mean ± sqrt(((xx - yy) / 2)² + xy²)`.
    #[inline]
    pub fn eigenvalues(&self) -> (T, T) {
        let two = T::one() + T::one();
        let mean = self.trace() / two;
        let half_diff = (self.xx - self.yy) / two;
        let radius = (half_diff * half_diff + self.xy * self.xy).sqrt();
        (mean + radius, mean - radius)
    }

    /// Unit eigenvector of `lambda_max`, or `None` for an isotropic tensor.
    ///
    /// The column of `M - λ·I` with the larger diagonal term is used, which
    /// keeps axis-aligned cases exact: a pure x gradient gives `(1, 0)`.
    pub fn dominant_eigenvector(&self, lambda_max: T) -> Option<(T, T)> {
        let (ex, ey) = if self.xx >= self.yy {
            (lambda_max - self.yy, self.xy)
        } else {
            (self.xy, lambda_max - self.xx)
        };
        let norm = (ex * ex + ey * ey).sqrt();
        if norm > T::zero() && norm.is_finite() {
            Some((ex / norm, ey / norm))
        } else {
            None
        }
    }

    /// Solves for the velocity given the temporal terms `xt`, `yt`.
    pub fn solve(&self, xt: T, yt: T, params: &FlowParams<T>) -> Estimate<T> {
        let threshold = params.eig_threshold;
        let (lambda_max, lambda_min) = self.eigenvalues();
        let det = self.determinant();

        if lambda_min >= threshold && det >= threshold * threshold && det > T::zero() {
            let vx = -(self.yy * xt - self.xy * yt) / det;
            let vy = -(self.xx * yt - self.xy * xt) / det;
            return Estimate::Full { vx, vy };
        }

        if params.include_normal_flow && lambda_max >= threshold && lambda_max > T::zero() {
            if let Some((ex, ey)) = self.dominant_eigenvector(lambda_max) {
                let scale = -(ex * xt + ey * yt) / lambda_max;
                return Estimate::Normal {
                    vx: scale * ex,
                    vy: scale * ey,
                };
            }
        }

        Estimate::Rejected
    }
}

/// Solves every pixel of `moments` into `vel_c` (x) and `vel_r` (y).
///
/// # Panics
/// If the velocity planes disagree with the moment dimensions.
pub fn solve_field<T: Real>(
    moments: &Moments<T>,
    params: &FlowParams<T>,
    vel_c: &mut [T],
    vel_r: &mut [T],
) -> SolveStats {
    let dims = moments.dims();
    assert_eq!(vel_c.len(), dims.len(), "vel_c length must equal rows * cols");
    assert_eq!(vel_r.len(), dims.len(), "vel_r length must equal rows * cols");
    if dims.is_empty() {
        return SolveStats::default();
    }

    let cols = dims.cols;
    vel_c
        .par_zip(vel_r)
        .par_rows_mut_auto(cols)
        .map(|(chunk_start_row, (vx_chunk, vy_chunk))| {
            let base = chunk_start_row * cols;
            let mut stats = SolveStats::default();
            for (i, (vx, vy)) in vx_chunk.iter_mut().zip(vy_chunk.iter_mut()).enumerate() {
                let (tensor, xt, yt) = moments.at(base + i);
                let estimate = tensor.solve(xt, yt, params);
                stats.record(&estimate);
                (*vx, *vy) = estimate.velocity();
            }
            stats
        })
        .reduce(SolveStats::default, SolveStats::merge)
}
