//! Pixel sample types and their promotion to the arithmetic type.
//!
//! | sample | arithmetic |
//! |--------|------------|
//! | `u8`   | `f32`      |
//! | `f32`  | `f32`      |
//! | `f64`  | `f64`      |
//!
//! Promotion is a plain numeric conversion. `u8` samples are not rescaled,
//! so a `u8` frame and the same values stored as `f32` produce identical flow.
//! [`Sample::RANGE`] records the full-scale value of each type; configs use it
//! to express thresholds independently of the input type.

use std::fmt::Debug;
use std::iter::Sum;

use num_traits::Float;

mod sealed {
    pub trait Sealed {}

    impl Sealed for u8 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// An accepted input pixel type.
///
/// Sealed: only `u8`, `f32` and `f64` implement it.
pub trait Sample: sealed::Sealed + Copy + Default + Debug + Send + Sync + 'static {
    /// Arithmetic type used for every intermediate and output plane.
    type Real: Real;

    /// Full-scale intensity: 255 for `u8`, 1 for floating-point samples.
    const RANGE: f64;

    fn promote(self) -> Self::Real;
}

/// Floating-point arithmetic type (`f32` or `f64`).
///
/// A real type is also its own sample type, so intermediate planes can be
/// fed back through the same filters as input frames.
pub trait Real: Sample<Real = Self> + Float + Sum + PartialOrd {
    fn from_f64(v: f64) -> Self;

    fn as_f64(self) -> f64;
}

impl Sample for u8 {
    type Real = f32;
    const RANGE: f64 = 255.0;

    #[inline]
    fn promote(self) -> f32 {
        self as f32
    }
}

impl Sample for f32 {
    type Real = f32;
    const RANGE: f64 = 1.0;

    #[inline]
    fn promote(self) -> f32 {
        self
    }
}

impl Sample for f64 {
    type Real = f64;
    const RANGE: f64 = 1.0;

    #[inline]
    fn promote(self) -> f64 {
        self
    }
}

impl Real for f32 {
    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self as f64
    }
}

impl Real for f64 {
    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self
    }
}

/// Promotes `src` into `dst` element by element.
pub fn promote_into<S: Sample>(src: &[S], dst: &mut [S::Real]) {
    assert_eq!(src.len(), dst.len(), "Promotion buffers must have equal length");
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = s.promote();
    }
}
