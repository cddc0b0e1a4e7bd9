//! Gradient assembly: the five windowed moment images of the structure tensor.
//!
//! Both estimators end in the same place. For gradients `Ix`, `Iy`, `It`
//! the moment planes hold the window-weighted products
//! `xx = Σw·Ix²`, `yy = Σw·Iy²`, `xy = Σw·Ix·Iy`, `xt = Σw·Ix·It`,
//! `yt = Σw·Iy·It`.
//!
//! The moment planes double as gradient storage while they are being
//! built, so the only extra memory is one caller-supplied scratch plane.

mod dog;


pub use dog::{dog_moments, DogKernels};

use rayon::prelude::*;

use crate::convolution::kernels::{binomial_window_5, central_difference_5};
use crate::convolution::{convolve_cols, convolve_rows};
use crate::plane::{Dims, Plane};
use crate::sample::{Real, Sample};
use crate::solver::StructureTensor;

/// The five moment images, all of the same shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Moments<T> {
    pub xx: Plane<T>,
    pub yy: Plane<T>,
    pub xy: Plane<T>,
    pub xt: Plane<T>,
    pub yt: Plane<T>,
}

impl<T: Real> Moments<T> {
    pub fn new(dims: Dims) -> Self {
        Self {
            xx: Plane::new_default(dims),
            yy: Plane::new_default(dims),
            xy: Plane::new_default(dims),
            xt: Plane::new_default(dims),
            yt: Plane::new_default(dims),
        }
    }

    #[inline]
    pub fn dims(&self) -> Dims {
        self.xx.dims()
    }

    /// Structure tensor and temporal terms `(xt, yt)` at flat index `idx`.
    #[inline]
    pub fn at(&self, idx: usize) -> (StructureTensor<T>, T, T) {
        (
            StructureTensor::new(self.xx[idx], self.xy[idx], self.yy[idx]),
            self.xt[idx],
            self.yt[idx],
        )
    }

    pub(crate) fn assert_dims(&self, dims: Dims) {
        for plane in [&self.xx, &self.yy, &self.xy, &self.xt, &self.yt] {
            assert_eq!(plane.dims(), dims, "Moment plane dimensions must match the frame");
        }
    }

    /// Replaces `(xx, yy, xy)` = `(Ix, Iy, It)` by the five raw products.
    fn gradients_to_products(&mut self) {
        let Moments { xx, yy, xy, xt, yt } = self;
        (
            xx.par_iter_mut(),
            yy.par_iter_mut(),
            xy.par_iter_mut(),
            xt.par_iter_mut(),
            yt.par_iter_mut(),
        )
            .into_par_iter()
            .for_each(|(xx, yy, xy, xt, yt)| {
                let (ix, iy, it) = (*xx, *yy, *xy);
                *xx = ix * ix;
                *yy = iy * iy;
                *xy = ix * iy;
                *xt = ix * it;
                *yt = iy * it;
            });
    }

    /// Weights every product plane with `kernel` along both axes.
    fn apply_window(&mut self, kernel: &[T], scratch: &mut [T]) {
        let dims = self.dims();
        for plane in [
            &mut self.xx,
            &mut self.yy,
            &mut self.xy,
            &mut self.xt,
            &mut self.yt,
        ] {
            convolve_rows(plane.pixels(), scratch, dims, kernel);
            convolve_cols(scratch, plane.pixels_mut(), dims, kernel);
        }
    }
}

/// Moments from two consecutive frames.
///
/// `Ix`, `Iy` come from `frame_a` through the five-tap central difference,
/// `It = frame_b - frame_a`, and the products are weighted with the
/// `[1, 4, 6, 4, 1] / 16` binomial window.
///
/// # Panics
/// If any plane length disagrees with `dims`.
pub fn two_frame_moments<S, T>(
    frame_a: &[S],
    frame_b: &[S],
    dims: Dims,
    moments: &mut Moments<T>,
    scratch: &mut [T],
) where
    S: Sample<Real = T>,
    T: Real,
{
    assert_eq!(frame_a.len(), dims.len(), "Frame A length must equal rows * cols");
    assert_eq!(frame_b.len(), dims.len(), "Frame B length must equal rows * cols");
    assert_eq!(scratch.len(), dims.len(), "Scratch length must equal rows * cols");
    moments.assert_dims(dims);
    if dims.is_empty() {
        return;
    }

    let derivative = central_difference_5::<T>();
    convolve_rows(frame_a, &mut moments.xx, dims, &derivative);
    convolve_cols(frame_a, &mut moments.yy, dims, &derivative);
    moments
        .xy
        .par_iter_mut()
        .zip(frame_a.par_iter().zip(frame_b.par_iter()))
        .for_each(|(it, (&a, &b))| *it = b.promote() - a.promote());

    moments.gradients_to_products();
    moments.apply_window(&binomial_window_5::<T>(), scratch);
}
