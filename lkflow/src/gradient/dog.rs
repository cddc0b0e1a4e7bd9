//! Multi-frame moments with derivative-of-Gaussian filters.

use crate::convolution::kernels::{
    gaussian_derivative_kernel_1d, gaussian_derivative_kernel_1d_with_len, gaussian_kernel_1d,
    gaussian_kernel_1d_with_len,
};
use crate::convolution::{convolve_cols, convolve_rows, convolve_time};
use crate::error::{Error, Result};
use crate::frame_stack::{centred_offset, FrameStack};
use crate::gradient::Moments;
use crate::sample::{promote_into, Real, Sample};

/// The five 1D kernels of the multi-frame estimator.
#[derive(Debug, Clone, PartialEq)]
pub struct DogKernels<T> {
    /// Temporal derivative.
    pub t_grad: Vec<T>,
    /// Spatial derivative, applied along x for `Ix` and along y for `Iy`.
    pub s_grad: Vec<T>,
    /// Temporal smoothing.
    pub t_smooth: Vec<T>,
    /// Spatial smoothing across the derivative direction.
    pub s_smooth: Vec<T>,
    /// Weighting of the gradient products.
    pub window: Vec<T>,
}

impl<T: Real> DogKernels<T> {
    /// Builds the kernels from the image and gradient filter widths.
    ///
    /// Temporal kernels span `num_frames` taps. Smoothing and derivative
    /// kernels share `image_sigma`; `gradient_sigma` sets the product window.
    ///
    /// # Panics
    /// If a sigma is not positive or `num_frames < 2`.
    pub fn from_sigmas(num_frames: usize, image_sigma: f64, gradient_sigma: f64) -> Self {
        let kernels = Self {
            t_grad: gaussian_derivative_kernel_1d_with_len(image_sigma, num_frames),
            s_grad: gaussian_derivative_kernel_1d(image_sigma),
            t_smooth: gaussian_kernel_1d_with_len(image_sigma, num_frames),
            s_smooth: gaussian_kernel_1d(image_sigma),
            window: gaussian_kernel_1d(gradient_sigma),
        };
        tracing::trace!(
            "DoG kernels: t_grad={}, s_grad={}, t_smooth={}, s_smooth={}, window={}",
            kernels.t_grad.len(),
            kernels.s_grad.len(),
            kernels.t_smooth.len(),
            kernels.s_smooth.len(),
            kernels.window.len()
        );
        kernels
    }

    pub fn validate(&self) -> Result<()> {
        for (name, kernel) in self.named() {
            if kernel.is_empty() {
                return Err(Error::EmptyKernel(name));
            }
        }
        Ok(())
    }

    /// Frames covered by the longer temporal kernel.
    #[inline]
    pub fn temporal_span(&self) -> usize {
        self.t_smooth.len().max(self.t_grad.len())
    }

    fn named(&self) -> [(&'static str, &[T]); 5] {
        [
            ("t_grad", self.t_grad.as_slice()),
            ("s_grad", self.s_grad.as_slice()),
            ("t_smooth", self.t_smooth.as_slice()),
            ("s_smooth", self.s_smooth.as_slice()),
            ("window", self.window.as_slice()),
        ]
    }
}

/// Moments from a frame stack with derivative-of-Gaussian filtering.
///
/// The temporal kernels run over the newest [`DogKernels::temporal_span`]
/// frames, the shorter one centred inside the longer. Missing older frames
/// repeat the oldest one. A stack of one frame skips the temporal stage: the
/// spatial gradients come from the current frame and `It` is zero.
///
/// # Panics
/// If the scratch or moment planes disagree with the stack dimensions or a
/// kernel is empty.
pub fn dog_moments<S, T>(
    stack: &FrameStack<'_, S>,
    kernels: &DogKernels<T>,
    moments: &mut Moments<T>,
    scratch: &mut [T],
) where
    S: Sample<Real = T>,
    T: Real,
{
    let dims = stack.dims();
    assert_eq!(scratch.len(), dims.len(), "Scratch length must equal rows * cols");
    moments.assert_dims(dims);
    for (name, kernel) in kernels.named() {
        assert!(!kernel.is_empty(), "Kernel '{}' must not be empty", name);
    }
    if dims.is_empty() {
        return;
    }

    // Temporal stage: xx <- smoothed frame, xy <- temporal derivative.
    if stack.len() == 1 {
        tracing::debug!("Single-frame DoG call, temporal derivative is zero");
        promote_into(stack.current(), &mut moments.xx);
        moments.xy.fill(T::zero());
    } else {
        let span = kernels.temporal_span();
        let window = stack.window(span);

        let smooth_len = kernels.t_smooth.len();
        let smooth_frames = &window[centred_offset(span, smooth_len)..][..smooth_len];
        convolve_time(smooth_frames, &mut moments.xx, &kernels.t_smooth);

        let grad_len = kernels.t_grad.len();
        let grad_frames = &window[centred_offset(span, grad_len)..][..grad_len];
        convolve_time(grad_frames, &mut moments.xy, &kernels.t_grad);
    }
    moments.yy.copy_from_slice(&moments.xx);

    // Spatial stage: Ix in xx, Iy in yy, It in xy.
    convolve_rows(&moments.xx, scratch, dims, &kernels.s_grad);
    convolve_cols(scratch, &mut moments.xx, dims, &kernels.s_smooth);

    convolve_rows(&moments.yy, scratch, dims, &kernels.s_smooth);
    convolve_cols(scratch, &mut moments.yy, dims, &kernels.s_grad);

    convolve_rows(&moments.xy, scratch, dims, &kernels.s_smooth);
    convolve_cols(scratch, &mut moments.xy, dims, &kernels.s_smooth);

    moments.gradients_to_products();
    moments.apply_window(&kernels.window, scratch);
}
