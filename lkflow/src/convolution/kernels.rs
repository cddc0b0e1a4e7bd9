//! 1D filter kernels in correlation form.
//!
//! Every derivative kernel here has a positive response to an increasing
//! ramp: correlating `f(i) = i` with it yields 1.

use crate::sample::Real;

/// Five-tap central difference `[1, -8, 0, 8, -1] / 12`.
pub const CENTRAL_DIFFERENCE_5: [f64; 5] = [
    1.0 / 12.0,
    -8.0 / 12.0,
    0.0,
    8.0 / 12.0,
    -1.0 / 12.0,
];

/// Binomial window `[1, 4, 6, 4, 1] / 16`.
pub const BINOMIAL_WINDOW_5: [f64; 5] = [
    1.0 / 16.0,
    4.0 / 16.0,
    6.0 / 16.0,
    4.0 / 16.0,
    1.0 / 16.0,
];

pub fn central_difference_5<T: Real>() -> [T; 5] {
    CENTRAL_DIFFERENCE_5.map(T::from_f64)
}

pub fn binomial_window_5<T: Real>() -> [T; 5] {
    BINOMIAL_WINDOW_5.map(T::from_f64)
}

/// Kernel radius that captures 99.7% of a Gaussian.
#[inline]
pub fn gaussian_radius(sigma: f64) -> usize {
    (3.0 * sigma).ceil() as usize
}

/// Compute a normalized 1D Gaussian kernel.
///
/// # Arguments
/// * `sigma` - Standard deviation in samples
///
/// # Returns
/// Kernel of length `2 * ceil(3 * sigma) + 1` summing to 1.
pub fn gaussian_kernel_1d<T: Real>(sigma: f64) -> Vec<T> {
    assert!(sigma > 0.0, "Sigma must be positive");
    gaussian_kernel_1d_with_len(sigma, 2 * gaussian_radius(sigma) + 1)
}

/// Normalized Gaussian sampled at `len` taps centred on `(len - 1) / 2`.
///
/// Used for temporal kernels whose length is fixed by the number of frames.
/// Even lengths sample at half-integer offsets.
pub fn gaussian_kernel_1d_with_len<T: Real>(sigma: f64, len: usize) -> Vec<T> {
    assert!(sigma > 0.0, "Sigma must be positive");
    assert!(len > 0, "Kernel length must be positive");

    let values = gaussian_samples(sigma, len);
    let sum: f64 = values.iter().map(|&(_, v)| v).sum();
    values.iter().map(|&(_, v)| T::from_f64(v / sum)).collect()
}

/// Derivative-of-Gaussian kernel, radius `ceil(3 * sigma)`.
pub fn gaussian_derivative_kernel_1d<T: Real>(sigma: f64) -> Vec<T> {
    assert!(sigma > 0.0, "Sigma must be positive");
    gaussian_derivative_kernel_1d_with_len(sigma, 2 * gaussian_radius(sigma) + 1)
}

/// Derivative-of-Gaussian kernel with `len` taps.
///
/// Antisymmetric around `(len - 1) / 2` and scaled so that a unit ramp
/// produces exactly 1. With `len == 2` this is the plain difference `[-1, 1]`.
pub fn gaussian_derivative_kernel_1d_with_len<T: Real>(sigma: f64, len: usize) -> Vec<T> {
    assert!(sigma > 0.0, "Sigma must be positive");
    assert!(len >= 2, "Derivative kernel needs at least 2 taps");

    let samples = gaussian_samples(sigma, len);
    let weighted: Vec<f64> = samples.iter().map(|&(x, g)| x * g).collect();
    // Normalize the first moment so a ramp of slope 1 maps to 1.
    let moment: f64 = samples
        .iter()
        .zip(&weighted)
        .map(|(&(x, _), &w)| x * w)
        .sum();
    weighted.iter().map(|&w| T::from_f64(w / moment)).collect()
}

/// `(offset, exp(-offset² / 2σ²))` pairs, offsets centred on `(len - 1) / 2`.
fn gaussian_samples(sigma: f64, len: usize) -> Vec<(f64, f64)> {
    let centre = (len - 1) as f64 / 2.0;
    let two_sigma_sq = 2.0 * sigma * sigma;
    (0..len)
        .map(|i| {
            let x = i as f64 - centre;
            (x, (-x * x / two_sigma_sq).exp())
        })
        .collect()
}
