//! Separable convolution along the horizontal, vertical and time axes.
//!
//! All passes work in correlation orientation: coefficient `k` of a kernel
//! of length `len` multiplies the sample at offset `k - len / 2`. Samples
//! outside the plane replicate the nearest edge sample.
//!
//! Each output value is a fixed sequential sum over the kernel taps, so
//! results do not depend on how rows are split across threads. Mirrored taps
//! `k` and `len - 1 - k` are added together before accumulating; an
//! antisymmetric kernel therefore gives exactly zero on constant input.

pub mod kernels;


use common::parallel::{par_fill_indexed, ParRowsMutAuto};
use rayon::prelude::*;

use crate::plane::Dims;
use crate::sample::{Real, Sample};

/// Offset of coefficient 0 relative to the output sample.
#[inline]
pub fn kernel_origin(len: usize) -> usize {
    len / 2
}

#[inline]
fn clamp_index(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}

/// `Σ kernel[k] · sample(k)` with mirrored taps paired.
#[inline]
fn paired_sum<T: Real>(kernel: &[T], sample: impl Fn(usize) -> T) -> T {
    let len = kernel.len();
    let mut sum = T::zero();
    for k in 0..len / 2 {
        let j = len - 1 - k;
        sum = sum + (kernel[k] * sample(k) + kernel[j] * sample(j));
    }
    if len % 2 == 1 {
        let mid = len / 2;
        sum = sum + kernel[mid] * sample(mid);
    }
    sum
}

#[inline]
fn row_of<S>(plane: &[S], cols: usize, y: usize) -> &[S] {
    &plane[y * cols..(y + 1) * cols]
}

fn check_plane_args<S, T>(input: &[S], output: &[T], dims: Dims, kernel: &[T]) {
    assert_eq!(input.len(), dims.len(), "Input length must equal rows * cols");
    assert_eq!(
        output.len(),
        dims.len(),
        "Output length must equal rows * cols"
    );
    assert!(!kernel.is_empty(), "Kernel must not be empty");
}

/// Filter along each row (horizontal pass).
pub fn convolve_rows<S, T>(input: &[S], output: &mut [T], dims: Dims, kernel: &[T])
where
    S: Sample<Real = T>,
    T: Real,
{
    check_plane_args(input, output, dims, kernel);
    if dims.is_empty() {
        return;
    }

    let cols = dims.cols;
    output
        .par_rows_mut_auto(cols)
        .for_each(|(chunk_start_row, chunk)| {
            for (local_y, out_row) in chunk.chunks_exact_mut(cols).enumerate() {
                let y = chunk_start_row + local_y;
                convolve_row(row_of(input, cols, y), out_row, kernel);
            }
        });
}

#[inline]
fn convolve_row<S, T>(input: &[S], output: &mut [T], kernel: &[T])
where
    S: Sample<Real = T>,
    T: Real,
{
    let width = input.len();
    let origin = kernel_origin(kernel.len()) as isize;

    for (x, out) in output.iter_mut().enumerate() {
        *out = paired_sum(kernel, |k| {
            input[clamp_index(x as isize + k as isize - origin, width)].promote()
        });
    }
}

/// Filter along each column (vertical pass).
pub fn convolve_cols<S, T>(input: &[S], output: &mut [T], dims: Dims, kernel: &[T])
where
    S: Sample<Real = T>,
    T: Real,
{
    check_plane_args(input, output, dims, kernel);
    if dims.is_empty() {
        return;
    }

    let Dims { rows, cols } = dims;
    let len = kernel.len();
    let origin = kernel_origin(len) as isize;
    let source_row = |y: usize, k: usize| {
        let sy = clamp_index(y as isize + k as isize - origin, rows);
        row_of(input, cols, sy)
    };

    // Same pairing as `paired_sum`, accumulated a row at a time.
    output
        .par_rows_mut_auto(cols)
        .for_each(|(chunk_start_row, chunk)| {
            for (local_y, out_row) in chunk.chunks_exact_mut(cols).enumerate() {
                let y = chunk_start_row + local_y;
                out_row.fill(T::zero());
                for k in 0..len / 2 {
                    let j = len - 1 - k;
                    let (ck, cj) = (kernel[k], kernel[j]);
                    let rows_kj = source_row(y, k).iter().zip(source_row(y, j));
                    for (out, (&a, &b)) in out_row.iter_mut().zip(rows_kj) {
                        *out = *out + (ck * a.promote() + cj * b.promote());
                    }
                }
                if len % 2 == 1 {
                    let mid = len / 2;
                    let cm = kernel[mid];
                    for (out, &v) in out_row.iter_mut().zip(source_row(y, mid)) {
                        *out = *out + cm * v.promote();
                    }
                }
            }
        });
}

/// Separable 2D filter: rows with `kernel_x` into `scratch`, then columns
/// with `kernel_y` into `output`.
pub fn convolve_separable<S, T>(
    input: &[S],
    output: &mut [T],
    scratch: &mut [T],
    dims: Dims,
    kernel_x: &[T],
    kernel_y: &[T],
) where
    S: Sample<Real = T>,
    T: Real,
{
    convolve_rows(input, scratch, dims, kernel_x);
    convolve_cols(scratch, output, dims, kernel_y);
}

/// Direct 2D correlation with a dense `kernel_dims` kernel.
///
/// O(n×k²); used for small kernels and to cross-check the separable passes.
pub fn convolve_2d<S, T>(input: &[S], output: &mut [T], dims: Dims, kernel: &[T], kernel_dims: Dims)
where
    S: Sample<Real = T>,
    T: Real,
{
    assert_eq!(input.len(), dims.len(), "Input length must equal rows * cols");
    assert_eq!(
        output.len(),
        dims.len(),
        "Output length must equal rows * cols"
    );
    assert_eq!(
        kernel.len(),
        kernel_dims.len(),
        "Kernel length must equal kernel rows * cols"
    );
    assert!(!kernel_dims.is_empty(), "Kernel must not be empty");
    if dims.is_empty() {
        return;
    }

    let Dims { rows, cols } = dims;
    let origin_y = kernel_origin(kernel_dims.rows) as isize;
    let origin_x = kernel_origin(kernel_dims.cols) as isize;

    output
        .par_rows_mut_auto(cols)
        .for_each(|(chunk_start_row, chunk)| {
            for (local_y, out_row) in chunk.chunks_exact_mut(cols).enumerate() {
                let y = chunk_start_row + local_y;
                for (x, out) in out_row.iter_mut().enumerate() {
                    let mut sum = T::zero();
                    for ky in 0..kernel_dims.rows {
                        let sy = clamp_index(y as isize + ky as isize - origin_y, rows);
                        for kx in 0..kernel_dims.cols {
                            let sx = clamp_index(x as isize + kx as isize - origin_x, cols);
                            sum = sum
                                + kernel[kernel_dims.index(ky, kx)]
                                    * input[sy * cols + sx].promote();
                        }
                    }
                    *out = sum;
                }
            }
        });
}

/// Filter along time: `output[i] = Σ kernel[k] · frames[k][i]`.
///
/// `frames` is the chronological window the kernel covers, one frame per
/// tap; window selection (and replication of missing frames) is the
/// caller's job.
pub fn convolve_time<S, T>(frames: &[&[S]], output: &mut [T], kernel: &[T])
where
    S: Sample<Real = T>,
    T: Real,
{
    assert!(!kernel.is_empty(), "Kernel must not be empty");
    assert_eq!(
        frames.len(),
        kernel.len(),
        "Temporal window must hold one frame per kernel tap"
    );
    for frame in frames {
        assert_eq!(
            frame.len(),
            output.len(),
            "Frame length must equal output length"
        );
    }

    par_fill_indexed(output, |i| paired_sum(kernel, |k| frames[k][i].promote()));
}

/// Outer product `kernel_y ⊗ kernel_x` as a dense kernel, row-major.
pub fn outer_product<T: Real>(kernel_x: &[T], kernel_y: &[T]) -> (Vec<T>, Dims) {
    let kernel: Vec<T> = kernel_y
        .iter()
        .flat_map(|&ky| kernel_x.iter().map(move |&kx| ky * kx))
        .collect();
    (kernel, Dims::new(kernel_y.len(), kernel_x.len()))
}
