//! Row-major image planes.

use std::fmt;
use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

/// Image dimensions. Planes are stored row-major: sample `(row, col)` lives
/// at `row * cols + col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dims {
    pub rows: usize,
    pub cols: usize,
}

impl Dims {
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Number of samples in one plane.
    #[inline]
    pub const fn len(&self) -> usize {
        self.rows * self.cols
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    #[inline]
    pub const fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }
}

impl fmt::Display for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// An owned row-major plane of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane<T> {
    data: Vec<T>,
    dims: Dims,
}

impl<T> Plane<T> {
    pub fn new(dims: Dims, data: Vec<T>) -> Self {
        assert_eq!(
            data.len(),
            dims.len(),
            "data length must equal rows * cols"
        );
        Self { data, dims }
    }

    #[inline]
    pub fn dims(&self) -> Dims {
        self.dims
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.dims.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.dims.cols
    }

    /// Sample at column `x`, row `y`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &T {
        debug_assert!(x < self.dims.cols && y < self.dims.rows);
        &self.data[self.dims.index(y, x)]
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        debug_assert!(x < self.dims.cols && y < self.dims.rows);
        let idx = self.dims.index(y, x);
        &mut self.data[idx]
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        let cols = self.dims.cols;
        &self.data[y * cols..(y + 1) * cols]
    }

    #[inline]
    pub fn pixels(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl<T: Default + Clone> Plane<T> {
    pub fn new_default(dims: Dims) -> Self {
        Self {
            data: vec![T::default(); dims.len()],
            dims,
        }
    }
}

impl<T: Clone> Plane<T> {
    pub fn new_filled(dims: Dims, value: T) -> Self {
        Self {
            data: vec![value; dims.len()],
            dims,
        }
    }
}

impl<T> Deref for Plane<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        &self.data
    }
}

impl<T> DerefMut for Plane<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}
