//! Chronological frame stacks for the multi-frame estimator.
//!
//! A stack is assembled from the current frame, a delay line holding
//! previous frames in contiguous slots and an index table naming the slot
//! of each buffered frame, oldest first. Only slices are produced; no pixel
//! data is copied.

mod delay_line;


pub use delay_line::DelayLine;

use crate::plane::Dims;
use crate::sample::Sample;

/// Borrowed frames ordered oldest to newest; the last one is the current frame.
#[derive(Debug, Clone)]
pub struct FrameStack<'a, S> {
    frames: Vec<&'a [S]>,
    dims: Dims,
}

impl<'a, S: Sample> FrameStack<'a, S> {
    /// Resolves `index_table` against `delay_line` and appends `current`.
    ///
    /// `index_table[i]` is the zero-based slot of the i-th oldest buffered
    /// frame. The delay line may hold more slots than the table references.
    ///
    /// # Panics
    /// If any buffer length disagrees with `dims` or an index points past
    /// the end of the delay line.
    pub fn resolve(
        current: &'a [S],
        delay_line: &'a [S],
        index_table: &[usize],
        dims: Dims,
    ) -> Self {
        let frame_len = dims.len();
        assert_eq!(
            current.len(),
            frame_len,
            "Current frame length must equal rows * cols"
        );

        let mut frames = Vec::with_capacity(index_table.len() + 1);
        if frame_len > 0 {
            assert_eq!(
                delay_line.len() % frame_len,
                0,
                "Delay line length must be a whole number of frames"
            );
            let num_slots = delay_line.len() / frame_len;
            for &slot in index_table {
                assert!(
                    slot < num_slots,
                    "Index table slot {} out of range for {} buffered frames",
                    slot,
                    num_slots
                );
                frames.push(&delay_line[slot * frame_len..(slot + 1) * frame_len]);
            }
        } else {
            frames.extend(index_table.iter().map(|_| &delay_line[..0]));
        }
        frames.push(current);

        Self { frames, dims }
    }

    /// A stack holding only the current frame.
    pub fn single(current: &'a [S], dims: Dims) -> Self {
        Self::resolve(current, &[], &[], dims)
    }

    /// Number of frames including the current one. Never zero.
    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[inline]
    pub fn dims(&self) -> Dims {
        self.dims
    }

    #[inline]
    pub fn frames(&self) -> &[&'a [S]] {
        &self.frames
    }

    #[inline]
    pub fn oldest(&self) -> &'a [S] {
        self.frames[0]
    }

    #[inline]
    pub fn current(&self) -> &'a [S] {
        self.frames[self.frames.len() - 1]
    }

    /// The newest `len` frames, oldest first.
    ///
    /// When fewer frames are available the window is padded at the old end
    /// by repeating the oldest frame.
    pub fn window(&self, len: usize) -> Vec<&'a [S]> {
        let available = self.frames.len() as isize;
        let start = available - len as isize;
        (0..len as isize)
            .map(|w| self.frames[(start + w).max(0) as usize])
            .collect()
    }
}

/// Offset of a `len`-tap kernel inside a window of `span` frames.
///
/// The shorter of the two temporal kernels sits in the middle of the
/// longer one; odd slack leans towards the newer end.
#[inline]
pub fn centred_offset(span: usize, len: usize) -> usize {
    debug_assert!(len <= span);
    let slack = span - len;
    slack - slack / 2
}
