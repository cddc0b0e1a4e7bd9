use crate::frame_stack::FrameStack;
use crate::plane::Dims;
use crate::sample::Sample;

/// Fixed-capacity ring of previous frames packed into one buffer.
///
/// Slots are reused in order; once full, `push` overwrites the oldest frame.
/// [`DelayLine::index_table`] describes the current order for
/// [`FrameStack::resolve`].
#[derive(Debug, Clone)]
pub struct DelayLine<S> {
    buffer: Vec<S>,
    dims: Dims,
    capacity: usize,
    next_slot: usize,
    len: usize,
}

impl<S: Sample> DelayLine<S> {
    pub fn new(dims: Dims, capacity: usize) -> Self {
        Self {
            buffer: vec![S::default(); dims.len() * capacity],
            dims,
            capacity,
            next_slot: 0,
            len: 0,
        }
    }

    pub fn push(&mut self, frame: &[S]) {
        let frame_len = self.dims.len();
        assert_eq!(
            frame.len(),
            frame_len,
            "Frame length must equal rows * cols"
        );
        if self.capacity == 0 {
            return;
        }

        let slot = self.next_slot;
        self.buffer[slot * frame_len..(slot + 1) * frame_len].copy_from_slice(frame);
        self.next_slot = (slot + 1) % self.capacity;
        self.len = (self.len + 1).min(self.capacity);
    }

    /// Slots of the buffered frames, oldest first.
    pub fn index_table(&self) -> Vec<usize> {
        if self.capacity == 0 {
            return Vec::new();
        }
        let oldest = (self.next_slot + self.capacity - self.len) % self.capacity;
        (0..self.len)
            .map(|i| (oldest + i) % self.capacity)
            .collect()
    }

    /// Buffered frames followed by `current`, oldest first.
    pub fn stack<'a>(&'a self, current: &'a [S]) -> FrameStack<'a, S> {
        FrameStack::resolve(current, &self.buffer, &self.index_table(), self.dims)
    }

    /// Raw slot storage, `capacity` frames back to back.
    #[inline]
    pub fn buffer(&self) -> &[S] {
        &self.buffer
    }

    #[inline]
    pub fn dims(&self) -> Dims {
        self.dims
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    /// Forgets all buffered frames. Storage is kept.
    pub fn reset(&mut self) {
        self.next_slot = 0;
        self.len = 0;
    }
}
