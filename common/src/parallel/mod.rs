//! Row-aligned parallel iteration over image planes.
//!
//! Every helper hands out disjoint mutable chunks together with the offset
//! of the chunk inside the full slice, so per-pixel work can be written as a
//! plain loop and still run on the rayon pool.

use rayon::prelude::*;


/// Multiplier for number of chunks relative to CPU threads.
/// Using 3x threads provides good load balancing when some chunks finish faster.
const CHUNKS_PER_THREAD: usize = 3;

/// Compute chunk size for the given length.
#[inline]
fn auto_chunk_size(len: usize) -> usize {
    let num_chunks = rayon::current_num_threads() * CHUNKS_PER_THREAD;
    (len / num_chunks).max(1)
}

// ============================================================================
// Generic parallel iterator wrapper with offset
// ============================================================================

/// Parallel iterator that prepends an offset to each item.
/// Used to wrap chunked iterators and provide `(offset, item)` pairs.
pub struct WithOffset<I, T, F> {
    inner: I,
    multiplier: usize,
    transform: F,
    _phantom: std::marker::PhantomData<T>,
}

impl<I, T, F> WithOffset<I, T, F> {
    fn new(inner: I, multiplier: usize, transform: F) -> Self {
        Self {
            inner,
            multiplier,
            transform,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<I, T, F> ParallelIterator for WithOffset<I, T, F>
where
    I: IndexedParallelIterator,
    T: Send,
    F: Fn(I::Item) -> T + Send + Sync,
{
    type Item = (usize, T);

    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: rayon::iter::plumbing::UnindexedConsumer<Self::Item>,
    {
        let multiplier = self.multiplier;
        let transform = self.transform;
        self.inner
            .enumerate()
            .map(move |(idx, item)| (idx * multiplier, transform(item)))
            .drive_unindexed(consumer)
    }
}

impl<I, T, F> IndexedParallelIterator for WithOffset<I, T, F>
where
    I: IndexedParallelIterator,
    T: Send,
    F: Fn(I::Item) -> T + Send + Sync,
{
    fn len(&self) -> usize {
        self.inner.len()
    }

    fn drive<C>(self, consumer: C) -> C::Result
    where
        C: rayon::iter::plumbing::Consumer<Self::Item>,
    {
        let multiplier = self.multiplier;
        let transform = self.transform;
        self.inner
            .enumerate()
            .map(move |(idx, item)| (idx * multiplier, transform(item)))
            .drive(consumer)
    }

    fn with_producer<CB>(self, callback: CB) -> CB::Output
    where
        CB: rayon::iter::plumbing::ProducerCallback<Self::Item>,
    {
        let multiplier = self.multiplier;
        let transform = self.transform;
        self.inner
            .enumerate()
            .map(move |(idx, item)| (idx * multiplier, transform(item)))
            .with_producer(callback)
    }
}

/// Parallel iterator over row-aligned mutable chunks yielding `(chunk_start_row, chunk)`.
pub type ParRowsMutWithOffset<'a, T> =
    WithOffset<rayon::slice::ChunksMut<'a, T>, &'a mut [T], fn(&'a mut [T]) -> &'a mut [T]>;

/// Parallel iterator over mutable chunks yielding `(offset, chunk)`.
pub type ParChunksMutWithOffset<'a, T> =
    WithOffset<rayon::slice::ChunksMut<'a, T>, &'a mut [T], fn(&'a mut [T]) -> &'a mut [T]>;

/// Parallel iterator over two zipped row-aligned mutable chunks.
pub type ParRows2MutWithOffset<'a, A, B> = WithOffset<
    rayon::iter::Zip<rayon::slice::ChunksMut<'a, A>, rayon::slice::ChunksMut<'a, B>>,
    (&'a mut [A], &'a mut [B]),
    fn((&'a mut [A], &'a mut [B])) -> (&'a mut [A], &'a mut [B]),
>;

fn identity<T>(x: T) -> T {
    x
}

// ============================================================================
// Extension traits
// ============================================================================

/// Row-aligned mutable parallel chunks with automatic sizing.
pub trait ParRowsMutAuto<'a, T: Send + 'a> {
    type Iter: IndexedParallelIterator;

    /// Split into mutable chunks of whole rows.
    /// Yields `(chunk_start_row, chunk)` pairs.
    fn par_rows_mut_auto(&'a mut self, width: usize) -> Self::Iter;
}

impl<'a, T: Send + 'a> ParRowsMutAuto<'a, T> for [T] {
    type Iter = ParRowsMutWithOffset<'a, T>;

    fn par_rows_mut_auto(&'a mut self, width: usize) -> ParRowsMutWithOffset<'a, T> {
        assert!(width > 0, "Row width must be positive");
        let height = self.len() / width;
        let chunk_rows = auto_chunk_size(height);
        WithOffset::new(
            self.par_chunks_mut(width * chunk_rows),
            chunk_rows,
            identity as fn(&'a mut [T]) -> &'a mut [T],
        )
    }
}

/// Chains two mutable slices for joint row iteration.
pub trait ParZipMut<'a, T: Send + 'a> {
    fn par_zip<U: Send + 'a>(self, other: &'a mut [U]) -> ZippedSlices2<'a, T, U>;
}

impl<'a, T: Send + 'a> ParZipMut<'a, T> for &'a mut [T] {
    fn par_zip<U: Send + 'a>(self, other: &'a mut [U]) -> ZippedSlices2<'a, T, U> {
        ZippedSlices2(self, other)
    }
}

/// Two zipped mutable slices ready for parallel row iteration.
pub struct ZippedSlices2<'a, A: Send, B: Send>(pub &'a mut [A], pub &'a mut [B]);

impl<'a, A: Send + 'a, B: Send + 'a> ZippedSlices2<'a, A, B> {
    /// Split into parallel row-aligned chunks.
    pub fn par_rows_mut_auto(self, width: usize) -> ParRows2MutWithOffset<'a, A, B> {
        assert!(width > 0, "Row width must be positive");
        assert_eq!(
            self.0.len(),
            self.1.len(),
            "Zipped slices must have equal length"
        );
        let height = self.0.len() / width;
        let chunk_rows = auto_chunk_size(height);
        let chunk_size = width * chunk_rows;
        WithOffset::new(
            self.0
                .par_chunks_mut(chunk_size)
                .zip(self.1.par_chunks_mut(chunk_size)),
            chunk_rows,
            identity as fn((&'a mut [A], &'a mut [B])) -> (&'a mut [A], &'a mut [B]),
        )
    }
}

/// Mutable parallel chunks with automatic sizing and element offsets.
pub trait ParChunksMutAutoWithOffset<'a, T: Send + 'a> {
    /// Yields `(start_offset, chunk)` pairs.
    fn par_chunks_mut_auto(&'a mut self) -> ParChunksMutWithOffset<'a, T>;
}

impl<'a, T: Send + 'a> ParChunksMutAutoWithOffset<'a, T> for [T] {
    fn par_chunks_mut_auto(&'a mut self) -> ParChunksMutWithOffset<'a, T> {
        let chunk_size = auto_chunk_size(self.len());
        WithOffset::new(
            self.par_chunks_mut(chunk_size),
            chunk_size,
            identity as fn(&'a mut [T]) -> &'a mut [T],
        )
    }
}

/// Fills `data[i] = f(i)` in parallel.
pub fn par_fill_indexed<T, F>(data: &mut [T], f: F)
where
    T: Send,
    F: Fn(usize) -> T + Sync,
{
    data.par_chunks_mut_auto().for_each(|(offset, chunk)| {
        for (i, value) in chunk.iter_mut().enumerate() {
            *value = f(offset + i);
        }
    });
}
