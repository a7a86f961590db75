//! Chunk-sized views over the sample rings.
//!
//! An algorithm never sees a ring directly. It receives a [`Chunk`]: a
//! read-only [`InputWindow`] over the samples of the chunk that just
//! completed and an [`OutputWindow`] over the region it must fill. Both
//! index relative to the window start and wrap at the ring boundary.

use core::sync::atomic::{AtomicU16, AtomicU8, Ordering};

use crate::error::Error;
use crate::io::Snapshot;

/// Read-only view of one chunk of input samples.
#[derive(Clone, Copy)]
pub struct InputWindow<'a> {
    cells: &'a [AtomicU16],
    start: usize,
    len: usize,
    multisamples: usize,
}

impl<'a> InputWindow<'a> {
    pub(crate) fn new(cells: &'a [AtomicU16], start: usize, len: usize) -> Self {
        InputWindow {
            cells,
            start,
            len: len.min(cells.len()),
            multisamples: 1,
        }
    }

    pub(crate) fn with_multisamples(mut self, multisamples: usize) -> Self {
        self.multisamples = multisamples.max(1);
        self
    }

    /// Number of samples in the window.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Ring index of the first sample.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Sample `i` of the window, or `None` past its end.
    #[inline]
    pub fn get(&self, i: usize) -> Option<u16> {
        if i >= self.len {
            return None;
        }
        let pos = (self.start + i) % self.cells.len();
        Some(self.cells[pos].load(Ordering::Relaxed))
    }

    /// Iterate over the window in capture order.
    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        (0..self.len).filter_map(move |i| self.get(i))
    }

    /// Number of output frames the window condenses into.
    pub fn frames(&self) -> usize {
        self.len / self.multisamples
    }

    /// Average of the input samples that make up output frame `j`.
    ///
    /// Returns `None` when the frame lies outside the window.
    pub fn frame(&self, j: usize) -> Option<u16> {
        let first = j.checked_mul(self.multisamples)?;
        if first + self.multisamples > self.len {
            return None;
        }
        let sum: u32 = (first..first + self.multisamples)
            .filter_map(|i| self.get(i))
            .map(u32::from)
            .sum();
        Some((sum / self.multisamples as u32) as u16)
    }

    /// Iterate over the averaged output frames.
    pub fn iter_frames(&self) -> impl Iterator<Item = u16> + '_ {
        (0..self.frames()).filter_map(move |j| self.frame(j))
    }
}

/// Writable view of the output region one chunk must fill.
///
/// Writes are range-checked: an index at or past [`len`](Self::len) is
/// refused with [`Error::WindowOverrun`] instead of landing in a
/// neighbouring chunk.
pub struct OutputWindow<'a> {
    cells: &'a [AtomicU8],
    start: usize,
    len: usize,
}

impl<'a> OutputWindow<'a> {
    pub(crate) fn new(cells: &'a [AtomicU8], start: usize, len: usize) -> Self {
        OutputWindow {
            cells,
            start,
            len: len.min(cells.len()),
        }
    }

    /// Number of output samples the window covers.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Output ring index of window index 0.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Store `value` at window index `i`.
    #[inline]
    pub fn set(&mut self, i: usize, value: u8) -> Result<(), Error> {
        if i >= self.len {
            return Err(Error::WindowOverrun {
                index: i,
                len: self.len,
            });
        }
        let pos = (self.start + i) % self.cells.len();
        self.cells[pos].store(value, Ordering::Relaxed);
        Ok(())
    }

    /// Read back window index `i`.
    pub fn get(&self, i: usize) -> Option<u8> {
        if i >= self.len {
            return None;
        }
        Some(self.cells[(self.start + i) % self.cells.len()].load(Ordering::Relaxed))
    }

    /// Write `value` to every index of the window.
    pub fn fill(&mut self, value: u8) {
        for i in 0..self.len {
            let pos = (self.start + i) % self.cells.len();
            self.cells[pos].store(value, Ordering::Relaxed);
        }
    }

    /// Copy the window into `dst` starting at window index `offset`.
    ///
    /// Returns the number of samples copied.
    pub fn copy_to(&self, offset: usize, dst: &mut [u8]) -> usize {
        let mut copied = 0;
        for (slot, i) in dst.iter_mut().zip(offset..self.len) {
            *slot = self.cells[(self.start + i) % self.cells.len()].load(Ordering::Relaxed);
            copied += 1;
        }
        copied
    }
}

/// Everything one call to [`Algorithm::process`](crate::algorithm::Algorithm::process) may touch.
pub struct Chunk<'a> {
    input: InputWindow<'a>,
    output: OutputWindow<'a>,
    multisamples: usize,
    snapshot: Snapshot,
}

impl<'a> Chunk<'a> {
    /// Bundle the windows for one chunk.
    pub fn new(
        input: InputWindow<'a>,
        output: OutputWindow<'a>,
        multisamples: usize,
        snapshot: Snapshot,
    ) -> Self {
        Chunk {
            input: input.with_multisamples(multisamples),
            output,
            multisamples: multisamples.max(1),
            snapshot,
        }
    }

    /// The completed input samples, read-only.
    pub fn input(&self) -> &InputWindow<'a> {
        &self.input
    }

    /// The output samples the algorithm must fill.
    pub fn output(&mut self) -> &mut OutputWindow<'a> {
        &mut self.output
    }

    /// Borrow both windows at once.
    pub fn split(&mut self) -> (&InputWindow<'a>, &mut OutputWindow<'a>) {
        (&self.input, &mut self.output)
    }

    /// Input samples per output sample (`M`).
    pub fn multisamples(&self) -> usize {
        self.multisamples
    }

    /// The cursor pair this chunk was cut from.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot
    }
}
