use core::sync::atomic::{AtomicU16, AtomicU8, Ordering};

use crate::constants::OUTPUT_IDLE_LEVEL;

/// Ring of raw converter samples.
///
/// `N` must be a power of two so cursor wraparound is a mask.
pub struct InputRing<const N: usize> {
    cells: [AtomicU16; N],
}

impl<const N: usize> InputRing<N> {
    /// Create a ring filled with zeros.
    pub const fn new() -> Self {
        const { assert!(N >= 2 && N.is_power_of_two(), "ring capacity must be a power of two") };
        InputRing {
            cells: [const { AtomicU16::new(0) }; N],
        }
    }

    /// Number of cells.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Store `value` at `pos` (reduced modulo the capacity).
    #[inline]
    pub fn write(&self, pos: usize, value: u16) {
        self.cells[pos & (N - 1)].store(value, Ordering::Relaxed);
    }

    /// Load the sample at `pos` (reduced modulo the capacity).
    #[inline]
    pub fn read(&self, pos: usize) -> u16 {
        self.cells[pos & (N - 1)].load(Ordering::Relaxed)
    }

    /// View `len` samples starting at `start`, wrapping at the end of the ring.
    pub fn window(&self, start: usize, len: usize) -> super::InputWindow<'_> {
        super::InputWindow::new(&self.cells, start, len)
    }

    /// Overwrite every cell with `value`.
    pub fn fill(&self, value: u16) {
        for cell in &self.cells {
            cell.store(value, Ordering::Relaxed);
        }
    }
}

impl<const N: usize> Default for InputRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Ring of 8-bit output samples.
///
/// Storage is always `N` cells; the pipeline wraps its cursor at a shorter
/// logical length when several input samples condense into one output.
pub struct OutputRing<const N: usize> {
    cells: [AtomicU8; N],
}

impl<const N: usize> OutputRing<N> {
    /// Create a ring filled with the idle (silent) level.
    pub const fn new() -> Self {
        const { assert!(N >= 2 && N.is_power_of_two(), "ring capacity must be a power of two") };
        OutputRing {
            cells: [const { AtomicU8::new(OUTPUT_IDLE_LEVEL) }; N],
        }
    }

    /// Number of cells, independent of the logical length in use.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Store `value` at `pos` (reduced modulo the capacity).
    #[inline]
    pub fn write(&self, pos: usize, value: u8) {
        self.cells[pos & (N - 1)].store(value, Ordering::Relaxed);
    }

    /// Load the sample at `pos` (reduced modulo the capacity).
    #[inline]
    pub fn read(&self, pos: usize) -> u8 {
        self.cells[pos & (N - 1)].load(Ordering::Relaxed)
    }

    /// Writable view of `len` samples starting at `start`, wrapping at `wrap`.
    ///
    /// `wrap` is the logical length currently in use and never exceeds `N`.
    pub fn window(&self, start: usize, len: usize, wrap: usize) -> super::OutputWindow<'_> {
        super::OutputWindow::new(&self.cells[..wrap.min(N)], start, len)
    }

    /// Overwrite all `N` cells with `value`.
    pub fn fill(&self, value: u8) {
        for cell in &self.cells {
            cell.store(value, Ordering::Relaxed);
        }
    }
}

impl<const N: usize> Default for OutputRing<N> {
    fn default() -> Self {
        Self::new()
    }
}
