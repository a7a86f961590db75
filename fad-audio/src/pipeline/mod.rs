//! The shared pipeline core and the contexts that drive it.
//!
//! ## Architecture
//!
//! ```text
//!            ┌──────────────────────── Pipeline<N> (static, all atomics) ───────────────────────┐
//!            │  InputRing   OutputRing   input/output cursors   settings   ChunkSignal   stats  │
//!            └──────▲─────────────▲──────────────────▲──────────────────────────────┬──────────┘
//!                   │ write       │ read             │ publish                      │ take
//!   sample ISR ─► CaptureHandler ─┘──────────────────┘                              ▼
//!                                                                           DeferredWorker
//!                                                                      (algorithm, stream sink)
//! ```
//!
//! | Context | Type | Touches |
//! |---------|------|---------|
//! | sample interrupt | [`CaptureHandler`] | input ring, cursors, DAC, chunk signal |
//! | worker task | [`DeferredWorker`] | chunk windows, algorithm state, stream sink |
//! | event task | [`Session`] / [`Transport`] | clock run state, settings, algorithm swap |
//!
//! Settings change only while the clock is stopped, so the handler can read
//! them with relaxed loads and never sees a half-applied reconfiguration.

mod handler;
mod session;
mod worker;


pub use handler::{CaptureHandler, Wake};
pub use session::{Running, Session, Stopped, Transport};
pub use worker::{DeferredWorker, Park, STREAM_BLOCK};

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, AtomicUsize, Ordering};

use crate::algorithm::Requirements;
use crate::buffer::{Chunk, InputRing, OutputRing, OutputWindow};
use crate::constants::{DEFAULT_MULTISAMPLES, OUTPUT_IDLE_LEVEL};
use crate::error::Error;
use crate::io::signal::MAX_POSITION;
use crate::io::{ChunkSignal, OutputMode, Snapshot};

/// Running counters shared by every context.
///
/// All counters wrap on overflow.
pub struct PipelineStats {
    ticks: AtomicU32,
    chunks_signalled: AtomicU32,
    overruns: AtomicU32,
    chunks_processed: AtomicU32,
    window_violations: AtomicU32,
    stream_drops: AtomicU32,
}

/// Point-in-time copy of [`PipelineStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Sample interrupts serviced.
    pub ticks: u32,
    /// Chunk snapshots published.
    pub chunks_signalled: u32,
    /// Snapshots replaced before the worker took them.
    pub overruns: u32,
    /// Chunks an algorithm processed without error.
    pub chunks_processed: u32,
    /// Chunks whose algorithm reported a contract violation.
    pub window_violations: u32,
    /// Output bytes the stream sink did not accept.
    pub stream_drops: u32,
}

impl PipelineStats {
    pub const fn new() -> Self {
        PipelineStats {
            ticks: AtomicU32::new(0),
            chunks_signalled: AtomicU32::new(0),
            overruns: AtomicU32::new(0),
            chunks_processed: AtomicU32::new(0),
            window_violations: AtomicU32::new(0),
            stream_drops: AtomicU32::new(0),
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            chunks_signalled: self.chunks_signalled.load(Ordering::Relaxed),
            overruns: self.overruns.load(Ordering::Relaxed),
            chunks_processed: self.chunks_processed.load(Ordering::Relaxed),
            window_violations: self.window_violations.load(Ordering::Relaxed),
            stream_drops: self.stream_drops.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.ticks,
            &self.chunks_signalled,
            &self.overruns,
            &self.chunks_processed,
            &self.window_violations,
            &self.stream_drops,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    #[inline(always)]
    fn bump(counter: &AtomicU32, by: u32) {
        counter.fetch_add(by, Ordering::Relaxed);
    }
}

impl Default for PipelineStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the handler, the worker and the control path share.
///
/// `N` is the input ring capacity: a power of two no larger than
/// [`MAX_POSITION`].
///
/// ```ignore
/// static PIPELINE: Pipeline<INPUT_BUFFER_SAMPLES> = Pipeline::new();
/// ```
pub struct Pipeline<const N: usize> {
    input: InputRing<N>,
    output: OutputRing<N>,
    /// Next input index the handler writes.
    input_cursor: AtomicUsize,
    /// Next output index the handler plays.
    output_cursor: AtomicUsize,
    chunk_size: AtomicUsize,
    multisamples: AtomicUsize,
    output_mode: AtomicU8,
    running: AtomicBool,
    signal: ChunkSignal,
    stats: PipelineStats,
}

impl<const N: usize> Pipeline<N> {
    pub const fn new() -> Self {
        const { assert!(N <= MAX_POSITION, "ring positions must fit the packed snapshot") };
        Pipeline {
            input: InputRing::new(),
            output: OutputRing::new(),
            input_cursor: AtomicUsize::new(0),
            output_cursor: AtomicUsize::new(0),
            chunk_size: AtomicUsize::new(if N >= 4 { N / 4 } else { 1 }),
            multisamples: AtomicUsize::new(DEFAULT_MULTISAMPLES),
            output_mode: AtomicU8::new(OutputMode::Wireless as u8),
            running: AtomicBool::new(false),
            signal: ChunkSignal::new(),
            stats: PipelineStats::new(),
        }
    }

    /// Input ring capacity (`N`).
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Raw input samples, written only by the capture handler.
    pub fn input(&self) -> &InputRing<N> {
        &self.input
    }

    /// Output samples, written by the algorithm and played by the handler.
    pub fn output(&self) -> &OutputRing<N> {
        &self.output
    }

    /// Latest completed chunk, if the worker has not taken it yet.
    pub fn signal(&self) -> &ChunkSignal {
        &self.signal
    }

    /// Live counters.
    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Input samples per chunk (`C`).
    pub fn read_size(&self) -> usize {
        self.chunk_size.load(Ordering::Relaxed)
    }

    /// Input samples per output sample (`M`).
    pub fn multisamples(&self) -> usize {
        self.multisamples.load(Ordering::Relaxed)
    }

    /// Active `{C, M}` geometry.
    pub fn requirements(&self) -> Requirements {
        Requirements::new(self.read_size(), self.multisamples())
    }

    /// Logical length of the output ring (`N / M`).
    pub fn output_len(&self) -> usize {
        N / self.multisamples().max(1)
    }

    /// Where finished output goes.
    pub fn output_mode(&self) -> OutputMode {
        OutputMode::from_bits(self.output_mode.load(Ordering::Relaxed))
    }

    /// Whether the sample clock is ticking.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Release);
    }

    /// Current `(input, output)` cursor positions.
    pub fn cursors(&self) -> (usize, usize) {
        (
            self.input_cursor.load(Ordering::Relaxed),
            self.output_cursor.load(Ordering::Relaxed),
        )
    }

    fn ensure_stopped(&self) -> Result<(), Error> {
        if self.is_running() {
            log::warn!("reconfiguration refused: sample clock running");
            return Err(Error::ClockRunning);
        }
        Ok(())
    }

    /// Set the chunk size, keeping the multisample ratio.
    pub fn set_read_size(&self, chunk: usize) -> Result<(), Error> {
        self.apply(Requirements::new(chunk, self.multisamples()))
    }

    /// Set the multisample ratio, keeping the chunk size.
    pub fn set_multisamples(&self, multisamples: usize) -> Result<(), Error> {
        self.apply(Requirements::new(self.read_size(), multisamples))
    }

    /// Route output to the DAC or the stream sink. Cursors are kept.
    pub fn set_output_mode(&self, mode: OutputMode) -> Result<(), Error> {
        self.ensure_stopped()?;
        self.output_mode.store(mode as u8, Ordering::Relaxed);
        log::info!("output mode: {:?}", mode);
        Ok(())
    }

    /// Apply both chunk size and multisample ratio at once.
    ///
    /// On success the pipeline is [`reset`](Self::reset): cursors from the
    /// old geometry could sit past the new output length.
    pub fn apply(&self, requirements: Requirements) -> Result<(), Error> {
        self.ensure_stopped()?;
        requirements.validate(N).inspect_err(|e| {
            log::warn!("rejected buffer geometry: {}", e);
        })?;
        self.chunk_size
            .store(requirements.chunk_size, Ordering::Relaxed);
        self.multisamples
            .store(requirements.multisamples, Ordering::Relaxed);
        log::info!(
            "buffer geometry: chunk {} multisamples {} (output ring {})",
            requirements.chunk_size,
            requirements.multisamples,
            self.output_len()
        );
        self.reset();
        Ok(())
    }

    /// Rewind both cursors, silence the output ring and drop any pending
    /// snapshot. Only meaningful while stopped.
    pub fn reset(&self) {
        self.input_cursor.store(0, Ordering::Relaxed);
        self.output_cursor.store(0, Ordering::Relaxed);
        self.output.fill(OUTPUT_IDLE_LEVEL);
        self.signal.clear();
    }

    /// Output window `snapshot` asks the algorithm to fill.
    pub fn output_window(&self, snapshot: Snapshot) -> OutputWindow<'_> {
        let req = self.requirements();
        self.output
            .window(snapshot.output_pos, req.output_len(), self.output_len())
    }

    /// Input and output windows for the chunk described by `snapshot`.
    pub fn chunk(&self, snapshot: Snapshot) -> Chunk<'_> {
        let req = self.requirements();
        Chunk::new(
            self.input.window(snapshot.input_pos, req.chunk_size),
            self.output_window(snapshot),
            req.multisamples,
            snapshot,
        )
    }
}

impl<const N: usize> Default for Pipeline<N> {
    fn default() -> Self {
        Self::new()
    }
}
