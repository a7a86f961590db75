//! The algorithm plugin contract and the built-in algorithms.
//!
//! An algorithm turns one [`Chunk`] of input into one chunk of output. It
//! runs in the deferred worker, never in interrupt context, and may take
//! up to one chunk period per call.
//!
//! ## Lifecycle
//!
//! ```text
//! requirements(params) ──► init(params) ──► process(chunk) × n ──► deinit()
//!        │                      │
//!        └─ validated by the    └─ may reject parameters its
//!           pipeline first         fixed storage cannot hold
//! ```
//!
//! Installation is driven by
//! [`DeferredWorker::install`](crate::pipeline::DeferredWorker::install),
//! which only runs while the sample clock is stopped.
//!
//! ## Built-in algorithms
//!
//! | Kind | Output |
//! |------|--------|
//! | [`Passthrough`] | input scaled to 8 bits, optionally gated on and off |
//! | [`TestTone`] | square wave at the previous chunk's mean input level |
//! | [`NoiseMask`] | noise scaled by the input's peak-to-peak spread |
//! | [`DelayLine`] | input delayed by a fixed number of output samples |
//! | [`SpectralMask`] | sawtooth at the input's dominant frequency |
//! | [`ZeroCrossingSynth`] | sawtooth or triangle at the zero-crossing rate |
//! | [`FrequencyShift`] | input ring-modulated by a fixed carrier |

mod delay_line;
mod freq_shift;
mod noise_mask;
mod passthrough;
mod spectral_mask;
mod test_tone;
mod zero_crossing;

pub use delay_line::{DelayLine, DelayLineParams, MAX_DELAY};
pub use freq_shift::{FrequencyShift, FrequencyShiftParams};
pub use noise_mask::{NoiseMask, NoiseMaskParams};
pub use passthrough::{Passthrough, PassthroughParams};
pub use spectral_mask::{SpectralMask, SpectralMaskParams, MAX_WINDOW};
pub use test_tone::{TestTone, TestToneParams};
pub use zero_crossing::{Waveform, ZeroCrossingSynth, ZeroCrossingSynthParams, MAX_ROLLING};

use crate::buffer::Chunk;
use crate::config::AlgorithmKind;
use crate::error::Error;

/// Buffer geometry an algorithm needs from the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirements {
    /// Input samples per chunk (`C`).
    pub chunk_size: usize,
    /// Input samples averaged into one output sample (`M`).
    pub multisamples: usize,
}

impl Requirements {
    pub const fn new(chunk_size: usize, multisamples: usize) -> Self {
        Requirements {
            chunk_size,
            multisamples,
        }
    }

    /// Output samples produced per chunk.
    pub const fn output_len(&self) -> usize {
        self.chunk_size / self.multisamples
    }

    /// Check the geometry against an input ring of `capacity` samples.
    ///
    /// The chunk must divide the ring and fit in half of it (double
    /// buffering), and the multisample ratio must divide the chunk.
    pub fn validate(&self, capacity: usize) -> Result<(), Error> {
        let chunk = self.chunk_size;
        if chunk == 0 || chunk > capacity / 2 || capacity % chunk != 0 {
            return Err(Error::InvalidChunkSize { chunk, capacity });
        }
        if self.multisamples == 0 || chunk % self.multisamples != 0 {
            return Err(Error::InvalidMultisamples {
                multisamples: self.multisamples,
                chunk,
            });
        }
        Ok(())
    }
}

/// A chunk-at-a-time audio algorithm.
pub trait Algorithm {
    /// Parameter bundle consumed by [`init`](Self::init).
    type Params;

    /// Buffer geometry for `params`. Must not depend on algorithm state.
    fn requirements(params: &Self::Params) -> Requirements;

    /// Prepare internal state. Called once, before the first
    /// [`process`](Self::process), with the clock stopped.
    fn init(&mut self, params: &Self::Params) -> Result<(), Error>;

    /// Release internal state. Called once, before a replacement's `init`.
    fn deinit(&mut self);

    /// Fill `chunk.output()` from `chunk.input()`.
    ///
    /// An `Err` is a contract violation: the worker counts it and moves on.
    fn process(&mut self, chunk: &mut Chunk<'_>) -> Result<(), Error>;
}

/// Parameters for any built-in algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Params {
    Passthrough(PassthroughParams),
    TestTone(TestToneParams),
    NoiseMask(NoiseMaskParams),
    DelayLine(DelayLineParams),
    SpectralMask(SpectralMaskParams),
    ZeroCrossingSynth(ZeroCrossingSynthParams),
    FrequencyShift(FrequencyShiftParams),
}

impl Params {
    pub fn kind(&self) -> AlgorithmKind {
        match self {
            Params::Passthrough(_) => AlgorithmKind::Passthrough,
            Params::TestTone(_) => AlgorithmKind::TestTone,
            Params::NoiseMask(_) => AlgorithmKind::NoiseMask,
            Params::DelayLine(_) => AlgorithmKind::DelayLine,
            Params::SpectralMask(_) => AlgorithmKind::SpectralMask,
            Params::ZeroCrossingSynth(_) => AlgorithmKind::ZeroCrossingSynth,
            Params::FrequencyShift(_) => AlgorithmKind::FrequencyShift,
        }
    }
}

/// The closed set of built-in algorithms, dispatched by `match`.
pub enum AnyAlgorithm {
    Passthrough(Passthrough),
    TestTone(TestTone),
    NoiseMask(NoiseMask),
    DelayLine(DelayLine),
    SpectralMask(SpectralMask),
    ZeroCrossingSynth(ZeroCrossingSynth),
    FrequencyShift(FrequencyShift),
}

impl AnyAlgorithm {
    /// Fresh, uninitialized algorithm matching `params`.
    pub fn for_params(params: &Params) -> Self {
        match params {
            Params::Passthrough(_) => AnyAlgorithm::Passthrough(Passthrough::new()),
            Params::TestTone(_) => AnyAlgorithm::TestTone(TestTone::new()),
            Params::NoiseMask(_) => AnyAlgorithm::NoiseMask(NoiseMask::new()),
            Params::DelayLine(_) => AnyAlgorithm::DelayLine(DelayLine::new()),
            Params::SpectralMask(_) => AnyAlgorithm::SpectralMask(SpectralMask::new()),
            Params::ZeroCrossingSynth(_) => {
                AnyAlgorithm::ZeroCrossingSynth(ZeroCrossingSynth::new())
            }
            Params::FrequencyShift(_) => AnyAlgorithm::FrequencyShift(FrequencyShift::new()),
        }
    }

    pub fn kind(&self) -> AlgorithmKind {
        match self {
            AnyAlgorithm::Passthrough(_) => AlgorithmKind::Passthrough,
            AnyAlgorithm::TestTone(_) => AlgorithmKind::TestTone,
            AnyAlgorithm::NoiseMask(_) => AlgorithmKind::NoiseMask,
            AnyAlgorithm::DelayLine(_) => AlgorithmKind::DelayLine,
            AnyAlgorithm::SpectralMask(_) => AlgorithmKind::SpectralMask,
            AnyAlgorithm::ZeroCrossingSynth(_) => AlgorithmKind::ZeroCrossingSynth,
            AnyAlgorithm::FrequencyShift(_) => AlgorithmKind::FrequencyShift,
        }
    }
}

impl Algorithm for AnyAlgorithm {
    type Params = Params;

    fn requirements(params: &Params) -> Requirements {
        match params {
            Params::Passthrough(p) => Passthrough::requirements(p),
            Params::TestTone(p) => TestTone::requirements(p),
            Params::NoiseMask(p) => NoiseMask::requirements(p),
            Params::DelayLine(p) => DelayLine::requirements(p),
            Params::SpectralMask(p) => SpectralMask::requirements(p),
            Params::ZeroCrossingSynth(p) => ZeroCrossingSynth::requirements(p),
            Params::FrequencyShift(p) => FrequencyShift::requirements(p),
        }
    }

    fn init(&mut self, params: &Params) -> Result<(), Error> {
        match (self, params) {
            (AnyAlgorithm::Passthrough(a), Params::Passthrough(p)) => a.init(p),
            (AnyAlgorithm::TestTone(a), Params::TestTone(p)) => a.init(p),
            (AnyAlgorithm::NoiseMask(a), Params::NoiseMask(p)) => a.init(p),
            (AnyAlgorithm::DelayLine(a), Params::DelayLine(p)) => a.init(p),
            (AnyAlgorithm::SpectralMask(a), Params::SpectralMask(p)) => a.init(p),
            (AnyAlgorithm::ZeroCrossingSynth(a), Params::ZeroCrossingSynth(p)) => a.init(p),
            (AnyAlgorithm::FrequencyShift(a), Params::FrequencyShift(p)) => a.init(p),
            _ => Err(Error::InvalidParameter { name: "params" }),
        }
    }

    fn deinit(&mut self) {
        match self {
            AnyAlgorithm::Passthrough(a) => a.deinit(),
            AnyAlgorithm::TestTone(a) => a.deinit(),
            AnyAlgorithm::NoiseMask(a) => a.deinit(),
            AnyAlgorithm::DelayLine(a) => a.deinit(),
            AnyAlgorithm::SpectralMask(a) => a.deinit(),
            AnyAlgorithm::ZeroCrossingSynth(a) => a.deinit(),
            AnyAlgorithm::FrequencyShift(a) => a.deinit(),
        }
    }

    fn process(&mut self, chunk: &mut Chunk<'_>) -> Result<(), Error> {
        match self {
            AnyAlgorithm::Passthrough(a) => a.process(chunk),
            AnyAlgorithm::TestTone(a) => a.process(chunk),
            AnyAlgorithm::NoiseMask(a) => a.process(chunk),
            AnyAlgorithm::DelayLine(a) => a.process(chunk),
            AnyAlgorithm::SpectralMask(a) => a.process(chunk),
            AnyAlgorithm::ZeroCrossingSynth(a) => a.process(chunk),
            AnyAlgorithm::FrequencyShift(a) => a.process(chunk),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support;
