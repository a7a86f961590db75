//! # fad-audio
//!
//! A `no_std`, zero-allocation real-time sample pipeline for an embedded
//! auditory masking device. An analog input is sampled at a fixed rate,
//! a pluggable algorithm processes it in fixed-size chunks, and the result
//! goes to a DAC or, in whole blocks, to a wireless link. Continuously,
//! without dropped or torn samples.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Constants | [`constants`] | Buffer capacity, sample rate, timer clocks |
//! | Errors | [`error`] | Crate-wide [`Error`] |
//! | Config | [`config`] | `{kind, mode}` selection and preset parameters |
//! | Memory | [`buffer`] | Input/output sample rings and chunk windows |
//! | Clock | [`clock`] | Sample timer seam, [`SampleClock`](clock::SampleClock) |
//! | I/O | [`io`] | Hardware traits, chunk signal, event queue, stream sink |
//! | Pipeline | [`pipeline`] | Shared core, capture handler, deferred worker, sessions |
//! | Algorithms | [`algorithm`] | [`Algorithm`](algorithm::Algorithm) trait and built-ins |
//! | DSP | [`dsp`] | Sample conversion, FFT, noise |
//!
//! ## Quick start
//!
//! ```ignore
//! use fad_audio::algorithm::AnyAlgorithm;
//! use fad_audio::config::{AlgorithmKind, AlgorithmMode, Selection};
//! use fad_audio::constants::{INPUT_BUFFER_SAMPLES, SAMPLE_RATE_HZ};
//! use fad_audio::pipeline::{DeferredWorker, Pipeline, Session};
//!
//! static PIPELINE: Pipeline<INPUT_BUFFER_SAMPLES> = Pipeline::new();
//!
//! let mut worker = DeferredWorker::new(&PIPELINE, radio);
//! let mut session = Session::new(&PIPELINE, timer, adc, dac, semaphore);
//! session.init_clock(SAMPLE_RATE_HZ)?;
//!
//! let params = Selection::new(AlgorithmKind::DelayLine, AlgorithmMode::Mode2).params();
//! session.install(&mut worker, AnyAlgorithm::for_params(&params), &params)?;
//! let mut running = session.start().map_err(|(_, e)| e)?;
//!
//! // Timer ISR:            running.on_alarm();
//! // Worker task:          worker.run(&mut park, || true);
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `polled` | yes | [`PolledTimer`](clock::PolledTimer) over an `embedded-hal` delay |
//!
//! ## Audio parameters
//!
//! - **Input ring:** 2048 samples ([`constants::INPUT_BUFFER_SAMPLES`])
//! - **Sample rate:** 11 025 Hz ([`constants::SAMPLE_RATE_HZ`])
//! - **Input format:** `u16`, 12-bit unsigned
//! - **Output format:** `u8`, idle at 0x80

#![no_std]

pub mod constants;
pub mod error;
pub mod config;
pub mod buffer;
pub mod clock;
pub mod io;
pub mod pipeline;
pub mod algorithm;
pub mod dsp;

pub use error::Error;
