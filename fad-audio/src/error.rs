//! Crate-wide error type.
//!
//! Configuration errors are returned synchronously and are never fatal on
//! their own; only start-up code decides to abort. Nothing on the sampling
//! path returns an error: overruns are counted in
//! [`PipelineStats`](crate::pipeline::PipelineStats) instead.

use thiserror::Error;

/// Errors reported by the pipeline, its clock and its algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// Reconfiguration attempted while the sample clock is running.
    #[error("sample clock is running; stop it before reconfiguring")]
    ClockRunning,

    /// The clock was started before [`init`](crate::clock::SampleClock::init).
    #[error("sample clock has not been initialized")]
    NotInitialized,

    /// The requested sample frequency cannot be derived from the timer source.
    #[error("sample frequency {frequency} Hz cannot be derived from the timer")]
    InvalidFrequency { frequency: u32 },

    /// Chunk size is zero, does not divide the buffer, or exceeds half of it.
    #[error("chunk size {chunk} is invalid for a {capacity}-sample buffer")]
    InvalidChunkSize { chunk: usize, capacity: usize },

    /// Multisample ratio is zero or does not divide the chunk size.
    #[error("multisample ratio {multisamples} does not divide chunk size {chunk}")]
    InvalidMultisamples { multisamples: usize, chunk: usize },

    /// An algorithm parameter is out of range.
    #[error("invalid algorithm parameter `{name}`")]
    InvalidParameter { name: &'static str },

    /// Fixed storage is too small for the requested size.
    #[error("requested {requested} samples, only {available} available")]
    ResourceExhausted { requested: usize, available: usize },

    /// An algorithm wrote outside the output window it was handed.
    #[error("write at index {index} outside a {len}-sample output window")]
    WindowOverrun { index: usize, len: usize },

    /// The event queue has no free slot.
    #[error("event queue is full")]
    QueueFull,

    /// The platform timer rejected an operation.
    #[error("timer fault: {0}")]
    Timer(&'static str),
}
