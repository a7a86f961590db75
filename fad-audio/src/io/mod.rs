//! Hardware seams and the hand-off primitives between execution contexts.
//!
//! ## Components
//!
//! | Item | Producer | Consumer | Description |
//! |------|----------|----------|-------------|
//! | [`SampleSource`] | converter | handler | one blocking-poll read per tick |
//! | [`SampleSink`] | handler | DAC | fire-and-forget output write |
//! | [`ChunkSignal`] | handler (ISR) | worker | single-slot, overwrite-latest |
//! | [`EventQueue`] | buttons, console, radio | event task | SPSC of [`Event`]s behind a critical section |
//! | [`StreamSink`] | worker | wireless stack | block hand-off, never blocks |
//!
//! ## Timing
//!
//! ```text
//! tick ──► handler ──(every C ticks)──► ChunkSignal ──► worker ──► algorithm
//!             │                                           │
//!             └──(every M ticks, DAC mode)──► SampleSink  └──(wireless)──► StreamSink
//! ```

pub mod dispatch;
pub mod hardware;
pub mod signal;
pub mod spsc;
pub mod stream;

pub use dispatch::{Dispatch, Event, EventQueue};
pub use hardware::{OutputMode, SampleSink, SampleSource};
pub use signal::{ChunkSignal, Snapshot};
pub use stream::StreamSink;
