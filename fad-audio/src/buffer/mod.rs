//! Fixed-capacity sample rings and the chunk windows handed to algorithms.
//!
//! | Type | Cells | Writer |
//! |------|-------|--------|
//! | [`InputRing`] | `AtomicU16`, 12-bit samples | capture handler |
//! | [`OutputRing`] | `AtomicU8`, 8-bit samples | algorithm (content), handler (cursor) |
//! | [`InputWindow`] / [`OutputWindow`] | views | read / range-checked write |
//!
//! Every cell is an atomic, so a reader that falls a lap behind sees stale
//! samples, never torn values or memory outside the allocation. Indexing
//! is always reduced modulo the capacity.

mod ring;
mod window;

pub use ring::{InputRing, OutputRing};
pub use window::{Chunk, InputWindow, OutputWindow};
