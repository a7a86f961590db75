//! Single-slot chunk notification with an overwrite-latest policy.
//!
//! The capture handler publishes one [`Snapshot`] per completed chunk from
//! interrupt context; the deferred worker takes it. The slot holds at most
//! one snapshot: publishing while the previous one is still unconsumed
//! replaces it, so a late worker always sees the most recent chunk and the
//! backlog can never grow past one.
//!
//! # Memory ordering
//!
//! Both cursor positions are packed into one `AtomicU32`, so the pair is
//! always read as a whole. `publish` uses `AcqRel` on the swap, which
//! releases every ring write the handler made before it; `take` acquires
//! them.

use core::sync::atomic::{AtomicU32, Ordering};

/// Marker for an empty slot. Positions are below `1 << 15`, so a packed
/// snapshot never collides with it.
const EMPTY: u32 = u32::MAX;

/// Largest ring capacity whose positions fit the packed encoding.
pub const MAX_POSITION: usize = 1 << 15;

/// Stable cursor pair describing one completed chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// First input-ring index of the completed chunk.
    pub input_pos: usize,
    /// First output-ring index the algorithm must fill for this chunk.
    pub output_pos: usize,
}

impl Snapshot {
    pub const fn new(input_pos: usize, output_pos: usize) -> Self {
        Snapshot {
            input_pos,
            output_pos,
        }
    }

    #[inline]
    fn pack(self) -> u32 {
        debug_assert!(self.input_pos < MAX_POSITION && self.output_pos < MAX_POSITION);
        ((self.input_pos as u32) << 16) | (self.output_pos as u32 & 0xFFFF)
    }

    #[inline]
    fn unpack(bits: u32) -> Self {
        Snapshot {
            input_pos: (bits >> 16) as usize,
            output_pos: (bits & 0xFFFF) as usize,
        }
    }
}

/// Depth-1 mailbox between the sample interrupt and the deferred worker.
pub struct ChunkSignal {
    slot: AtomicU32,
}

impl ChunkSignal {
    pub const fn new() -> Self {
        ChunkSignal {
            slot: AtomicU32::new(EMPTY),
        }
    }

    /// Publish `snapshot`, replacing any unconsumed one.
    ///
    /// Returns `true` if an unconsumed snapshot was overwritten (an overrun).
    /// Wait-free; safe to call from interrupt context.
    #[inline]
    pub fn publish(&self, snapshot: Snapshot) -> bool {
        self.slot.swap(snapshot.pack(), Ordering::AcqRel) != EMPTY
    }

    /// Take the pending snapshot, leaving the slot empty.
    pub fn take(&self) -> Option<Snapshot> {
        match self.slot.swap(EMPTY, Ordering::AcqRel) {
            EMPTY => None,
            bits => Some(Snapshot::unpack(bits)),
        }
    }

    /// Whether a snapshot is waiting.
    pub fn is_pending(&self) -> bool {
        self.slot.load(Ordering::Acquire) != EMPTY
    }

    /// Drop any pending snapshot.
    pub fn clear(&self) {
        self.slot.store(EMPTY, Ordering::Release);
    }
}

impl Default for ChunkSignal {
    fn default() -> Self {
        Self::new()
    }
}
