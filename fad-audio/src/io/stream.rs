//! Block hand-off to the wireless link.
//!
//! In wireless mode the worker pushes each freshly processed output window
//! to a [`StreamSink`]. The sink takes what it can and reports how much; the
//! worker never retries or waits, and counts the remainder as dropped.

/// Consumer of processed 8-bit output blocks.
pub trait StreamSink {
    /// Offer `block`; return how many leading bytes were accepted.
    fn push_block(&mut self, block: &[u8]) -> usize;
}

/// No link attached: blocks are accepted and discarded.
impl StreamSink for () {
    fn push_block(&mut self, block: &[u8]) -> usize {
        block.len()
    }
}

impl<S: StreamSink + ?Sized> StreamSink for &mut S {
    fn push_block(&mut self, block: &[u8]) -> usize {
        (**self).push_block(block)
    }
}
