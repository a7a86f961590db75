//! Shared fixture for driving one algorithm without the pipeline.

use crate::buffer::{Chunk, InputRing, OutputRing};
use crate::io::Snapshot;

pub(crate) struct Rig<const N: usize> {
    pub input: InputRing<N>,
    pub output: OutputRing<N>,
}

impl<const N: usize> Rig<N> {
    pub fn new() -> Self {
        Rig {
            input: InputRing::new(),
            output: OutputRing::new(),
        }
    }

    /// Write `samples` into the input ring starting at `start`.
    pub fn load(&self, start: usize, samples: impl IntoIterator<Item = u16>) {
        for (i, s) in samples.into_iter().enumerate() {
            self.input.write(start + i, s);
        }
    }

    /// Chunk reading `chunk` samples at `input_pos`, writing `chunk / m`
    /// samples at `output_pos`.
    pub fn chunk(&self, input_pos: usize, output_pos: usize, chunk: usize, m: usize) -> Chunk<'_> {
        Chunk::new(
            self.input.window(input_pos, chunk),
            self.output.window(output_pos, chunk / m, N / m),
            m,
            Snapshot::new(input_pos, output_pos),
        )
    }

    pub fn out(&self, pos: usize) -> u8 {
        self.output.read(pos)
    }
}
