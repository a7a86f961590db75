//! Fixed delay: every output sample is the input from `D` frames earlier.
//!
//! The line starts filled with the idle level, so the first `D` output
//! samples after installation are silence.

use crate::algorithm::{Algorithm, Requirements};
use crate::buffer::Chunk;
use crate::constants::{DEFAULT_MULTISAMPLES, OUTPUT_IDLE_LEVEL};
use crate::dsp::helpers::to_output;
use crate::error::Error;

/// Longest delay the line can hold, in output samples (~0.74 s at 11 kHz).
pub const MAX_DELAY: usize = 8192;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayLineParams {
    pub read_size: usize,
    pub multisamples: usize,
    /// Delay in output samples, `1..=MAX_DELAY`.
    pub delay: usize,
}

impl Default for DelayLineParams {
    fn default() -> Self {
        DelayLineParams {
            read_size: 512,
            multisamples: DEFAULT_MULTISAMPLES,
            delay: 5512,
        }
    }
}

pub struct DelayLine {
    line: [u8; MAX_DELAY],
    delay: usize,
    pos: usize,
}

impl DelayLine {
    pub const fn new() -> Self {
        DelayLine {
            line: [OUTPUT_IDLE_LEVEL; MAX_DELAY],
            delay: 0,
            pos: 0,
        }
    }

    pub fn delay(&self) -> usize {
        self.delay
    }
}

impl Default for DelayLine {
    fn default() -> Self {
        Self::new()
    }
}

impl Algorithm for DelayLine {
    type Params = DelayLineParams;

    fn requirements(params: &DelayLineParams) -> Requirements {
        Requirements::new(params.read_size, params.multisamples)
    }

    fn init(&mut self, params: &DelayLineParams) -> Result<(), Error> {
        if params.delay == 0 {
            return Err(Error::InvalidParameter { name: "delay" });
        }
        if params.delay > MAX_DELAY {
            return Err(Error::ResourceExhausted {
                requested: params.delay,
                available: MAX_DELAY,
            });
        }
        self.delay = params.delay;
        self.line[..self.delay].fill(OUTPUT_IDLE_LEVEL);
        self.pos = 0;
        Ok(())
    }

    fn deinit(&mut self) {
        self.delay = 0;
        self.pos = 0;
    }

    fn process(&mut self, chunk: &mut Chunk<'_>) -> Result<(), Error> {
        if self.delay == 0 {
            return Err(Error::InvalidParameter { name: "delay" });
        }
        let (input, output) = chunk.split();
        for j in 0..input.frames() {
            output.set(j, self.line[self.pos])?;
            self.line[self.pos] = to_output(input.frame(j).unwrap_or_default());
            self.pos = (self.pos + 1) % self.delay;
        }
        Ok(())
    }
}
