//! Square wave whose level follows the input loudness.
//!
//! Each chunk plays a square wave between 0 and a level taken from the
//! mean of the previous chunk's input, so the tone is always audible and
//! gets louder as the room does.

use crate::algorithm::{Algorithm, Requirements};
use crate::buffer::Chunk;
use crate::dsp::helpers::{mean, to_output};
use crate::error::Error;

/// Level used before any input has been seen: just under half scale.
const INITIAL_LEVEL: u8 = 0x3F;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestToneParams {
    pub read_size: usize,
    pub multisamples: usize,
    /// Output frames per half cycle of the square wave.
    pub half_period: usize,
}

impl Default for TestToneParams {
    fn default() -> Self {
        TestToneParams {
            read_size: 512,
            multisamples: 2,
            half_period: 1,
        }
    }
}

pub struct TestTone {
    half_period: usize,
    level: u8,
    phase: usize,
}

impl TestTone {
    pub const fn new() -> Self {
        TestTone {
            half_period: 1,
            level: INITIAL_LEVEL,
            phase: 0,
        }
    }

    /// Level the next chunk will play at.
    pub fn level(&self) -> u8 {
        self.level
    }
}

impl Default for TestTone {
    fn default() -> Self {
        Self::new()
    }
}

impl Algorithm for TestTone {
    type Params = TestToneParams;

    fn requirements(params: &TestToneParams) -> Requirements {
        Requirements::new(params.read_size, params.multisamples)
    }

    fn init(&mut self, params: &TestToneParams) -> Result<(), Error> {
        if params.half_period == 0 {
            return Err(Error::InvalidParameter {
                name: "half_period",
            });
        }
        self.half_period = params.half_period;
        self.level = INITIAL_LEVEL;
        self.phase = 0;
        Ok(())
    }

    fn deinit(&mut self) {}

    fn process(&mut self, chunk: &mut Chunk<'_>) -> Result<(), Error> {
        let (input, output) = chunk.split();
        let level = self.level;
        for j in 0..output.len() {
            let high = (self.phase / self.half_period) % 2 == 1;
            output.set(j, if high { level } else { 0 })?;
            self.phase = (self.phase + 1) % (2 * self.half_period);
        }
        if let Some(avg) = mean(input.iter()) {
            self.level = to_output(avg);
        }
        Ok(())
    }
}
