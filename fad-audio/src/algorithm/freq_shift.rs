//! Ring modulation by a fixed carrier.
//!
//! Multiplying the input by `cos(2π·f·t)` moves every input component
//! `f_in` to `f_in ± f`, which is the cheap way to shift speech away from
//! where the ear expects it.

use core::f32::consts::TAU;

use crate::algorithm::{Algorithm, Requirements};
use crate::buffer::Chunk;
use crate::constants::{DEFAULT_MULTISAMPLES, SAMPLE_RATE_HZ};
use crate::dsp::helpers::{around_idle, centered, INPUT_MIDPOINT};
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyShiftParams {
    pub read_size: usize,
    pub multisamples: usize,
    /// Carrier frequency in Hz; below half the frame rate.
    pub shift_hz: u32,
    /// Input sample rate in Hz.
    pub sample_rate: u32,
}

impl Default for FrequencyShiftParams {
    fn default() -> Self {
        FrequencyShiftParams {
            read_size: 512,
            multisamples: DEFAULT_MULTISAMPLES,
            shift_hz: 100,
            sample_rate: SAMPLE_RATE_HZ,
        }
    }
}

pub struct FrequencyShift {
    /// Carrier phase advance per frame, in radians.
    step: f32,
    phase: f32,
}

impl FrequencyShift {
    pub const fn new() -> Self {
        FrequencyShift {
            step: 0.0,
            phase: 0.0,
        }
    }
}

impl Default for FrequencyShift {
    fn default() -> Self {
        Self::new()
    }
}

impl Algorithm for FrequencyShift {
    type Params = FrequencyShiftParams;

    fn requirements(params: &FrequencyShiftParams) -> Requirements {
        Requirements::new(params.read_size, params.multisamples)
    }

    fn init(&mut self, params: &FrequencyShiftParams) -> Result<(), Error> {
        let frame_rate = params.sample_rate / params.multisamples.max(1) as u32;
        if params.shift_hz == 0 || params.shift_hz >= frame_rate / 2 {
            return Err(Error::InvalidParameter { name: "shift_hz" });
        }
        self.step = TAU * params.shift_hz as f32 / frame_rate as f32;
        self.phase = 0.0;
        Ok(())
    }

    fn deinit(&mut self) {
        self.step = 0.0;
    }

    fn process(&mut self, chunk: &mut Chunk<'_>) -> Result<(), Error> {
        let (input, output) = chunk.split();
        for j in 0..input.frames() {
            let level = centered(input.frame(j).unwrap_or(INPUT_MIDPOINT as u16)) >> 4;
            let carrier = libm::cosf(self.phase);
            output.set(j, around_idle(libm::roundf(level as f32 * carrier) as i32))?;
            self.phase += self.step;
            if self.phase >= TAU {
                self.phase -= TAU;
            }
        }
        Ok(())
    }
}
