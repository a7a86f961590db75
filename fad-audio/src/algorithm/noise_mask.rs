//! Noise whose loudness follows the input's dynamic range.
//!
//! The first `scan_window` input samples of each chunk are scanned for
//! their peak-to-peak spread; the whole output chunk is then filled with
//! noise centred on the idle level and scaled by that spread. A quiet room
//! gets a quiet hiss, a loud one gets a louder mask.

use crate::algorithm::{Algorithm, Requirements};
use crate::buffer::Chunk;
use crate::dsp::helpers::{around_idle, peak_to_peak};
use crate::dsp::noise::Xorshift32;
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseMaskParams {
    pub read_size: usize,
    pub multisamples: usize,
    /// Input samples scanned for the spread; at most `read_size`.
    pub scan_window: usize,
    pub seed: u32,
}

impl Default for NoiseMaskParams {
    fn default() -> Self {
        NoiseMaskParams {
            read_size: 512,
            multisamples: 2,
            scan_window: 64,
            seed: 0x1234_5678,
        }
    }
}

pub struct NoiseMask {
    rng: Xorshift32,
    scan_window: usize,
    spread: u8,
}

impl NoiseMask {
    pub const fn new() -> Self {
        NoiseMask {
            rng: Xorshift32::new(1),
            scan_window: 0,
            spread: 0,
        }
    }

    /// Spread (8-bit scale) measured on the last chunk.
    pub fn spread(&self) -> u8 {
        self.spread
    }
}

impl Default for NoiseMask {
    fn default() -> Self {
        Self::new()
    }
}

impl Algorithm for NoiseMask {
    type Params = NoiseMaskParams;

    fn requirements(params: &NoiseMaskParams) -> Requirements {
        Requirements::new(params.read_size, params.multisamples)
    }

    fn init(&mut self, params: &NoiseMaskParams) -> Result<(), Error> {
        if params.scan_window == 0 || params.scan_window > params.read_size {
            return Err(Error::InvalidParameter {
                name: "scan_window",
            });
        }
        self.rng = Xorshift32::new(params.seed);
        self.scan_window = params.scan_window;
        self.spread = 0;
        Ok(())
    }

    fn deinit(&mut self) {
        self.scan_window = 0;
    }

    fn process(&mut self, chunk: &mut Chunk<'_>) -> Result<(), Error> {
        let (input, output) = chunk.split();
        let spread = peak_to_peak(input.iter().take(self.scan_window)) >> 4;
        self.spread = spread.min(u8::MAX as u16) as u8;
        for j in 0..output.len() {
            let noise = i32::from(self.rng.next_i8());
            output.set(j, around_idle((noise * i32::from(self.spread)) >> 8))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::test_support::Rig;
    use crate::constants::OUTPUT_IDLE_LEVEL;

    fn params(scan_window: usize) -> NoiseMaskParams {
        NoiseMaskParams {
            read_size: 16,
            multisamples: 2,
            scan_window,
            seed: 99,
        }
    }

    #[test]
    fn silent_input_gives_idle_output() {
        let rig: Rig<64> = Rig::new();
        rig.load(0, [2048u16; 16]);
        let mut alg = NoiseMask::new();
        alg.init(&params(8)).unwrap();
        alg.process(&mut rig.chunk(0, 0, 16, 2)).unwrap();
        assert_eq!(alg.spread(), 0);
        for i in 0..8 {
            assert_eq!(rig.out(i), OUTPUT_IDLE_LEVEL);
        }
    }

    #[test]
    fn loud_input_widens_the_noise() {
        let rig: Rig<64> = Rig::new();
        rig.load(0, (0..16).map(|i| if i % 2 == 0 { 0 } else { 4095 }));
        let mut alg = NoiseMask::new();
        alg.init(&params(8)).unwrap();
        alg.process(&mut rig.chunk(0, 0, 16, 2)).unwrap();
        assert_eq!(alg.spread(), 255);
        let deviation = (0..8)
            .map(|i| (i32::from(rig.out(i)) - i32::from(OUTPUT_IDLE_LEVEL)).abs())
            .max()
            .unwrap();
        assert!(deviation > 10);
    }

    #[test]
    fn only_scan_window_counts() {
        let rig: Rig<64> = Rig::new();
        // Spread lives entirely past the scan window.
        rig.load(0, [2048u16; 8]);
        rig.load(8, [0u16, 4095, 0, 4095, 0, 4095, 0, 4095]);
        let mut alg = NoiseMask::new();
        alg.init(&params(8)).unwrap();
        alg.process(&mut rig.chunk(0, 0, 16, 2)).unwrap();
        assert_eq!(alg.spread(), 0);
    }

    #[test]
    fn scan_window_bounded_by_chunk() {
        let mut alg = NoiseMask::new();
        assert_eq!(
            alg.init(&params(17)),
            Err(Error::InvalidParameter {
                name: "scan_window"
            })
        );
        assert!(alg.init(&params(0)).is_err());
    }
}
