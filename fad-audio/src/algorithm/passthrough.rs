//! Input scaled straight to the output, with an optional on/off gate.
//!
//! With a gate period of `p` frames the output alternates between `p`
//! frames of silence (0) and `p` frames of input lifted by a small offset,
//! giving an easily recognisable test signal on a scope.

use crate::algorithm::{Algorithm, Requirements};
use crate::buffer::Chunk;
use crate::constants::DEFAULT_MULTISAMPLES;
use crate::dsp::helpers::{saturate_u8, to_output};
use crate::error::Error;

/// Level added to gated-on frames so they stand clear of the silent ones.
const GATE_LIFT: i32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassthroughParams {
    pub read_size: usize,
    pub multisamples: usize,
    /// Frames per gate half-cycle; `None` passes input through unchanged.
    pub gate_period: Option<usize>,
}

impl Default for PassthroughParams {
    fn default() -> Self {
        PassthroughParams {
            read_size: 512,
            multisamples: DEFAULT_MULTISAMPLES,
            gate_period: None,
        }
    }
}

pub struct Passthrough {
    gate_period: Option<usize>,
    frame_count: usize,
}

impl Passthrough {
    pub const fn new() -> Self {
        Passthrough {
            gate_period: None,
            frame_count: 0,
        }
    }
}

impl Default for Passthrough {
    fn default() -> Self {
        Self::new()
    }
}

impl Algorithm for Passthrough {
    type Params = PassthroughParams;

    fn requirements(params: &PassthroughParams) -> Requirements {
        Requirements::new(params.read_size, params.multisamples)
    }

    fn init(&mut self, params: &PassthroughParams) -> Result<(), Error> {
        if params.gate_period == Some(0) {
            return Err(Error::InvalidParameter {
                name: "gate_period",
            });
        }
        self.gate_period = params.gate_period;
        self.frame_count = 0;
        Ok(())
    }

    fn deinit(&mut self) {
        self.gate_period = None;
    }

    fn process(&mut self, chunk: &mut Chunk<'_>) -> Result<(), Error> {
        let (input, output) = chunk.split();
        for j in 0..input.frames() {
            let frame = input.frame(j).unwrap_or_default();
            let value = match self.gate_period {
                None => to_output(frame),
                Some(period) => {
                    let on = (self.frame_count / period) % 2 == 1;
                    self.frame_count = self.frame_count.wrapping_add(1);
                    if on {
                        saturate_u8(i32::from(to_output(frame)) + GATE_LIFT)
                    } else {
                        0
                    }
                }
            };
            output.set(j, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::test_support::Rig;

    #[test]
    fn ramp_is_scaled_to_eight_bits() {
        let rig: Rig<64> = Rig::new();
        rig.load(0, (0..16).map(|i| i * 16));
        let mut alg = Passthrough::new();
        alg.init(&PassthroughParams {
            read_size: 16,
            multisamples: 1,
            gate_period: None,
        })
        .unwrap();
        alg.process(&mut rig.chunk(0, 32, 16, 1)).unwrap();
        for i in 0..16 {
            assert_eq!(rig.out(32 + i), i as u8);
        }
    }

    #[test]
    fn multisamples_are_averaged() {
        let rig: Rig<64> = Rig::new();
        rig.load(0, [0, 32, 160, 160, 4095, 4095, 800, 0]);
        let mut alg = Passthrough::new();
        alg.init(&PassthroughParams {
            read_size: 8,
            multisamples: 2,
            gate_period: None,
        })
        .unwrap();
        alg.process(&mut rig.chunk(0, 0, 8, 2)).unwrap();
        assert_eq!(
            [rig.out(0), rig.out(1), rig.out(2), rig.out(3)],
            [1, 10, 255, 25]
        );
        // Only C / M output samples were touched.
        assert_eq!(rig.out(4), crate::constants::OUTPUT_IDLE_LEVEL);
    }

    #[test]
    fn gate_alternates_across_chunks() {
        let rig: Rig<64> = Rig::new();
        rig.load(0, core::iter::repeat(160).take(64));
        let mut alg = Passthrough::new();
        alg.init(&PassthroughParams {
            read_size: 4,
            multisamples: 1,
            gate_period: Some(2),
        })
        .unwrap();
        alg.process(&mut rig.chunk(0, 0, 4, 1)).unwrap();
        alg.process(&mut rig.chunk(4, 4, 4, 1)).unwrap();
        let got: [u8; 8] = core::array::from_fn(|i| rig.out(i));
        assert_eq!(got, [0, 0, 30, 30, 0, 0, 30, 30]);
    }

    #[test]
    fn zero_gate_rejected() {
        let mut alg = Passthrough::new();
        assert!(alg
            .init(&PassthroughParams {
                read_size: 4,
                multisamples: 1,
                gate_period: Some(0),
            })
            .is_err());
    }
}
