//! Tone generator driven by the input's zero-crossing rate.
//!
//! A Schmitt trigger around the input midpoint detects crossings; the
//! number of frames between successive crossings is a half period. A
//! rolling average of the last few half periods sets the period of a
//! sawtooth or triangle wave on the output.

use crate::algorithm::{Algorithm, Requirements};
use crate::buffer::Chunk;
use crate::constants::{DEFAULT_MULTISAMPLES, OUTPUT_IDLE_LEVEL};
use crate::dsp::helpers::{centered, INPUT_MIDPOINT};
use crate::error::Error;

/// Deepest rolling average supported.
pub const MAX_ROLLING: usize = 16;

/// Output wave shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sawtooth,
    Triangle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZeroCrossingSynthParams {
    pub read_size: usize,
    pub multisamples: usize,
    /// Hysteresis half-width around the midpoint, in input counts.
    pub threshold: u16,
    /// Half periods averaged, `1..=MAX_ROLLING`.
    pub rolling: usize,
    pub waveform: Waveform,
}

impl Default for ZeroCrossingSynthParams {
    fn default() -> Self {
        ZeroCrossingSynthParams {
            read_size: 512,
            multisamples: DEFAULT_MULTISAMPLES,
            threshold: 64,
            rolling: 5,
            waveform: Waveform::Sawtooth,
        }
    }
}

pub struct ZeroCrossingSynth {
    threshold: i32,
    waveform: Waveform,
    rolling: usize,
    history: [u32; MAX_ROLLING],
    /// Entries of `history` filled so far, capped at `rolling`.
    filled: usize,
    next: usize,
    /// Which side of the trigger the input was last seen on.
    high: Option<bool>,
    since_crossing: u32,
    phase: u32,
}

impl ZeroCrossingSynth {
    pub const fn new() -> Self {
        ZeroCrossingSynth {
            threshold: 0,
            waveform: Waveform::Sawtooth,
            rolling: 0,
            history: [0; MAX_ROLLING],
            filled: 0,
            next: 0,
            high: None,
            since_crossing: 0,
            phase: 0,
        }
    }

    /// Averaged half period in frames, once at least one has been measured.
    pub fn half_period(&self) -> Option<u32> {
        if self.filled == 0 {
            return None;
        }
        let sum: u32 = self.history[..self.filled].iter().sum();
        Some((sum / self.filled as u32).max(1))
    }

    fn observe(&mut self, frame: u16) {
        let level = centered(frame);
        let side = if level > self.threshold {
            Some(true)
        } else if level < -self.threshold {
            Some(false)
        } else {
            None
        };
        self.since_crossing = self.since_crossing.saturating_add(1);
        if let Some(side) = side {
            match self.high {
                Some(prev) if prev != side => {
                    self.history[self.next] = self.since_crossing;
                    self.next = (self.next + 1) % self.rolling;
                    self.filled = (self.filled + 1).min(self.rolling);
                    self.since_crossing = 0;
                }
                None => self.since_crossing = 0,
                _ => {}
            }
            self.high = Some(side);
        }
    }

    fn render(&mut self, period: u32) -> u8 {
        let pos = self.phase % period;
        self.phase = (pos + 1) % period;
        match self.waveform {
            Waveform::Sawtooth => (pos * 255 / (period - 1).max(1)) as u8,
            Waveform::Triangle => {
                let half = (period / 2).max(1);
                let rising = pos.min(period - pos);
                (rising.min(half) * 255 / half) as u8
            }
        }
    }
}

impl Default for ZeroCrossingSynth {
    fn default() -> Self {
        Self::new()
    }
}

impl Algorithm for ZeroCrossingSynth {
    type Params = ZeroCrossingSynthParams;

    fn requirements(params: &ZeroCrossingSynthParams) -> Requirements {
        Requirements::new(params.read_size, params.multisamples)
    }

    fn init(&mut self, params: &ZeroCrossingSynthParams) -> Result<(), Error> {
        if params.rolling == 0 {
            return Err(Error::InvalidParameter { name: "rolling" });
        }
        if params.rolling > MAX_ROLLING {
            return Err(Error::ResourceExhausted {
                requested: params.rolling,
                available: MAX_ROLLING,
            });
        }
        if i32::from(params.threshold) >= INPUT_MIDPOINT {
            return Err(Error::InvalidParameter { name: "threshold" });
        }
        *self = ZeroCrossingSynth {
            threshold: i32::from(params.threshold),
            waveform: params.waveform,
            rolling: params.rolling,
            ..ZeroCrossingSynth::new()
        };
        Ok(())
    }

    fn deinit(&mut self) {
        self.filled = 0;
        self.high = None;
    }

    fn process(&mut self, chunk: &mut Chunk<'_>) -> Result<(), Error> {
        if self.rolling == 0 {
            return Err(Error::InvalidParameter { name: "rolling" });
        }
        let (input, output) = chunk.split();
        for j in 0..input.frames() {
            self.observe(input.frame(j).unwrap_or(INPUT_MIDPOINT as u16));
            let value = match self.half_period() {
                Some(half) => self.render(2 * half),
                None => OUTPUT_IDLE_LEVEL,
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

    fn params(waveform: Waveform) -> ZeroCrossingSynthParams {
        ZeroCrossingSynthParams {
            read_size: 64,
            multisamples: 1,
            threshold: 100,
            rolling: 3,
            waveform,
        }
    }

    /// Square wave alternating every `half` samples.
    fn square(half: usize, len: usize) -> impl Iterator<Item = u16> {
        (0..len).map(move |i| if (i / half) % 2 == 0 { 3000 } else { 1000 })
    }

    #[test]
    fn measures_half_period() {
        let rig: Rig<128> = Rig::new();
        rig.load(0, square(8, 64));
        let mut alg = ZeroCrossingSynth::new();
        alg.init(&params(Waveform::Sawtooth)).unwrap();
        alg.process(&mut rig.chunk(0, 0, 64, 1)).unwrap();
        assert_eq!(alg.half_period(), Some(8));
    }

    #[test]
    fn idle_until_first_crossing() {
        let rig: Rig<128> = Rig::new();
        rig.load(0, [2048u16; 64]);
        let mut alg = ZeroCrossingSynth::new();
        alg.init(&params(Waveform::Sawtooth)).unwrap();
        alg.process(&mut rig.chunk(0, 0, 64, 1)).unwrap();
        assert_eq!(alg.half_period(), None);
        assert_eq!(rig.out(10), OUTPUT_IDLE_LEVEL);
    }

    #[test]
    fn noise_inside_hysteresis_is_ignored() {
        let rig: Rig<128> = Rig::new();
        rig.load(0, (0..64).map(|i| if i % 2 == 0 { 2100 } else { 2000 }));
        let mut alg = ZeroCrossingSynth::new();
        alg.init(&params(Waveform::Sawtooth)).unwrap();
        alg.process(&mut rig.chunk(0, 0, 64, 1)).unwrap();
        assert_eq!(alg.half_period(), None);
    }

    #[test]
    fn sawtooth_spans_full_range() {
        let mut alg = ZeroCrossingSynth::new();
        alg.init(&params(Waveform::Sawtooth)).unwrap();
        let wave: [u8; 4] = core::array::from_fn(|_| alg.render(4));
        assert_eq!(wave, [0, 85, 170, 255]);
    }

    #[test]
    fn triangle_rises_then_falls() {
        let mut alg = ZeroCrossingSynth::new();
        alg.init(&params(Waveform::Triangle)).unwrap();
        let wave: [u8; 8] = core::array::from_fn(|_| alg.render(8));
        assert_eq!(wave, [0, 63, 127, 191, 255, 191, 127, 63]);
    }

    #[test]
    fn rolling_depth_is_bounded() {
        let mut alg = ZeroCrossingSynth::new();
        let mut p = params(Waveform::Sawtooth);
        p.rolling = MAX_ROLLING + 1;
        assert!(matches!(
            alg.init(&p),
            Err(Error::ResourceExhausted { .. })
        ));
        p.rolling = 0;
        assert!(alg.init(&p).is_err());
    }
}
