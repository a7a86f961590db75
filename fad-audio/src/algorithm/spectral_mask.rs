//! Sawtooth masker tuned to the input's dominant frequency.
//!
//! Each chunk, the first `window` frames are Hann-windowed and transformed.
//! The strongest non-DC bin gives the fundamental; its magnitude sets the
//! amplitude of a sawtooth synthesized at that frequency for the whole
//! output chunk. The oscillator phase carries across chunks so the tone
//! has no seams.

use crate::algorithm::{Algorithm, Requirements};
use crate::buffer::Chunk;
use crate::constants::SAMPLE_RATE_HZ;
use crate::dsp::fft::{hann, peak_bin, real_spectrum, MAX_FFT_LEN, MIN_FFT_LEN};
use crate::dsp::helpers::{around_idle, centered, INPUT_MIDPOINT};
use crate::error::Error;

/// Largest analysis window, in output frames.
pub const MAX_WINDOW: usize = MAX_FFT_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpectralMaskParams {
    pub read_size: usize,
    pub multisamples: usize,
    /// Analysis window in frames; a power of two from 16 up to a chunk.
    pub window: usize,
    /// Input sample rate in Hz.
    pub sample_rate: u32,
}

impl Default for SpectralMaskParams {
    fn default() -> Self {
        SpectralMaskParams {
            read_size: 1024,
            multisamples: 1,
            window: 256,
            sample_rate: SAMPLE_RATE_HZ,
        }
    }
}

pub struct SpectralMask {
    frames: [f32; MAX_WINDOW],
    window: usize,
    /// Frame rate after multisampling.
    frame_rate: f32,
    fundamental_hz: f32,
    /// Normalized 0.0..=1.0.
    amplitude: f32,
    phase: u32,
}

impl SpectralMask {
    pub const fn new() -> Self {
        SpectralMask {
            frames: [0.0; MAX_WINDOW],
            window: 0,
            frame_rate: 0.0,
            fundamental_hz: 0.0,
            amplitude: 0.0,
            phase: 0,
        }
    }

    /// Dominant input frequency found in the last chunk.
    pub fn fundamental_hz(&self) -> f32 {
        self.fundamental_hz
    }

    /// Normalized magnitude of the dominant frequency.
    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    fn analyse(&mut self, chunk: &Chunk<'_>) -> Result<(), Error> {
        let n = self.window;
        let input = chunk.input();
        for (i, slot) in self.frames[..n].iter_mut().enumerate() {
            let frame = input.frame(i).unwrap_or(INPUT_MIDPOINT as u16);
            *slot = centered(frame) as f32 * hann(i, n);
        }
        let bins = real_spectrum(&mut self.frames[..n])?;

        match peak_bin(bins) {
            Some((bin, magnitude)) => {
                self.fundamental_hz = bin as f32 * self.frame_rate / n as f32;
                // A full-scale sine peaks at about midpoint * n / 4 under a Hann window.
                let full_scale = INPUT_MIDPOINT as f32 * n as f32 / 4.0;
                self.amplitude = (magnitude / full_scale).min(1.0);
            }
            None => {
                self.fundamental_hz = 0.0;
                self.amplitude = 0.0;
            }
        }
        Ok(())
    }
}

impl Default for SpectralMask {
    fn default() -> Self {
        Self::new()
    }
}

impl Algorithm for SpectralMask {
    type Params = SpectralMaskParams;

    fn requirements(params: &SpectralMaskParams) -> Requirements {
        Requirements::new(params.read_size, params.multisamples)
    }

    fn init(&mut self, params: &SpectralMaskParams) -> Result<(), Error> {
        let w = params.window;
        if w > MAX_WINDOW {
            return Err(Error::ResourceExhausted {
                requested: w,
                available: MAX_WINDOW,
            });
        }
        let frames = params.read_size / params.multisamples.max(1);
        if w < MIN_FFT_LEN || !w.is_power_of_two() || w > frames {
            return Err(Error::InvalidParameter { name: "window" });
        }
        if params.sample_rate == 0 {
            return Err(Error::InvalidParameter {
                name: "sample_rate",
            });
        }
        self.window = w;
        self.frame_rate = params.sample_rate as f32 / params.multisamples.max(1) as f32;
        self.fundamental_hz = 0.0;
        self.amplitude = 0.0;
        self.phase = 0;
        Ok(())
    }

    fn deinit(&mut self) {
        self.window = 0;
    }

    fn process(&mut self, chunk: &mut Chunk<'_>) -> Result<(), Error> {
        if self.window == 0 {
            return Err(Error::InvalidParameter { name: "window" });
        }
        self.analyse(chunk)?;

        let step = (self.fundamental_hz / self.frame_rate * 4_294_967_296.0) as u32;
        let output = chunk.output();
        for j in 0..output.len() {
            // Top byte of the phase is a rising ramp; centre it on zero.
            let saw = (self.phase >> 24) as i32 - 128;
            output.set(j, around_idle((saw as f32 * self.amplitude) as i32))?;
            self.phase = self.phase.wrapping_add(step);
        }
        log::trace!(
            "spectral mask: {} Hz at {}",
            self.fundamental_hz as u32,
            self.amplitude
        );
        Ok(())
    }
}
