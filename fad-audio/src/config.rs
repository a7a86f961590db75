//! Algorithm selection and preset parameter bundles.
//!
//! The user-facing configuration is just a `{kind, mode}` pair: the kind
//! picks the algorithm, the mode picks one of three presets of increasing
//! effect strength. [`Selection::params`] expands the pair into the full
//! parameter bundle the algorithm's `init` takes.
//!
//! | Kind | Mode 1 | Mode 2 | Mode 3 |
//! |------|--------|--------|--------|
//! | Passthrough | ungated | gate 128 | gate 64 |
//! | TestTone | half period 1 | 2 | 4 |
//! | NoiseMask | scan 64 | 128 | 256 |
//! | DelayLine | 2756 (~0.25 s) | 5512 (~0.5 s) | 8192 (~0.74 s) |
//! | SpectralMask | window 128 | 256 | 512 |
//! | ZeroCrossingSynth | sawtooth, avg 5 | triangle, avg 5 | triangle, avg 10 |
//! | FrequencyShift | 50 Hz | 100 Hz | 200 Hz |

use crate::algorithm::{
    DelayLineParams, FrequencyShiftParams, NoiseMaskParams, Params, PassthroughParams,
    SpectralMaskParams, TestToneParams, Waveform, ZeroCrossingSynthParams,
};

/// Which algorithm to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlgorithmKind {
    #[default]
    Passthrough,
    TestTone,
    NoiseMask,
    DelayLine,
    SpectralMask,
    ZeroCrossingSynth,
    FrequencyShift,
}

impl AlgorithmKind {
    pub const ALL: [AlgorithmKind; 7] = [
        AlgorithmKind::Passthrough,
        AlgorithmKind::TestTone,
        AlgorithmKind::NoiseMask,
        AlgorithmKind::DelayLine,
        AlgorithmKind::SpectralMask,
        AlgorithmKind::ZeroCrossingSynth,
        AlgorithmKind::FrequencyShift,
    ];
}

/// Preset strength; higher modes mean a stronger effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlgorithmMode {
    #[default]
    Mode1,
    Mode2,
    Mode3,
}

impl AlgorithmMode {
    /// Pick one of three values by mode.
    fn pick<T>(self, values: [T; 3]) -> T {
        let [one, two, three] = values;
        match self {
            AlgorithmMode::Mode1 => one,
            AlgorithmMode::Mode2 => two,
            AlgorithmMode::Mode3 => three,
        }
    }
}

/// Persisted algorithm choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub kind: AlgorithmKind,
    pub mode: AlgorithmMode,
}

impl Selection {
    pub const fn new(kind: AlgorithmKind, mode: AlgorithmMode) -> Self {
        Selection { kind, mode }
    }

    /// Full parameter bundle for this selection.
    pub fn params(&self) -> Params {
        let mode = self.mode;
        match self.kind {
            AlgorithmKind::Passthrough => Params::Passthrough(PassthroughParams {
                gate_period: mode.pick([None, Some(128), Some(64)]),
                ..PassthroughParams::default()
            }),
            AlgorithmKind::TestTone => Params::TestTone(TestToneParams {
                half_period: mode.pick([1, 2, 4]),
                ..TestToneParams::default()
            }),
            AlgorithmKind::NoiseMask => Params::NoiseMask(NoiseMaskParams {
                scan_window: mode.pick([64, 128, 256]),
                ..NoiseMaskParams::default()
            }),
            AlgorithmKind::DelayLine => Params::DelayLine(DelayLineParams {
                delay: mode.pick([2756, 5512, 8192]),
                ..DelayLineParams::default()
            }),
            AlgorithmKind::SpectralMask => Params::SpectralMask(SpectralMaskParams {
                window: mode.pick([128, 256, 512]),
                ..SpectralMaskParams::default()
            }),
            AlgorithmKind::ZeroCrossingSynth => {
                Params::ZeroCrossingSynth(ZeroCrossingSynthParams {
                    waveform: mode.pick([Waveform::Sawtooth, Waveform::Triangle, Waveform::Triangle]),
                    rolling: mode.pick([5, 5, 10]),
                    ..ZeroCrossingSynthParams::default()
                })
            }
            AlgorithmKind::FrequencyShift => Params::FrequencyShift(FrequencyShiftParams {
                shift_hz: mode.pick([50, 100, 200]),
                ..FrequencyShiftParams::default()
            }),
        }
    }
}
