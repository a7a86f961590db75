//! Conversions between the 12-bit input and 8-bit output sample domains.

use crate::constants::{INPUT_SAMPLE_MAX, OUTPUT_IDLE_LEVEL};

/// Input midpoint: a silent microphone reads about this value.
pub const INPUT_MIDPOINT: i32 = (INPUT_SAMPLE_MAX as i32 + 1) / 2;

/// Scale a 12-bit input sample to the 8-bit output range.
///
/// Out-of-range inputs saturate at full scale.
#[inline(always)]
pub fn to_output(sample: u16) -> u8 {
    (sample.min(INPUT_SAMPLE_MAX) >> 4) as u8
}

/// Signed distance of a 12-bit input sample from the midpoint.
#[inline(always)]
pub fn centered(sample: u16) -> i32 {
    i32::from(sample.min(INPUT_SAMPLE_MAX)) - INPUT_MIDPOINT
}

/// Clamp `value` into the 8-bit output range.
#[inline(always)]
pub fn saturate_u8(value: i32) -> u8 {
    value.clamp(0, u8::MAX as i32) as u8
}

/// Offset a signed 8-bit-scale value around the output idle level.
#[inline(always)]
pub fn around_idle(value: i32) -> u8 {
    saturate_u8(OUTPUT_IDLE_LEVEL as i32 + value)
}

/// Difference between the largest and smallest sample, or 0 if empty.
pub fn peak_to_peak(samples: impl Iterator<Item = u16>) -> u16 {
    let (min, max) = samples.fold((u16::MAX, 0u16), |(lo, hi), s| (lo.min(s), hi.max(s)));
    max.saturating_sub(min)
}

/// Integer mean of the samples, or `None` if there are none.
pub fn mean(samples: impl Iterator<Item = u16>) -> Option<u16> {
    let (sum, count) = samples.fold((0u32, 0u32), |(sum, n), s| (sum + u32::from(s), n + 1));
    if count == 0 {
        None
    } else {
        Some((sum / count) as u16)
    }
}
