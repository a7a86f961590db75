//! Spectrum analysis on top of `microfft`.
//!
//! `microfft` works on fixed-size arrays; [`real_spectrum`] picks the
//! transform for a runtime window length so callers can keep one
//! maximum-size buffer in their own state.

use core::f32::consts::PI;

pub use microfft::Complex32;

use crate::error::Error;

/// Shortest supported transform.
pub const MIN_FFT_LEN: usize = 16;

/// Longest supported transform.
pub const MAX_FFT_LEN: usize = 512;

fn fixed<const N: usize>(samples: &mut [f32]) -> Result<&mut [f32; N], Error> {
    samples
        .try_into()
        .map_err(|_| Error::InvalidParameter { name: "fft length" })
}

/// Real FFT of `samples`, in place.
///
/// Returns the `len / 2` positive-frequency bins. Bin 0 packs DC in `re`
/// and Nyquist in `im`. The length must be a power of two in
/// `MIN_FFT_LEN..=MAX_FFT_LEN`.
pub fn real_spectrum(samples: &mut [f32]) -> Result<&mut [Complex32], Error> {
    use microfft::real::{rfft_128, rfft_16, rfft_256, rfft_32, rfft_512, rfft_64};

    let bins: &mut [Complex32] = match samples.len() {
        16 => &mut rfft_16(fixed(samples)?)[..],
        32 => &mut rfft_32(fixed(samples)?)[..],
        64 => &mut rfft_64(fixed(samples)?)[..],
        128 => &mut rfft_128(fixed(samples)?)[..],
        256 => &mut rfft_256(fixed(samples)?)[..],
        512 => &mut rfft_512(fixed(samples)?)[..],
        _ => return Err(Error::InvalidParameter { name: "fft length" }),
    };
    Ok(bins)
}

/// Hann window coefficient for sample `i` of `n`.
#[inline]
pub fn hann(i: usize, n: usize) -> f32 {
    if n < 2 {
        return 1.0;
    }
    0.5 - 0.5 * libm::cosf(2.0 * PI * i as f32 / (n - 1) as f32)
}

/// Strongest non-DC bin and its magnitude.
pub fn peak_bin(bins: &[Complex32]) -> Option<(usize, f32)> {
    bins.iter()
        .enumerate()
        .skip(1)
        .map(|(k, c)| (k, libm::sqrtf(c.re * c.re + c.im * c.im)))
        .fold(None, |best: Option<(usize, f32)>, (k, mag)| match best {
            Some((_, m)) if m >= mag => best,
            _ => Some((k, mag)),
        })
}
