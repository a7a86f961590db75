//! Sample-level DSP shared by the algorithms.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`helpers`] | 12-bit to 8-bit conversion, centring, saturation, window statistics |
//! | [`fft`] | real FFT (`microfft`), Hann window, peak-bin search |
//! | [`noise`] | xorshift noise generator |

pub mod fft;
pub mod helpers;
pub mod noise;
