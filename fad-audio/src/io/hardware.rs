//! Hardware primitives the capture handler drives once per tick.
//!
//! Implementations run in interrupt context: they must finish in a small,
//! bounded number of cycles and must not allocate or block. A busy-poll
//! on a conversion-complete flag is acceptable because it is short.

/// Analog input converter.
pub trait SampleSource {
    /// Convert and return one raw sample (12-bit range) from `channel`.
    fn read_sample(&mut self, channel: u8) -> u16;
}

/// Analog output converter.
pub trait SampleSink {
    /// Drive `value` (8-bit range) onto `channel`.
    fn write_sample(&mut self, channel: u8, value: u8);
}

/// Wireless-only builds have no DAC to drive.
impl SampleSink for () {
    fn write_sample(&mut self, _channel: u8, _value: u8) {}
}

/// Where processed audio leaves the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum OutputMode {
    /// Wired headset: the handler writes one sample per output tick.
    Dac = 0,
    /// Wireless link: the worker hands whole output windows to a stream sink.
    #[default]
    Wireless = 1,
}

impl OutputMode {
    pub(crate) fn from_bits(bits: u8) -> Self {
        match bits {
            0 => OutputMode::Dac,
            _ => OutputMode::Wireless,
        }
    }
}
