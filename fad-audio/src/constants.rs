/// Number of 12-bit input samples held by the input ring.
pub const INPUT_BUFFER_SAMPLES: usize = 2048;

/// Default number of input samples condensed into one output sample.
pub const DEFAULT_MULTISAMPLES: usize = 1;

/// Exact input sample rate in Hz.
pub const SAMPLE_RATE_HZ: u32 = 11_025;

/// Source clock feeding the sample timer (APB clock on the reference board).
pub const TIMER_SOURCE_HZ: u32 = 80_000_000;

/// Alarm step tried first when deriving the sample clock. At 11.025 kHz
/// this runs the counter at ~88.2 kHz (80 MHz ÷ 907).
pub const DEFAULT_ALARM_TICKS: u32 = 8;

/// Largest raw value the 12-bit converter produces.
pub const INPUT_SAMPLE_MAX: u16 = 0x0FFF;

/// Output level the DAC treats as silence (8-bit midpoint).
pub const OUTPUT_IDLE_LEVEL: u8 = 0x80;

/// Converter channel sampled by default.
pub const INPUT_CHANNEL: u8 = 6;

/// DAC channel driven in wired output mode.
pub const OUTPUT_CHANNEL: u8 = 1;
