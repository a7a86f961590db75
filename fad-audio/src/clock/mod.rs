//! The periodic sample clock.
//!
//! A hardware alarm fires once per input sample. Its period is derived in
//! two stages, mirroring how the reference board's general-purpose timers
//! work:
//!
//! ```text
//! source clock ──÷ divider──► counter clock ──÷ alarm step──► sample tick
//!   80 MHz          907          ~88.2 kHz          8            ~11.025 kHz
//! ```
//!
//! The alarm step starts at [`DEFAULT_ALARM_TICKS`] and the divider is
//! fitted to the requested rate. Rates the timer cannot produce within
//! [`FREQUENCY_TOLERANCE_PERCENT`] are rejected rather than approximated.
//!
//! | Item | Role |
//! |------|------|
//! | [`AlarmTimer`] | platform seam: source clock, configure, start, pause, re-arm |
//! | [`ClockConfig`] | divider/alarm derivation and validation |
//! | [`SampleClock`] | run state; gates reconfiguration of the shared pipeline |
//! | [`ManualTimer`] | host-side timer for tests and simulation |
//! | [`PolledTimer`] | busy-wait timer over an `embedded-hal` delay (feature `polled`) |

mod manual;
#[cfg(feature = "polled")]
mod polled;

pub use manual::ManualTimer;
#[cfg(feature = "polled")]
pub use polled::PolledTimer;

use crate::constants::{DEFAULT_ALARM_TICKS, TIMER_SOURCE_HZ};
use crate::error::Error;
use crate::io::OutputMode;
use crate::pipeline::Pipeline;

/// Largest divider the timer prescaler accepts.
pub const MAX_DIVIDER: u32 = 65_536;

/// Largest deviation of the effective rate from the requested one.
pub const FREQUENCY_TOLERANCE_PERCENT: u32 = 1;

/// Platform timer driving the sample interrupt.
pub trait AlarmTimer {
    /// Frequency of the clock the divider is applied to.
    fn source_hz(&self) -> u32;

    /// Program the prescaler and the alarm step. Called only while paused.
    fn configure(&mut self, divider: u32, alarm_ticks: u32) -> Result<(), Error>;

    /// Enable the counter and its alarm interrupt.
    fn start(&mut self) -> Result<(), Error>;

    /// Halt the counter. Must be safe to call when already paused.
    fn pause(&mut self);

    /// Clear the alarm and schedule the next one. Called from the sample
    /// interrupt, so it must not block.
    fn rearm(&mut self);
}

/// Timer settings derived from a source clock and a target sample rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockConfig {
    source_hz: u32,
    divider: u32,
    alarm_ticks: u32,
}

impl ClockConfig {
    /// Derive a divider and alarm step that tick `sample_hz` times per
    /// second from a `source_hz` clock.
    ///
    /// The alarm step is [`DEFAULT_ALARM_TICKS`] unless that would push the
    /// divider out of `2..=MAX_DIVIDER`, in which case it is widened (slow
    /// rates) or narrowed (fast rates). The divider is rounded to nearest.
    pub fn new(source_hz: u32, sample_hz: u32) -> Result<Self, Error> {
        let invalid = Error::InvalidFrequency {
            frequency: sample_hz,
        };
        if sample_hz == 0 || sample_hz > source_hz / 2 {
            return Err(invalid);
        }
        let source = u64::from(source_hz);
        let sample = u64::from(sample_hz);
        let max_divider = u64::from(MAX_DIVIDER);

        let mut alarm = u64::from(DEFAULT_ALARM_TICKS);
        if source > sample * alarm * max_divider {
            alarm = source.div_ceil(sample * max_divider);
        } else if source < sample * alarm * 2 {
            alarm = source / (sample * 2);
        }
        let step = sample * alarm;
        let divider = (source + step / 2) / step;
        if !(2..=max_divider).contains(&divider) {
            return Err(invalid);
        }

        let config = ClockConfig {
            source_hz,
            divider: divider as u32,
            alarm_ticks: alarm as u32,
        };
        let error = u64::from(config.effective_hz().abs_diff(sample_hz));
        if error * 100 > sample * u64::from(FREQUENCY_TOLERANCE_PERCENT) {
            log::warn!(
                "sample clock: {} Hz not reachable from {} Hz (closest {} Hz)",
                sample_hz,
                source_hz,
                config.effective_hz()
            );
            return Err(invalid);
        }
        Ok(config)
    }

    /// Configuration for `sample_hz` on the board's default source clock.
    pub fn for_frequency(sample_hz: u32) -> Result<Self, Error> {
        Self::new(TIMER_SOURCE_HZ, sample_hz)
    }

    /// Prescaler applied to the source clock.
    pub fn divider(&self) -> u32 {
        self.divider
    }

    /// Counter ticks between two alarms.
    pub fn alarm_ticks(&self) -> u32 {
        self.alarm_ticks
    }

    /// Source clock cycles between two sample ticks.
    pub fn cycles_per_sample(&self) -> u64 {
        u64::from(self.divider) * u64::from(self.alarm_ticks)
    }

    /// Sample rate actually produced, rounded down.
    pub fn effective_hz(&self) -> u32 {
        (u64::from(self.source_hz) / self.cycles_per_sample()) as u32
    }

    /// Sample period in nanoseconds, rounded down.
    pub fn period_ns(&self) -> u32 {
        (self.cycles_per_sample() * 1_000_000_000 / u64::from(self.source_hz)) as u32
    }
}

/// Run state of the sample interrupt.
///
/// The clock shares the run flag with the [`Pipeline`] it drives: while it
/// is running, buffer geometry and output routing are frozen and every
/// setter returns [`Error::ClockRunning`].
pub struct SampleClock<'p, T: AlarmTimer, const N: usize> {
    timer: T,
    pipeline: &'p Pipeline<N>,
    config: Option<ClockConfig>,
}

impl<'p, T: AlarmTimer, const N: usize> SampleClock<'p, T, N> {
    pub fn new(timer: T, pipeline: &'p Pipeline<N>) -> Self {
        SampleClock {
            timer,
            pipeline,
            config: None,
        }
    }

    /// Configure the timer for `frequency` samples per second.
    pub fn init(&mut self, frequency: u32) -> Result<ClockConfig, Error> {
        if self.is_running() {
            return Err(Error::ClockRunning);
        }
        let config = ClockConfig::new(self.timer.source_hz(), frequency)?;
        self.timer
            .configure(config.divider(), config.alarm_ticks())?;
        log::info!(
            "sample clock: {} Hz requested, divider {} alarm {} ({} Hz effective)",
            frequency,
            config.divider(),
            config.alarm_ticks(),
            config.effective_hz()
        );
        self.config = Some(config);
        Ok(config)
    }

    /// Start ticking. Starting a running clock is a no-op.
    pub fn start(&mut self) -> Result<(), Error> {
        if self.config.is_none() {
            return Err(Error::NotInitialized);
        }
        if self.is_running() {
            return Ok(());
        }
        self.timer.start()?;
        self.pipeline.set_running(true);
        log::info!("sample clock started");
        Ok(())
    }

    /// Stop ticking. Stopping a stopped clock is a no-op.
    pub fn stop(&mut self) {
        if !self.is_running() {
            return;
        }
        self.timer.pause();
        self.pipeline.set_running(false);
        log::info!("sample clock stopped");
    }

    /// Whether the alarm is ticking.
    pub fn is_running(&self) -> bool {
        self.pipeline.is_running()
    }

    /// Configuration from the last successful [`init`](Self::init).
    pub fn config(&self) -> Option<ClockConfig> {
        self.config
    }

    /// Set the chunk size in input samples.
    pub fn set_read_size(&mut self, chunk: usize) -> Result<(), Error> {
        self.pipeline.set_read_size(chunk)
    }

    /// Route output to the DAC or the stream sink.
    pub fn set_output_mode(&mut self, mode: OutputMode) -> Result<(), Error> {
        self.pipeline.set_output_mode(mode)
    }

    /// Body of the sample interrupt: run `tick`, then re-arm the alarm.
    #[inline]
    pub fn service<R>(&mut self, tick: impl FnOnce() -> R) -> R {
        let out = tick();
        self.timer.rearm();
        out
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }
}
