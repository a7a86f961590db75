//! Sample clock for boards without a free timer interrupt.

use embedded_hal::delay::DelayNs;

use crate::clock::AlarmTimer;
use crate::error::Error;

/// Busy-wait "timer" built on an [`embedded_hal::delay::DelayNs`] provider.
///
/// The caller runs the tick loop itself; each [`rearm`](AlarmTimer::rearm)
/// blocks for one sample period. Jitter is whatever the tick body costs on
/// top of the delay, which is acceptable for bring-up and bench testing.
pub struct PolledTimer<D> {
    delay: D,
    source_hz: u32,
    period_ns: u32,
    running: bool,
}

impl<D: DelayNs> PolledTimer<D> {
    /// `source_hz` is the clock the divider is applied to.
    pub fn new(delay: D, source_hz: u32) -> Self {
        PolledTimer {
            delay,
            source_hz,
            period_ns: 0,
            running: false,
        }
    }

    /// Length of one sample period, or 0 before configuration.
    pub fn period_ns(&self) -> u32 {
        self.period_ns
    }

    pub fn release(self) -> D {
        self.delay
    }
}

impl<D: DelayNs> AlarmTimer for PolledTimer<D> {
    fn source_hz(&self) -> u32 {
        self.source_hz
    }

    fn configure(&mut self, divider: u32, alarm_ticks: u32) -> Result<(), Error> {
        if self.source_hz == 0 {
            return Err(Error::Timer("source clock is zero"));
        }
        let cycles = u64::from(divider) * u64::from(alarm_ticks);
        let period = cycles * 1_000_000_000 / u64::from(self.source_hz);
        self.period_ns = u32::try_from(period).map_err(|_| Error::Timer("period overflow"))?;
        Ok(())
    }

    fn start(&mut self) -> Result<(), Error> {
        if self.period_ns == 0 {
            return Err(Error::Timer("alarm not configured"));
        }
        self.running = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.running = false;
    }

    fn rearm(&mut self) {
        if self.running {
            self.delay.delay_ns(self.period_ns);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records the total time it was asked to wait.
    struct MockDelay {
        waited_ns: u64,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.waited_ns += u64::from(ns);
        }
    }

    #[test]
    fn rearm_waits_one_period() {
        let mut t = PolledTimer::new(MockDelay { waited_ns: 0 }, 80_000_000);
        t.configure(907, 8).unwrap();
        assert_eq!(t.period_ns(), 90_700);
        t.start().unwrap();
        t.rearm();
        t.rearm();
        assert_eq!(t.release().waited_ns, 181_400);
    }

    #[test]
    fn paused_timer_does_not_wait() {
        let mut t = PolledTimer::new(MockDelay { waited_ns: 0 }, 80_000_000);
        t.configure(907, 8).unwrap();
        t.rearm();
        t.start().unwrap();
        t.pause();
        t.rearm();
        assert_eq!(t.release().waited_ns, 0);
    }

    #[test]
    fn clock_period_matches_the_delay_waited() {
        use crate::clock::SampleClock;
        use crate::pipeline::Pipeline;

        let pipeline: Pipeline<64> = Pipeline::new();
        let timer = PolledTimer::new(MockDelay { waited_ns: 0 }, 48_000_000);
        let mut clock = SampleClock::new(timer, &pipeline);
        let cfg = clock.init(11_025).unwrap();
        assert_eq!(clock.timer().period_ns(), cfg.period_ns());
        assert!(cfg.effective_hz().abs_diff(11_025) < 100);

        clock.start().unwrap();
        clock.service(|| ());
        clock.stop();
        assert_eq!(clock.timer().delay.waited_ns, u64::from(cfg.period_ns()));
    }

    #[test]
    fn start_before_configure_fails() {
        let mut t = PolledTimer::new(MockDelay { waited_ns: 0 }, 80_000_000);
        assert!(t.start().is_err());
    }
}
