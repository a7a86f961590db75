use crate::clock::AlarmTimer;
use crate::constants::TIMER_SOURCE_HZ;
use crate::error::Error;

/// Software timer that only records what it was asked to do.
///
/// The host (a test, or a simulation loop) calls the tick itself; the
/// timer counts re-arms so the caller can check the interrupt contract.
#[derive(Debug, Clone)]
pub struct ManualTimer {
    source_hz: u32,
    configuration: Option<(u32, u32)>,
    running: bool,
    rearms: u32,
    pauses: u32,
}

impl ManualTimer {
    /// Timer on the board's default source clock.
    pub const fn new() -> Self {
        Self::with_source_hz(TIMER_SOURCE_HZ)
    }

    /// Timer whose divider runs off a `source_hz` clock.
    pub const fn with_source_hz(source_hz: u32) -> Self {
        ManualTimer {
            source_hz,
            configuration: None,
            running: false,
            rearms: 0,
            pauses: 0,
        }
    }

    /// Last `(divider, alarm_ticks)` programmed.
    pub fn configuration(&self) -> Option<(u32, u32)> {
        self.configuration
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn rearms(&self) -> u32 {
        self.rearms
    }

    pub fn pauses(&self) -> u32 {
        self.pauses
    }
}

impl Default for ManualTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl AlarmTimer for ManualTimer {
    fn source_hz(&self) -> u32 {
        self.source_hz
    }

    fn configure(&mut self, divider: u32, alarm_ticks: u32) -> Result<(), Error> {
        self.configuration = Some((divider, alarm_ticks));
        Ok(())
    }

    fn start(&mut self) -> Result<(), Error> {
        if self.configuration.is_none() {
            return Err(Error::Timer("alarm not configured"));
        }
        self.running = true;
        Ok(())
    }

    fn pause(&mut self) {
        if self.running {
            self.pauses += 1;
        }
        self.running = false;
    }

    fn rearm(&mut self) {
        self.rearms = self.rearms.wrapping_add(1);
    }
}
