//! Background CPU load
//!
//! The load task alternates a busy burst with a short sleep so the blink
//! tasks are preempted regularly. It shares no state with the rest of the
//! firmware.

use crate::config::timing;

/// Busy/sleep duty cycle of the load task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProfile {
    /// Busy burst, in microseconds
    pub busy_us: u64,
    pub sleep_ms: u64,
}

impl LoadProfile {
    pub const DEFAULT: LoadProfile = LoadProfile {
        busy_us: timing::LOAD_BUSY_US,
        sleep_ms: timing::LOAD_SLEEP_MS,
    };

    /// Share of CPU time spent busy, in percent
    pub const fn duty_percent(&self) -> u64 {
        let period_us = self.busy_us + self.sleep_ms * 1000;
        if period_us == 0 {
            return 0;
        }
        self.busy_us * 100 / period_us
    }
}

impl Default for LoadProfile {
    fn default() -> Self {
        Self::DEFAULT
    }
}
