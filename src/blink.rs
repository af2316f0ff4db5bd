//! Periodic blink state machine
//!
//! A [`Blinker`] owns one indicator and knows nothing about time: each call
//! to [`Blinker::step`] performs one transition and returns how long the
//! task should sleep before the next call. The embassy task wraps it in a
//! timer loop; the tests drive it from a virtual clock.

use crate::config::timing::GATE_POLL_MS;
use crate::gpio::{Indicator, Line};
use crate::mode::{ModeFlag, ModeFlags};
use crate::press::ack::ACK_PATTERN;

/// Immutable per-task configuration, fixed at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkTaskConfig {
    pub line: Line,
    /// Full on/off cycle
    pub period_ms: u32,
    /// Flag that must be set for the indicator to blink
    pub gate: Option<ModeFlag>,
    /// Whether this task plays the press acknowledgement
    pub serves_ack: bool,
}

impl BlinkTaskConfig {
    pub const fn always_on(line: Line, period_ms: u32) -> Self {
        Self {
            line,
            period_ms,
            gate: None,
            serves_ack: false,
        }
    }

    pub const fn gated(line: Line, period_ms: u32, flag: ModeFlag) -> Self {
        Self {
            line,
            period_ms,
            gate: Some(flag),
            serves_ack: false,
        }
    }

    pub const fn acknowledging(self) -> Self {
        Self {
            serves_ack: true,
            ..self
        }
    }

    pub const fn half_period_ms(&self) -> u32 {
        self.period_ms / 2
    }
}

/// Observable state of a blink task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkState {
    On,
    Off,
    /// Gate flag clear, output held inactive
    Disabled,
}

/// Result of one transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Sleep before the next step
    pub wait_ms: u32,
    /// The last acknowledgement segment was just driven
    pub ack_finished: bool,
}

impl Step {
    const fn wait(wait_ms: u32) -> Self {
        Self {
            wait_ms,
            ack_finished: false,
        }
    }
}

pub struct Blinker<I> {
    config: BlinkTaskConfig,
    indicator: I,
    /// Level the blink cycle is at, which the output may not show while
    /// an acknowledgement plays
    cycle_on: bool,
    /// Time left in the current half-period; zero means toggle next step
    remaining_ms: u32,
    disabled: bool,
    ack_segment: Option<usize>,
    /// Drive `cycle_on` on the next step
    resync: bool,
}

impl<I: Indicator> Blinker<I> {
    pub fn new(config: BlinkTaskConfig, indicator: I) -> Self {
        Self {
            config,
            indicator,
            cycle_on: false,
            remaining_ms: 0,
            disabled: false,
            ack_segment: None,
            resync: false,
        }
    }

    pub fn config(&self) -> &BlinkTaskConfig {
        &self.config
    }

    pub fn line(&self) -> Line {
        self.config.line
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    pub fn indicator_mut(&mut self) -> &mut I {
        &mut self.indicator
    }

    pub fn is_acknowledging(&self) -> bool {
        self.ack_segment.is_some()
    }

    /// Play the acknowledgement pattern from its first segment.
    ///
    /// `unslept_ms` is the part of the last returned wait that had not
    /// elapsed when the task woke early. The blink cycle keeps running
    /// underneath the pattern; afterwards the output returns to the cycle's
    /// level and the next toggle lands on the original schedule.
    pub fn begin_ack(&mut self, unslept_ms: u32) {
        self.remaining_ms += unslept_ms;
        self.ack_segment = Some(0);
    }

    pub fn state(&mut self) -> BlinkState {
        if self.disabled {
            BlinkState::Disabled
        } else if self.indicator.is_active() {
            BlinkState::On
        } else {
            BlinkState::Off
        }
    }

    /// Perform one transition.
    ///
    /// Ungated indicators toggle once per half-period. Gated indicators
    /// sleep their half-periods in slices of at most [`GATE_POLL_MS`] and
    /// re-read their flag every slice; once it reads clear the output is
    /// forced inactive and re-checked every poll interval.
    pub fn step(&mut self, flags: &ModeFlags) -> Step {
        if let Some(index) = self.ack_segment {
            return self.step_ack(index);
        }

        let enabled = match self.config.gate {
            None => true,
            Some(flag) => flags.is_active(flag),
        };

        if !enabled {
            if !self.disabled {
                log::debug!("{:?} indicator disabled", self.config.line);
                self.disabled = true;
            }
            self.indicator.set_active(false);
            self.cycle_on = false;
            self.remaining_ms = 0;
            self.resync = false;
            return Step::wait(GATE_POLL_MS);
        }

        if self.disabled {
            log::debug!("{:?} indicator enabled", self.config.line);
            self.disabled = false;
        }

        if self.remaining_ms == 0 {
            self.cycle_on = !self.cycle_on;
            self.remaining_ms = self.config.half_period_ms();
            self.indicator.set_active(self.cycle_on);
        } else if self.resync {
            self.indicator.set_active(self.cycle_on);
        }
        self.resync = false;

        let slice = match self.config.gate {
            None => self.remaining_ms,
            Some(_) => self.remaining_ms.min(GATE_POLL_MS),
        };
        self.remaining_ms -= slice;
        Step::wait(slice)
    }

    fn step_ack(&mut self, index: usize) -> Step {
        let segment = ACK_PATTERN[index];
        self.indicator.set_active(segment.active);
        self.elapse(segment.hold_ms);

        let last = index + 1 == ACK_PATTERN.len();
        if last {
            self.ack_segment = None;
            self.resync = true;
        } else {
            self.ack_segment = Some(index + 1);
        }

        Step {
            wait_ms: segment.hold_ms,
            ack_finished: last,
        }
    }

    /// Advance the blink cycle by `ms` without driving the output.
    fn elapse(&mut self, mut ms: u32) {
        while ms > 0 {
            if self.remaining_ms == 0 {
                self.cycle_on = !self.cycle_on;
                self.remaining_ms = self.config.half_period_ms();
            }
            let passed = ms.min(self.remaining_ms);
            self.remaining_ms -= passed;
            ms -= passed;
        }
    }
}
