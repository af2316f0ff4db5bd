//! Hardware configuration constants for the ESP32-S3 indicator board

use crate::blink::BlinkTaskConfig;
use crate::gpio::{Line, Polarity};
use crate::mode::ModeFlag;

/// GPIO assignments and line polarity
pub mod pins {
    use super::Polarity;

    pub const GREEN: u8 = 4;
    pub const ACK_GREEN: u8 = 5;
    pub const RED: u8 = 6;
    pub const BLUE: u8 = 7;
    pub const BUTTON: u8 = 1;

    pub const INDICATOR_POLARITY: Polarity = Polarity::ActiveHigh;
    /// Button pulls the line high when pressed (no internal pull)
    pub const BUTTON_POLARITY: Polarity = Polarity::ActiveHigh;
}

/// Fixed timing contracts, all in milliseconds unless noted
pub mod timing {
    /// Minimum time between two accepted button presses
    pub const DEBOUNCE_MS: u64 = 80;

    /// Length of each segment of the acknowledgement pattern
    pub const ACK_SEGMENT_MS: u32 = 60;

    /// Re-check interval of a gated indicator
    pub const GATE_POLL_MS: u32 = 50;

    pub const GREEN_PERIOD_MS: u32 = 2000;
    pub const ACK_GREEN_PERIOD_MS: u32 = 4000;
    pub const RED_PERIOD_MS: u32 = 1000;
    pub const BLUE_PERIOD_MS: u32 = 1000;

    /// Busy burst of the load task, in microseconds
    pub const LOAD_BUSY_US: u64 = 7000;
    pub const LOAD_SLEEP_MS: u64 = 1;

    /// Interval of the idle loop's status line
    pub const STATUS_INTERVAL_MS: u64 = 1000;
}

/// Scheduling classes, lowest first.
///
/// `Thread` is the thread-mode executor; the others map to interrupt
/// executors at the matching interrupt priority, so a higher class always
/// preempts a lower one. Tasks sharing a class run cooperatively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum TaskPriority {
    Thread = 0,
    Level1 = 1,
    Level2 = 2,
}

impl TaskPriority {
    pub const fn rank(self) -> u8 {
        self as u8
    }
}

pub mod priorities {
    use super::TaskPriority;

    /// Interrupt level of the button handler, above every task class
    pub const BUTTON_INTERRUPT_LEVEL: u8 = 3;

    pub const ALWAYS_ON_BLINK: TaskPriority = TaskPriority::Level1;
    pub const PRESS_WORKER: TaskPriority = TaskPriority::Level2;
    pub const STATUS: TaskPriority = TaskPriority::Thread;

    #[cfg(not(feature = "load-starvation"))]
    pub const GATED_BLINK: TaskPriority = TaskPriority::Level2;
    #[cfg(not(feature = "load-starvation"))]
    pub const LOAD: TaskPriority = TaskPriority::Thread;

    // Load preempts every blinker. It shares the press worker's class, and
    // its sleeps still let the worker run.
    #[cfg(feature = "load-starvation")]
    pub const GATED_BLINK: TaskPriority = TaskPriority::Level1;
    #[cfg(feature = "load-starvation")]
    pub const LOAD: TaskPriority = TaskPriority::Level2;
}

/// Static line-to-task assignment of the four blink tasks.
///
/// Every indicator line appears exactly once, in `Line` order, so each line
/// has a single writer for the lifetime of the firmware.
pub const BLINKERS: [BlinkTaskConfig; 4] = [
    BlinkTaskConfig::always_on(Line::Green, timing::GREEN_PERIOD_MS),
    BlinkTaskConfig::always_on(Line::AckGreen, timing::ACK_GREEN_PERIOD_MS).acknowledging(),
    BlinkTaskConfig::gated(Line::Red, timing::RED_PERIOD_MS, ModeFlag::RedActive),
    BlinkTaskConfig::gated(Line::Blue, timing::BLUE_PERIOD_MS, ModeFlag::BlueActive),
];

/// Entry `i` must drive the indicator whose `Line` discriminant is `i`;
/// startup hands out the indicators positionally.
const fn blinkers_are_consistent(table: &[BlinkTaskConfig]) -> bool {
    let mut acknowledging = 0;
    let mut i = 0;
    while i < table.len() {
        let entry = &table[i];
        if entry.line as usize != i || entry.period_ms < 2 {
            return false;
        }
        if entry.serves_ack {
            if entry.gate.is_some() {
                return false;
            }
            acknowledging += 1;
        }
        i += 1;
    }
    acknowledging == 1
}

const _: () = assert!(blinkers_are_consistent(&BLINKERS), "invalid blink task table");

#[cfg(not(feature = "load-starvation"))]
const _: () = assert!(
    priorities::LOAD.rank() <= priorities::ALWAYS_ON_BLINK.rank()
        && priorities::LOAD.rank() <= priorities::GATED_BLINK.rank(),
    "load task must not outrank a blink task"
);

const _: () = assert!(
    priorities::PRESS_WORKER.rank() >= priorities::LOAD.rank()
        && priorities::PRESS_WORKER.rank() >= priorities::GATED_BLINK.rank(),
    "press worker must not be preempted by the load task or a blinker"
);

const _: () = assert!(priorities::BUTTON_INTERRUPT_LEVEL > TaskPriority::Level2.rank());
