//! Press acknowledgement handshake
//!
//! The acknowledgement is shown on an always-on indicator whose line is
//! owned by its blink task. The press handler asks that task to play
//! [`ACK_PATTERN`] and waits until it reports the pattern done, so the line
//! keeps a single writer.

use crate::config::timing::ACK_SEGMENT_MS;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// One segment of the acknowledgement: indicator level and hold time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AckSegment {
    pub active: bool,
    pub hold_ms: u32,
}

/// On, off, on, off
pub const ACK_PATTERN: [AckSegment; 4] = [
    AckSegment { active: true, hold_ms: ACK_SEGMENT_MS },
    AckSegment { active: false, hold_ms: ACK_SEGMENT_MS },
    AckSegment { active: true, hold_ms: ACK_SEGMENT_MS },
    AckSegment { active: false, hold_ms: ACK_SEGMENT_MS },
];

/// Request/completion pair between the press handler and the
/// acknowledging blink task
pub struct AckLink {
    request: Signal<CriticalSectionRawMutex, ()>,
    done: Signal<CriticalSectionRawMutex, ()>,
}

pub static ACK_LINK: AckLink = AckLink::new();

impl AckLink {
    pub const fn new() -> Self {
        Self {
            request: Signal::new(),
            done: Signal::new(),
        }
    }

    /// Ask the indicator task to play the pattern.
    pub fn request(&self) {
        self.done.reset();
        self.request.signal(());
    }

    /// Consume a pending request without waiting.
    pub fn take_request(&self) -> bool {
        self.request.try_take().is_some()
    }

    /// Wait for a request.
    pub async fn requested(&self) {
        self.request.wait().await
    }

    /// Report that the final segment has been driven.
    pub fn complete(&self) {
        self.done.signal(());
    }

    /// Wait until the pattern requested last has been driven.
    pub async fn finished(&self) {
        self.done.wait().await
    }
}

impl Default for AckLink {
    fn default() -> Self {
        Self::new()
    }
}
