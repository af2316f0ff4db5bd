//! Single-slot deferred-work queue for press events
//!
//! Submitting while an event is already pending overwrites it with an
//! identical event, so repeated submissions coalesce into one unit of work.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// "A debounced press occurred". Carries no data; the handler always
/// re-reads the current mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressEvent;

/// Coalescing press queue, filled from interrupt context and drained by
/// exactly one worker task.
pub struct PressQueue {
    slot: Signal<CriticalSectionRawMutex, PressEvent>,
}

/// Queue between the button interrupt and the press worker
pub static PRESS_QUEUE: PressQueue = PressQueue::new();

impl PressQueue {
    pub const fn new() -> Self {
        Self {
            slot: Signal::new(),
        }
    }

    /// Queue a press. Safe to call from an interrupt handler; a no-op if
    /// one is already pending.
    pub fn submit(&self) {
        self.slot.signal(PressEvent);
    }

    pub fn is_pending(&self) -> bool {
        self.slot.signaled()
    }

    /// Take the pending press without waiting.
    pub fn try_next(&self) -> Option<PressEvent> {
        self.slot.try_take()
    }

    /// Wait for the next press.
    pub async fn next(&self) -> PressEvent {
        self.slot.wait().await
    }
}

impl Default for PressQueue {
    fn default() -> Self {
        Self::new()
    }
}
