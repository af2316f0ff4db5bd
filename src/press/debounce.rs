//! Time-window debounce filter for the button interrupt
//!
//! Owned by the interrupt handler: no blocking, no logging, bounded work.

/// What the filter decided for one edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOutcome {
    /// Inside the window of the last accepted edge; state unchanged
    Suppressed,
    /// Window elapsed but the line no longer reads pressed. The window
    /// still restarts at this edge.
    Spurious,
    /// A press to hand to the deferred handler
    Accepted,
}

/// Debounce state of the button line.
///
/// An edge is accepted only if at least `window_ms` have passed since the
/// last accepted (or spurious) edge.
#[derive(Debug)]
pub struct Debouncer {
    window_ms: u64,
    last_accepted_ms: Option<u64>,
}

impl Debouncer {
    pub const fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            last_accepted_ms: None,
        }
    }

    /// Filter one rising edge.
    ///
    /// `resample` reads the button again and is only called once the window
    /// has elapsed.
    pub fn on_edge(&mut self, now_ms: u64, resample: impl FnOnce() -> bool) -> EdgeOutcome {
        if let Some(last) = self.last_accepted_ms {
            // A clock reading older than `last` counts as zero elapsed time,
            // which keeps the timestamp non-decreasing.
            if now_ms.saturating_sub(last) < self.window_ms {
                return EdgeOutcome::Suppressed;
            }
        }
        self.last_accepted_ms = Some(now_ms);

        if !resample() {
            return EdgeOutcome::Spurious;
        }
        EdgeOutcome::Accepted
    }

    pub fn last_accepted_ms(&self) -> Option<u64> {
        self.last_accepted_ms
    }
}
