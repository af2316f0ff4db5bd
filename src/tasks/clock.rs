//! Time source trait for the task loops
//!
//! The device sleeps on the embassy timer; the simulator substitutes a
//! virtual millisecond clock.

use core::future::Future;

/// Monotonic millisecond clock with absolute-deadline sleeps
pub trait Clock {
    fn now_ms(&self) -> u64;

    /// Complete once `now_ms()` has reached `deadline_ms`.
    fn sleep_until(&self, deadline_ms: u64) -> impl Future<Output = ()>;
}

/// Clock backed by the embassy time driver
#[cfg(feature = "embedded")]
pub struct EmbassyClock;

#[cfg(feature = "embedded")]
impl Clock for EmbassyClock {
    fn now_ms(&self) -> u64 {
        embassy_time::Instant::now().as_millis()
    }

    fn sleep_until(&self, deadline_ms: u64) -> impl Future<Output = ()> {
        embassy_time::Timer::at(embassy_time::Instant::from_millis(deadline_ms))
    }
}
