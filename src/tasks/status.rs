//! Idle loop
//!
//! Everything happens in the other tasks and the button interrupt; this
//! one only reports the current mode.

use crate::config::timing::STATUS_INTERVAL_MS;
use crate::mode::ModeFlags;
use embassy_time::{Duration, Instant, Ticker};

pub async fn status_task(flags: &'static ModeFlags) -> ! {
    let mut ticker = Ticker::every(Duration::from_millis(STATUS_INTERVAL_MS));
    loop {
        ticker.next().await;
        log::debug!(
            "Status: {:?} mode, uptime {} ms",
            flags.mode(),
            Instant::now().as_millis()
        );
    }
}
