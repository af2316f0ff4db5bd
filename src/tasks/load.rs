//! Load task

use crate::load::LoadProfile;
use embassy_time::{block_for, Duration, Timer};

/// Busy-wait and sleep forever. Never touches shared state.
pub async fn load_task(profile: LoadProfile) -> ! {
    log::info!(
        "Load task started: {} us busy / {} ms sleep ({}% duty)",
        profile.busy_us,
        profile.sleep_ms,
        profile.duty_percent()
    );

    loop {
        block_for(Duration::from_micros(profile.busy_us));
        Timer::after(Duration::from_millis(profile.sleep_ms)).await;
    }
}
