//! Blink task
//!
//! Sleeps for whatever each blinker step asks, against absolute deadlines
//! so the cycle never drifts. The acknowledging blinker also wakes early
//! when the press handler requests the acknowledgement, and hands the
//! unslept part of its wait back to the blinker.

use super::clock::Clock;
use crate::blink::Blinker;
use crate::gpio::Indicator;
use crate::mode::ModeFlags;
use crate::press::AckLink;
use embassy_futures::select::{select, Either};

/// Drive one indicator forever on the given clock.
pub async fn run_blinker<I: Indicator, C: Clock>(
    mut blinker: Blinker<I>,
    flags: &ModeFlags,
    ack: &AckLink,
    clock: &C,
) -> ! {
    let config = *blinker.config();
    log::info!(
        "{:?} blink task started: {} ms period, gate {:?}",
        config.line,
        config.period_ms,
        config.gate
    );

    let mut deadline = clock.now_ms();
    loop {
        let step = blinker.step(flags);
        if step.ack_finished {
            ack.complete();
        }
        deadline += u64::from(step.wait_ms);

        if !config.serves_ack {
            clock.sleep_until(deadline).await;
            continue;
        }

        if let Either::Second(()) = select(clock.sleep_until(deadline), ack.requested()).await {
            let now = clock.now_ms();
            let unslept = u32::try_from(deadline.saturating_sub(now)).unwrap_or(step.wait_ms);
            blinker.begin_ack(unslept);
            deadline = now;
        }
    }
}

/// [`run_blinker`] on the embassy timer
#[cfg(feature = "embedded")]
pub async fn blink_task<I: Indicator>(
    blinker: Blinker<I>,
    flags: &'static ModeFlags,
    ack: &'static AckLink,
) -> ! {
    run_blinker(blinker, flags, ack, &super::clock::EmbassyClock).await
}
