//! Press worker task
//!
//! The only consumer of the press queue.

use crate::press::PressHandler;

pub async fn press_task(handler: PressHandler<'static>) -> ! {
    log::info!("Press worker started");
    handler.run().await
}
