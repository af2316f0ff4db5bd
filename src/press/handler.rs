//! Deferred press handler
//!
//! Runs in task context, one press at a time: flips the mode and then
//! blocks until the acknowledgement pattern has been shown. Presses that
//! arrive meanwhile coalesce in the queue.

use super::ack::AckLink;
use super::queue::PressQueue;
use crate::mode::{Mode, ModeFlags};

/// The single consumer of the press queue and the only writer of the mode
pub struct PressHandler<'a> {
    flags: &'a ModeFlags,
    queue: &'a PressQueue,
    ack: &'a AckLink,
}

impl<'a> PressHandler<'a> {
    pub fn new(flags: &'a ModeFlags, queue: &'a PressQueue, ack: &'a AckLink) -> Self {
        Self { flags, queue, ack }
    }

    /// Handle one press and return the mode it switched to.
    pub async fn process_next(&self) -> Mode {
        self.queue.next().await;

        let mode = self.flags.toggle();
        log::info!("Button press: {:?} indicator active", mode);

        self.ack.request();
        self.ack.finished().await;
        mode
    }

    /// Handle presses forever.
    pub async fn run(&self) -> ! {
        loop {
            self.process_next().await;
        }
    }
}
