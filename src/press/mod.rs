//! Button press pipeline
//!
//! Edge interrupt -> [`Debouncer`] -> [`PressQueue`] -> [`PressHandler`].
//! The first two run in interrupt context; the handler runs as a task.

pub mod ack;
pub mod debounce;
pub mod handler;
pub mod queue;

pub use ack::{AckLink, ACK_LINK, ACK_PATTERN};
pub use debounce::{Debouncer, EdgeOutcome};
pub use handler::PressHandler;
pub use queue::{PressEvent, PressQueue, PRESS_QUEUE};
