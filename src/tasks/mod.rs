//! Embassy tasks module
//!
//! Async loops around the time-free state machines of the library. The
//! blink loop is generic over its [`Clock`] so host tests can run it; the
//! rest need the embassy timer driver, only available with the embedded
//! feature. The `#[embassy_executor::task]` wrappers live in `main.rs`.

pub mod blink;
pub mod clock;
#[cfg(feature = "embedded")]
pub mod load;
#[cfg(feature = "embedded")]
pub mod press;
#[cfg(feature = "embedded")]
pub mod status;

pub use blink::run_blinker;
pub use clock::Clock;

#[cfg(feature = "embedded")]
pub use blink::blink_task;
#[cfg(feature = "embedded")]
pub use clock::EmbassyClock;
#[cfg(feature = "embedded")]
pub use load::load_task;
#[cfg(feature = "embedded")]
pub use press::press_task;
#[cfg(feature = "embedded")]
pub use status::status_task;
