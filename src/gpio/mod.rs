pub mod hal;
pub mod traits;

pub use hal::{HalButton, HalIndicator};
pub use traits::{Button, Indicator, Line, LineStatus, Polarity};
