//! Indicator and button traits for abstraction and testability
//!
//! These traits define the only GPIO operations the controller performs
//! after startup, allowing esp-hal pins to be swapped with mocks for testing.

/// The five hardware lines of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Line {
    /// Always-on indicator, short period
    Green,
    /// Always-on indicator that also shows the press acknowledgement
    AckGreen,
    /// Gated by `ModeFlag::RedActive`
    Red,
    /// Gated by `ModeFlag::BlueActive`
    Blue,
    /// Push button input
    Button,
}

impl Line {
    /// All lines in the order they are checked at startup
    pub const ALL: [Line; 5] = [Line::Green, Line::AckGreen, Line::Red, Line::Blue, Line::Button];
}

/// Electrical level that means "on" / "pressed"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    ActiveHigh,
    ActiveLow,
}

impl Polarity {
    /// Whether a line at the given electrical level is active
    pub const fn is_active(self, high: bool) -> bool {
        match self {
            Polarity::ActiveHigh => high,
            Polarity::ActiveLow => !high,
        }
    }

    /// Electrical level that drives a line to the given logical state
    pub const fn level_for(self, active: bool) -> bool {
        self.is_active(active)
    }
}

/// An output line driven by exactly one task
pub trait Indicator {
    fn set_active(&mut self, active: bool);

    fn toggle(&mut self);

    fn is_active(&mut self) -> bool;
}

/// The push button input
pub trait Button {
    fn is_pressed(&mut self) -> bool;
}

/// Startup readiness of a hardware line
pub trait LineStatus {
    fn is_ready(&mut self) -> bool;
}
