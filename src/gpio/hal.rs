//! Polarity-aware adapters over embedded-hal pins
//!
//! On the device these wrap esp-hal's `Output` and `Input`; any other
//! embedded-hal 1.0 pin works the same way.

use super::traits::{Button, Indicator, LineStatus, Polarity};
use embedded_hal::digital::{InputPin, PinState, StatefulOutputPin};

/// Indicator on an output pin
pub struct HalIndicator<P> {
    pin: P,
    polarity: Polarity,
}

impl<P: StatefulOutputPin> HalIndicator<P> {
    /// Wrap a pin already configured as an output.
    pub fn new(pin: P, polarity: Polarity) -> Self {
        Self { pin, polarity }
    }

    /// Electrical level for an inactive indicator of the given polarity
    pub const fn inactive_level(polarity: Polarity) -> bool {
        polarity.level_for(false)
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: StatefulOutputPin> Indicator for HalIndicator<P> {
    fn set_active(&mut self, active: bool) {
        let level = PinState::from(self.polarity.level_for(active));
        let _ = self.pin.set_state(level);
    }

    fn toggle(&mut self) {
        let _ = self.pin.toggle();
    }

    fn is_active(&mut self) -> bool {
        match self.pin.is_set_high() {
            Ok(high) => self.polarity.is_active(high),
            Err(_) => false,
        }
    }
}

impl<P: StatefulOutputPin> LineStatus for HalIndicator<P> {
    /// Ready once the output latch reads back the inactive level it was
    /// configured with.
    fn is_ready(&mut self) -> bool {
        matches!(self.pin.is_set_high(), Ok(high) if !self.polarity.is_active(high))
    }
}

/// Button on an input pin
pub struct HalButton<P> {
    pin: P,
    polarity: Polarity,
}

impl<P: InputPin> HalButton<P> {
    pub fn new(pin: P, polarity: Polarity) -> Self {
        Self { pin, polarity }
    }

    /// Access the wrapped pin, e.g. to acknowledge its interrupt.
    pub fn pin_mut(&mut self) -> &mut P {
        &mut self.pin
    }
}

impl<P: InputPin> Button for HalButton<P> {
    fn is_pressed(&mut self) -> bool {
        match self.pin.is_high() {
            Ok(high) => self.polarity.is_active(high),
            Err(_) => false,
        }
    }
}

impl<P: InputPin> LineStatus for HalButton<P> {
    fn is_ready(&mut self) -> bool {
        self.pin.is_high().is_ok()
    }
}
