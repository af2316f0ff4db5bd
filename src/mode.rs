//! Shared mode flags
//!
//! The red and blue indicators share one blink slot. Which of the two owns
//! it is held in a single atomic byte, so the two flags derived from it can
//! never be observed both set or both clear.

use core::sync::atomic::{AtomicU8, Ordering};

/// Which gated indicator currently owns the blink slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Mode {
    Red = 0,
    Blue = 1,
}

impl Mode {
    /// Mode at power-up
    pub const DEFAULT: Mode = Mode::Red;

    /// The other mode of the pair
    pub const fn flipped(self) -> Mode {
        match self {
            Mode::Red => Mode::Blue,
            Mode::Blue => Mode::Red,
        }
    }

    const fn from_raw(raw: u8) -> Mode {
        // Only 0 and 1 are ever stored.
        if raw & 1 == 0 {
            Mode::Red
        } else {
            Mode::Blue
        }
    }
}

/// Named view of the mode, read by a gated blink task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeFlag {
    RedActive,
    BlueActive,
}

impl ModeFlag {
    /// Mode in which this flag reads true
    pub const fn mode(self) -> Mode {
        match self {
            ModeFlag::RedActive => Mode::Red,
            ModeFlag::BlueActive => Mode::Blue,
        }
    }
}

/// Process-wide mode state.
///
/// Written only by the press handler, read by the gated blink tasks.
pub struct ModeFlags {
    mode: AtomicU8,
}

/// The single instance shared with every task by `&'static` reference
pub static MODE_FLAGS: ModeFlags = ModeFlags::new(Mode::DEFAULT);

impl ModeFlags {
    pub const fn new(initial: Mode) -> Self {
        Self {
            mode: AtomicU8::new(initial as u8),
        }
    }

    /// Restore the power-up mode. Called once before any task is spawned.
    pub fn reset(&self) {
        self.mode.store(Mode::DEFAULT as u8, Ordering::Release);
    }

    pub fn mode(&self) -> Mode {
        Mode::from_raw(self.mode.load(Ordering::Acquire))
    }

    pub fn is_active(&self, flag: ModeFlag) -> bool {
        self.mode() == flag.mode()
    }

    pub fn red_active(&self) -> bool {
        self.is_active(ModeFlag::RedActive)
    }

    pub fn blue_active(&self) -> bool {
        self.is_active(ModeFlag::BlueActive)
    }

    /// Hand the blink slot to the other indicator in one atomic step.
    ///
    /// Returns the new mode.
    pub fn toggle(&self) -> Mode {
        let previous = self.mode.fetch_xor(1, Ordering::AcqRel);
        Mode::from_raw(previous).flipped()
    }
}

impl Default for ModeFlags {
    fn default() -> Self {
        Self::new(Mode::DEFAULT)
    }
}
