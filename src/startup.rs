//! Startup wiring
//!
//! Verifies the hardware lines, restores the power-up mode and hands each
//! indicator to exactly one blink task. Nothing is spawned if a line is
//! not ready.

use crate::blink::Blinker;
use crate::config::BLINKERS;
use crate::gpio::{Button, Indicator, Line, LineStatus};
use crate::mode::ModeFlags;

/// Errors that abort startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupError {
    /// The line failed its readiness check
    LineNotReady(Line),
}

/// The five configured hardware lines
pub struct Board<I, B> {
    pub green: I,
    pub ack_green: I,
    pub red: I,
    pub blue: I,
    pub button: B,
}

/// Everything the tasks need once startup succeeded
pub struct Parts<I, B> {
    /// One blinker per entry of `config::BLINKERS`, same order
    pub blinkers: [Blinker<I>; 4],
    pub button: B,
}

impl<I, B> Board<I, B>
where
    I: Indicator + LineStatus,
    B: Button + LineStatus,
{
    fn status_mut(&mut self, line: Line) -> &mut dyn LineStatus {
        match line {
            Line::Green => &mut self.green,
            Line::AckGreen => &mut self.ack_green,
            Line::Red => &mut self.red,
            Line::Blue => &mut self.blue,
            Line::Button => &mut self.button,
        }
    }

    /// Check every line, failing on the first one that is not ready.
    pub fn verify_ready(&mut self) -> Result<(), StartupError> {
        for line in Line::ALL {
            if !self.status_mut(line).is_ready() {
                return Err(StartupError::LineNotReady(line));
            }
        }
        Ok(())
    }

    /// Move each indicator into its blinker.
    pub fn into_parts(self) -> Parts<I, B> {
        let Board {
            green,
            ack_green,
            red,
            blue,
            button,
        } = self;
        let [green_cfg, ack_cfg, red_cfg, blue_cfg] = BLINKERS;

        Parts {
            blinkers: [
                Blinker::new(green_cfg, green),
                Blinker::new(ack_cfg, ack_green),
                Blinker::new(red_cfg, red),
                Blinker::new(blue_cfg, blue),
            ],
            button,
        }
    }
}

/// Verify the board, reset the mode to its power-up value and build the
/// blinkers.
pub fn bring_up<I, B>(mut board: Board<I, B>, flags: &ModeFlags) -> Result<Parts<I, B>, StartupError>
where
    I: Indicator + LineStatus,
    B: Button + LineStatus,
{
    board.verify_ready()?;
    flags.reset();
    log::info!("All lines ready, starting in {:?} mode", flags.mode());
    Ok(board.into_parts())
}
