use std::io;

use anyhow::{Context, Result};
use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};

/// Raw mode plus alternate screen for the lifetime of the grid. Dropping
/// the guard restores the terminal even when the loop bails out early.
pub(super) struct TerminalSession {
    active: bool,
}

impl TerminalSession {
    pub(super) fn enter() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        execute!(io::stdout(), EnterAlternateScreen, Hide)
            .context("failed to enter alternate screen")?;
        Ok(Self { active: true })
    }

    pub(super) fn leave(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        disable_raw_mode().context("failed to disable raw mode")?;
        execute!(io::stdout(), Show, LeaveAlternateScreen)
            .context("failed to leave alternate screen")?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if self.active {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        }
    }
}
