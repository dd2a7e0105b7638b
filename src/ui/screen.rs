//! Terminal screen using crossterm
//!
//! Owns raw mode and the alternate screen for as long as a paging session
//! runs.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event},
    execute, queue,
    style::{Attribute, ResetColor, SetAttribute},
    terminal::{
        self, Clear, ClearType, DisableLineWrap, EnableLineWrap, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use tracing::debug;

use crate::core::cell::{write_cells, Cell};
use crate::style::ColorDepth;

/// Exclusive handle on the terminal
pub trait Screen {
    /// (columns, rows)
    fn size(&self) -> io::Result<(u16, u16)>;

    /// Replace the whole screen with `rows`
    fn draw(&mut self, rows: &[Vec<Cell>], depth: ColorDepth) -> io::Result<()>;

    /// Wait up to `timeout` for the next input event
    fn poll_event(&mut self, timeout: Duration) -> io::Result<Option<Event>>;

    /// Give the terminal back in its normal state. Safe to call twice.
    fn close(&mut self);
}

pub struct TerminalScreen {
    active: bool,
}

impl TerminalScreen {
    /// Switch the terminal to raw mode on the alternate screen
    pub fn open() -> io::Result<Self> {
        terminal::enable_raw_mode()?;

        // From here on Drop puts the terminal back if anything below fails
        let screen = Self { active: true };

        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            DisableLineWrap,
            Hide,
            Clear(ClearType::All),
            MoveTo(0, 0)
        )?;

        debug!("Screen opened");
        Ok(screen)
    }

    fn restore(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout();

        // Reset all attributes first
        let _ = execute!(stdout, ResetColor, SetAttribute(Attribute::Reset));
        let _ = execute!(stdout, Show);
        let _ = execute!(stdout, EnableLineWrap);
        let _ = execute!(stdout, LeaveAlternateScreen);
        let _ = stdout.flush();

        // Disable raw mode - this is the most important part
        terminal::disable_raw_mode()
    }
}

impl Screen for TerminalScreen {
    fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    fn draw(&mut self, rows: &[Vec<Cell>], depth: ColorDepth) -> io::Result<()> {
        let stdout = io::stdout();
        let mut stdout = io::BufWriter::with_capacity(65536, stdout.lock());

        // Begin synchronized update (reduces flicker)
        write!(stdout, "\x1b[?2026h")?;
        for (row, cells) in rows.iter().enumerate() {
            queue!(stdout, MoveTo(0, row as u16))?;
            write_cells(&mut stdout, cells, depth)?;
            queue!(stdout, Clear(ClearType::UntilNewLine))?;
        }
        if let Ok((_, height)) = terminal::size() {
            for row in rows.len()..height as usize {
                queue!(stdout, MoveTo(0, row as u16), Clear(ClearType::CurrentLine))?;
            }
        }
        // End synchronized update
        write!(stdout, "\x1b[?2026l")?;

        stdout.flush()
    }

    fn poll_event(&mut self, timeout: Duration) -> io::Result<Option<Event>> {
        if event::poll(timeout)? {
            return event::read().map(Some);
        }
        Ok(None)
    }

    fn close(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;

        // Nothing useful can be done about a failure here, the screen is
        // going away either way
        let _ = self.restore();
        debug!("Screen closed");
    }
}

impl Drop for TerminalScreen {
    fn drop(&mut self) {
        self.close();
    }
}
