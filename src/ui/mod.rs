//! Terminal access.
//!
//! - **screen**: the [`screen::Screen`] trait the pager draws on, and the
//!   crossterm backed [`screen::TerminalScreen`] that owns raw mode and the
//!   alternate screen

pub mod screen;
