//! leaf - a terminal pager
//!
//! leaf shows text one screen at a time. When its output is not a terminal
//! it steps aside and copies its input straight through, so it is safe to
//! use as `$PAGER` in scripts.
//!
//! # Quick Start
//!
//! ```text
//! leaf file.txt              # Page a file
//! git log | leaf             # Page piped input
//! leaf file.txt > copy.txt   # Not a terminal: plain copy
//! LEAF="-wrap -quit-if-one-screen" leaf file.txt
//! ```
//!
//! # Keys
//!
//! | Key | Action |
//! |-----|--------|
//! | q / ESC | Quit |
//! | Up/Down, j/k | Scroll one line |
//! | PgUp/PgDn, Space, b | Scroll one screen |
//! | Home/End, g/G | First/last line |
//! | Left/Right | Scroll sideways |
//! | = | Toggle status bar |
//! | w | Toggle line wrapping |

mod app;
mod config;
mod core;
mod fault;
mod mode;
mod options;
mod pager;
mod report;
mod session;
mod style;
mod ui;
mod usage;

use std::io;
use std::process::ExitCode;

use crate::app::Invocation;
use crate::report::DiagnosticReport;

fn main() -> ExitCode {
    fault::install_panic_capture();

    let invocation = Invocation::from_env();
    let report = DiagnosticReport::new(invocation.lang.as_deref(), invocation.term.as_deref());

    fault::guard(&report, &mut io::stderr(), || app::run(&invocation, &report)).into()
}
