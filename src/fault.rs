//! Outermost panic barrier.
//!
//! The default panic hook prints immediately, which would land on a raw
//! alternate screen if the pager panics. Instead the hook installed here only
//! records the message. [`guard`] prints it, after the bug report header and
//! after every inner layer has restored the terminal, then keeps unwinding so
//! the process still dies with a non-zero status.

use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Mutex;
use std::thread;

use crate::app::Outcome;
use crate::report::DiagnosticReport;

static PANIC_MESSAGES: Mutex<Vec<String>> = Mutex::new(Vec::new());

/// Replace the panic hook with one that records instead of printing
pub fn install_panic_capture() {
    panic::set_hook(Box::new(|info| {
        let thread = thread::current();
        let message = format!("thread '{}' {}", thread.name().unwrap_or("<unnamed>"), info);
        let mut messages = PANIC_MESSAGES
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        messages.push(message);
    }));
}

fn take_panic_messages() -> Vec<String> {
    let mut messages = PANIC_MESSAGES
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    std::mem::take(&mut *messages)
}

/// Run `f`; if it panics, print the report and the panic, then re-raise
pub fn guard<F>(report: &DiagnosticReport, stderr: &mut dyn Write, f: F) -> Outcome
where
    F: FnOnce() -> Outcome,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let _ = write!(stderr, "{}", report);
            for message in take_panic_messages() {
                let _ = writeln!(stderr, "{}", message);
            }
            let _ = stderr.flush();
            panic::resume_unwind(payload)
        }
    }
}
