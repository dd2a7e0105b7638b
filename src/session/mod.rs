//! Paging session lifecycle.
//!
//! A session owns the screen and an in-memory log for as long as the pager
//! runs:
//!
//! ```text
//! NotStarted ──open──▶ ScreenActive ──pager returns or panics──▶ TornDown
//! ```
//!
//! Teardown always releases the screen first. Only after the terminal is
//! back in normal mode does anything else get printed: the retained view,
//! buffered log lines, or (further up) a panic report.

pub mod log_buffer;

use std::io::Write;
use std::panic::{self, AssertUnwindSafe};

use tracing::dispatcher::{self, DefaultGuard, Dispatch};
use tracing::{debug, error, Level};

use crate::app::Outcome;
use crate::pager::Pager;
use crate::report::DiagnosticReport;
use crate::ui::screen::Screen;

pub use log_buffer::LogBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    ScreenActive,
    TornDown,
}

pub struct Session<S: Screen> {
    screen: Option<S>,
    log: LogBuffer,
    dispatch: Dispatch,
    /// Routes this thread's logging into `log` while set
    log_scope: Option<DefaultGuard>,
    state: SessionState,
}

impl<S: Screen> Session<S> {
    pub fn new(level: Level) -> Self {
        let log = LogBuffer::new();
        let dispatch = Dispatch::new(log.subscriber(level));
        Self {
            screen: None,
            log,
            dispatch,
            log_scope: None,
            state: SessionState::NotStarted,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Take over the terminal.
    ///
    /// From here until [`Session::run`] returns, log output on this thread
    /// goes to the session buffer instead of the console. If `acquire`
    /// fails, console logging is restored.
    pub fn open<F, E>(&mut self, acquire: F) -> Result<(), E>
    where
        F: FnOnce() -> Result<S, E>,
    {
        debug_assert_eq!(self.state, SessionState::NotStarted);
        let scope = dispatcher::set_default(&self.dispatch);
        let screen = acquire()?;
        self.screen = Some(screen);
        self.log_scope = Some(scope);
        self.state = SessionState::ScreenActive;
        Ok(())
    }

    /// Release the screen. Does nothing if it was already released.
    fn tear_down(&mut self) {
        if let Some(screen) = self.screen.as_mut() {
            screen.close();
        }
        self.screen = None;
        self.state = SessionState::TornDown;
    }

    /// Run `pager` on the screen, then tear down.
    ///
    /// Threads the pager starts log to the session buffer as well.
    ///
    /// A panic from the pager is re-raised once the screen has been
    /// released. Otherwise, if anything was logged during the session, the
    /// report and the log lines go to `stderr` and the run counts as failed.
    pub fn run<P: Pager + ?Sized>(
        mut self,
        pager: &mut P,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
        report: &DiagnosticReport,
    ) -> Outcome {
        let result = panic::catch_unwind(AssertUnwindSafe(|| match self.screen.as_mut() {
            Some(screen) => pager.start_paging(screen),
            None => Err(anyhow::anyhow!("Paging started without a screen")),
        }));

        // Restore the terminal before anything gets printed
        self.tear_down();

        let result = match result {
            Ok(result) => result,
            Err(payload) => {
                self.log_scope = None;
                panic::resume_unwind(payload);
            }
        };
        if let Err(e) = result {
            error!("Paging failed: {:#}", e);
        }

        if !pager.clears_on_exit() {
            if let Err(e) = pager.reprint_after_exit(stdout) {
                error!("Failed reprinting pager view after exit: {}", e);
            }
        }

        // Back to console logging
        self.log_scope = None;

        if self.log.is_empty() {
            debug!("Session ended cleanly");
            return Outcome::Success;
        }

        let _ = write!(stderr, "{}", report);
        let _ = write!(stderr, "{}", self.log.contents());
        let _ = stderr.flush();
        Outcome::Failure
    }
}

impl<S: Screen> Drop for Session<S> {
    fn drop(&mut self) {
        self.tear_down();
        self.log_scope = None;
    }
}
