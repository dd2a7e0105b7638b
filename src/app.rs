//! Startup: resolve options, pick a mode, then pump bytes or page.

use std::env;
use std::io::{self, Write};
use std::process::ExitCode;

use tracing::{debug, error, Level};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::FmtSubscriber;

use crate::config::{Config, Options, OPTIONS_ENV};
use crate::mode::{self, Mode, ModeError, Topology};
use crate::options::OptionError;
use crate::pager::{LinePager, Reader};
use crate::report::{DiagnosticReport, VERSION};
use crate::session::Session;
use crate::ui::screen::TerminalScreen;
use crate::usage::write_usage;

/// How the run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::Failure => ExitCode::from(1),
        }
    }
}

/// Everything read from the process environment, captured once
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// argv[0]
    pub program: String,
    /// argv[1..]
    pub args: Vec<String>,
    /// `$LEAF`
    pub env_options: Option<String>,
    pub term: Option<String>,
    pub lang: Option<String>,
    pub pager: Option<String>,
}

impl Invocation {
    pub fn from_env() -> Self {
        let mut argv = env::args_os().map(|a| a.to_string_lossy().into_owned());
        let var = |name: &str| env::var_os(name).map(|v| v.to_string_lossy().into_owned());

        Self {
            program: argv.next().unwrap_or_else(|| "leaf".to_string()),
            args: argv.collect(),
            env_options: var(OPTIONS_ENV),
            term: var("TERM"),
            lang: var("LANG"),
            pager: var("PAGER"),
        }
    }
}

fn print_error(
    err: &mut dyn Write,
    message: &str,
    invocation: &Invocation,
    options: &Options,
) {
    let _ = writeln!(err, "ERROR: \x1b[1m{}\x1b[m", message);
    let _ = writeln!(err);
    let _ = write_usage(err, invocation, options, true);
}

/// Parse options from both sources.
///
/// `Err` carries the outcome to exit with after help or an error has
/// already been printed.
pub fn resolve_config(
    invocation: &Invocation,
    options: &Options,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<Config, Outcome> {
    match options.resolve(invocation.env_options.as_deref(), &invocation.args) {
        Ok(config) => Ok(config),
        Err(OptionError::HelpRequested) => {
            let _ = write_usage(out, invocation, options, false);
            Err(Outcome::Success)
        }
        Err(e) => {
            print_error(err, &e.to_string(), invocation, options);
            Err(Outcome::Failure)
        }
    }
}

fn console_subscriber<W>(level: Level, writer: W) -> impl tracing::Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(writer)
        .with_ansi(false)
        .finish()
}

/// Console logging for everything outside a paging session
fn init_logging(level: Level) {
    let _ = tracing::subscriber::set_global_default(console_subscriber(level, io::stderr));
}

pub fn run(invocation: &Invocation, report: &DiagnosticReport) -> Outcome {
    let options = Options::new(invocation.term.as_deref());

    // The level isn't known until the options are parsed
    let early_log = console_subscriber(Level::INFO, io::stderr);
    let resolved = tracing::subscriber::with_default(early_log, || {
        resolve_config(invocation, &options, &mut io::stdout(), &mut io::stderr())
    });
    let config = match resolved {
        Ok(config) => config,
        Err(outcome) => return outcome,
    };

    if config.print_version {
        println!("{}", VERSION);
        return Outcome::Success;
    }

    init_logging(config.log_level());

    let selected = Topology::detect(&config.files)
        .and_then(|topology| Mode::select(&topology).map(|mode| (topology, mode)));
    let (topology, mode) = match selected {
        Ok(selected) => selected,
        Err(e) => {
            print_error(&mut io::stderr(), &e.to_string(), invocation, &options);
            return Outcome::Failure;
        }
    };

    match mode {
        Mode::CopyFileToStdout => {
            let Some(path) = topology.filename.as_deref() else {
                error!("{}", ModeError::NoInputSource);
                return Outcome::Failure;
            };
            copy_result(mode::copy_file(path, &mut io::stdout().lock()))
        }
        Mode::CopyStdinToStdout => {
            copy_result(mode::copy_stdin(&mut io::stdin().lock(), &mut io::stdout().lock()))
        }
        Mode::InteractivePaging => page(&config, &topology, report),
    }
}

fn copy_result(result: anyhow::Result<u64>) -> Outcome {
    match result {
        Ok(_) => Outcome::Success,
        Err(e) => {
            error!("{:#}", e);
            Outcome::Failure
        }
    }
}

fn page(config: &Config, topology: &Topology, report: &DiagnosticReport) -> Outcome {
    let reader = match &topology.filename {
        Some(path) => match Reader::from_file(path, config.style.clone()) {
            Ok(reader) => reader,
            Err(e) => {
                eprintln!("ERROR: {:#}", e);
                return Outcome::Failure;
            }
        },
        None => Reader::from_stream(None, io::stdin()),
    };

    let mut pager = LinePager::new(reader, config);
    let mut session = Session::new(config.log_level());
    if let Err(e) = session.open(TerminalScreen::open) {
        error!("Failed to take over the terminal: {}", e);
        return Outcome::Failure;
    }
    // Buffered by the session from here on
    debug!("Paging with {} colors", config.colors.label());

    session.run(&mut pager, &mut io::stdout(), &mut io::stderr(), report)
}
