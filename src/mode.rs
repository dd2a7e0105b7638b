//! Startup mode selection.
//!
//! | stdin redirected | stdout redirected | filename | mode                 |
//! |------------------|-------------------|----------|----------------------|
//! | any              | yes               | yes      | copy file to stdout  |
//! | yes              | yes               | no       | copy stdin to stdout |
//! | no               | any               | no       | error: no input      |
//! | any              | no                | any      | interactive paging   |
//!
//! When stdout is redirected a given filename beats redirected stdin, which
//! is what `less` does.

use std::fs::File;
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModeError {
    #[error("Filename or input pipe required")]
    NoInputSource,

    #[error("Expected exactly one filename, or data piped from stdin, got: {0:?}")]
    TooManyFiles(Vec<String>),
}

/// Where stdin and stdout go, and what file was asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    pub stdin_redirected: bool,
    pub stdout_redirected: bool,
    pub filename: Option<PathBuf>,
}

impl Topology {
    /// Snapshot the process's own streams
    pub fn detect(files: &[String]) -> Result<Self, ModeError> {
        Ok(Self {
            stdin_redirected: !io::stdin().is_terminal(),
            stdout_redirected: !io::stdout().is_terminal(),
            filename: single_filename(files)?,
        })
    }
}

pub fn single_filename(files: &[String]) -> Result<Option<PathBuf>, ModeError> {
    match files {
        [] => Ok(None),
        [name] => Ok(Some(PathBuf::from(name))),
        _ => Err(ModeError::TooManyFiles(files.to_vec())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    CopyFileToStdout,
    CopyStdinToStdout,
    InteractivePaging,
}

impl Mode {
    pub fn select(topology: &Topology) -> Result<Mode, ModeError> {
        let has_file = topology.filename.is_some();

        if !has_file && !topology.stdin_redirected {
            return Err(ModeError::NoInputSource);
        }

        let mode = if topology.stdout_redirected {
            if has_file {
                Mode::CopyFileToStdout
            } else {
                Mode::CopyStdinToStdout
            }
        } else {
            Mode::InteractivePaging
        };

        debug!(?topology, ?mode, "Selected startup mode");
        Ok(mode)
    }
}

/// Copy everything from `input` to `output`
pub fn pump<R: Read + ?Sized, W: Write + ?Sized>(input: &mut R, output: &mut W) -> io::Result<u64> {
    let copied = io::copy(input, output)?;
    output.flush()?;
    Ok(copied)
}

pub fn copy_file<W: Write + ?Sized>(path: &Path, output: &mut W) -> Result<u64> {
    let mut file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    pump(&mut file, output).with_context(|| format!("Failed to copy {} to stdout", path.display()))
}

pub fn copy_stdin<R: Read + ?Sized, W: Write + ?Sized>(input: &mut R, output: &mut W) -> Result<u64> {
    pump(input, output).context("Failed to copy stdin to stdout")
}
