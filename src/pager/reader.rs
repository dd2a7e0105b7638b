//! Line source for the pager.
//!
//! Lines are read on a background thread so the first screen can be shown
//! before a slow pipe has finished.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use tracing::{debug, error};

use crate::style::HighlightStyle;

#[derive(Default)]
struct Lines {
    lines: Vec<String>,
    done: bool,
}

pub struct Reader {
    name: Option<String>,
    style: HighlightStyle,
    source: Option<Box<dyn Read + Send>>,
    lines: Arc<Mutex<Lines>>,
    worker: Option<JoinHandle<()>>,
}

impl Reader {
    /// Read from a stream, typically stdin
    pub fn from_stream<R: Read + Send + 'static>(name: Option<&str>, stream: R) -> Self {
        Self {
            name: name.map(str::to_string),
            style: HighlightStyle::default(),
            source: Some(Box::new(stream)),
            lines: Arc::default(),
            worker: None,
        }
    }

    /// Read a file, shown with `style`
    pub fn from_file(path: &Path, style: HighlightStyle) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned());

        Ok(Self {
            name,
            style,
            source: Some(Box::new(file)),
            lines: Arc::default(),
            worker: None,
        })
    }

    /// Start reading. Logging from the reader thread goes wherever the
    /// caller's logging goes.
    pub fn start(&mut self) {
        let Some(source) = self.source.take() else {
            return;
        };

        let lines = Arc::clone(&self.lines);
        let dispatch = tracing::dispatcher::get_default(|d| d.clone());
        let worker = thread::Builder::new()
            .name("reader".to_string())
            .spawn(move || {
                tracing::dispatcher::with_default(&dispatch, || read_lines(source, &lines));
            });

        match worker {
            Ok(handle) => self.worker = Some(handle),
            Err(e) => {
                error!("Failed to start reader thread: {}", e);
                self.lock().done = true;
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Lines> {
        self.lines.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn style(&self) -> &HighlightStyle {
        &self.style
    }

    pub fn line_count(&self) -> usize {
        self.lock().lines.len()
    }

    /// True once the whole input has been read
    pub fn is_done(&self) -> bool {
        self.lock().done
    }

    /// Up to `count` lines starting at `first`
    pub fn lines(&self, first: usize, count: usize) -> Vec<String> {
        let guard = self.lock();
        guard.lines.iter().skip(first).take(count).cloned().collect()
    }

    /// Block until everything has been read
    pub fn wait(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn read_lines(source: Box<dyn Read + Send>, lines: &Mutex<Lines>) {
    let mut reader = BufReader::new(source);
    let mut raw = Vec::new();

    loop {
        raw.clear();
        match reader.read_until(b'\n', &mut raw) {
            Ok(0) => break,
            Ok(_) => {
                if raw.last() == Some(&b'\n') {
                    raw.pop();
                    if raw.last() == Some(&b'\r') {
                        raw.pop();
                    }
                }
                let line = String::from_utf8_lossy(&raw).into_owned();
                let mut guard = lines.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                guard.lines.push(line);
            }
            Err(e) => {
                error!("Reading input failed: {}", e);
                break;
            }
        }
    }

    let mut guard = lines.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.done = true;
    debug!("Done reading, {} lines", guard.lines.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_stream_lines() {
        let mut reader = Reader::from_stream(None, Cursor::new(b"one\r\ntwo\n\nthree".to_vec()));
        assert_eq!(reader.line_count(), 0);
        reader.start();
        reader.wait();

        assert!(reader.is_done());
        assert_eq!(reader.line_count(), 4);
        assert_eq!(reader.lines(0, 10), ["one", "two", "", "three"]);
        assert_eq!(reader.lines(1, 1), ["two"]);
        assert!(reader.lines(9, 1).is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut reader = Reader::from_stream(None, Cursor::new(vec![b'a', 0xff, b'\n']));
        reader.start();
        reader.wait();
        assert_eq!(reader.lines(0, 1), ["a\u{fffd}"]);
    }

    #[test]
    fn test_missing_file() {
        let err = Reader::from_file(Path::new("/no/such/file"), HighlightStyle::native())
            .err()
            .unwrap();
        assert!(err.to_string().contains("/no/such/file"));
    }
}
