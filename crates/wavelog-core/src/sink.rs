//! Line-oriented output sink
//!
//! Each acquisition ends up as one line of text. [`LogSink`] appends it to a
//! file when a path is configured and prints it to stdout otherwise; every call
//! opens and closes the file on its own, so nothing is buffered between calls.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;

// ----------------------------------------------------------------------------
// Sink Trait
// ----------------------------------------------------------------------------

/// Destination for single lines of UTF-8 output
pub trait LineSink: Send + Sync {
    /// Write `line` followed by a newline
    fn write_line(&self, line: &str) -> io::Result<()>;
}

// ----------------------------------------------------------------------------
// File / Stdout Sink
// ----------------------------------------------------------------------------

/// Appends lines to a file, or prints them when no file is configured
#[derive(Debug, Clone, Default)]
pub struct LogSink {
    path: Option<PathBuf>,
}

impl LogSink {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Sink that always writes to stdout
    pub fn stdout() -> Self {
        Self { path: None }
    }

    /// Sink that appends to `path`
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    fn append(path: &Path, line: &str) -> io::Result<()> {
        let mut options = OpenOptions::new();
        options.append(true).create(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(path)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
        file.flush()?;
        file.sync_all()?;
        debug!("Appended {} bytes to {}", line.len() + 1, path.display());
        Ok(())
    }
}

impl LineSink for LogSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        match &self.path {
            Some(path) => Self::append(path, line),
            None => {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                handle.write_all(line.as_bytes())?;
                handle.write_all(b"\n")?;
                handle.flush()
            }
        }
    }
}

// ----------------------------------------------------------------------------
// In-Memory Sink
// ----------------------------------------------------------------------------

/// Collects lines in memory; clones share the same buffer
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }
}

impl LineSink for MemorySink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut lines = self
            .lines
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "memory sink poisoned"))?;
        lines.push(line.to_string());
        Ok(())
    }
}
