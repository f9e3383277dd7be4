//! In-memory log capture for TUI display
//!
//! In TUI mode the tracing subscriber writes into this ring buffer
//! instead of stdout, and the log pane renders the tail of it.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::Arc;

/// Maximum number of log lines kept in memory
const MAX_LOG_LINES: usize = 1000;

/// Shared log buffer accessible by both the tracing subscriber and the TUI
#[derive(Clone)]
pub struct LogBuffer {
    lines: Arc<Mutex<VecDeque<String>>>,
}

impl LogBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(MAX_LOG_LINES))),
        }
    }

    /// Append a line, evicting the oldest at capacity.
    pub fn push(&self, line: String) {
        let mut lines = self.lines.lock();
        if lines.len() >= MAX_LOG_LINES {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    /// The most recent `count` lines, oldest first.
    #[must_use]
    pub fn recent_lines(&self, count: usize) -> Vec<String> {
        let lines = self.lines.lock();
        lines.iter().rev().take(count).rev().cloned().collect()
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Writer that splits tracing output into buffer lines
pub struct LogWriter {
    buffer: LogBuffer,
    pending: String,
}

impl LogWriter {
    #[must_use]
    pub fn new(buffer: LogBuffer) -> Self {
        Self {
            buffer,
            pending: String::with_capacity(256),
        }
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        for c in text.chars() {
            if c == '\n' {
                if !self.pending.is_empty() {
                    self.buffer.push(std::mem::take(&mut self.pending));
                }
            } else {
                self.pending.push(c);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            self.buffer.push(std::mem::take(&mut self.pending));
        }
        Ok(())
    }
}

/// MakeWriter implementation for tracing_subscriber
pub struct LogMakeWriter {
    buffer: LogBuffer,
}

impl LogMakeWriter {
    #[must_use]
    pub fn new(buffer: LogBuffer) -> Self {
        Self { buffer }
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogMakeWriter {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter::new(self.buffer.clone())
    }
}
