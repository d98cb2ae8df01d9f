//! Diagnostics produced while loading a table.
//!
//! Every message goes to a [`DiagnosticSink`] the moment it is produced and
//! is also accumulated in the [`DiagnosticsLog`] text buffer for a bulk flush
//! to a log file at the end of a load cycle. The buffer has a fixed capacity;
//! messages that do not fit are dropped from the buffer but still reach the
//! sink.
//!
//! # Message format
//!
//! ```text
//! WARNING: Line 3: Duplicate rule for output channel 20
//! ERROR: map.csv exceeds specified maximum size (4096 bytes)
//! Mapping channel 10 --> 20
//! ```

mod sink;

pub use sink::{DiagnosticSink, LogSink, MemorySink, WriterSink};

use std::fmt;
use std::path::Path;

use crate::error::{LutError, Result};

/// Default capacity of the accumulated log text, in bytes.
pub const DEFAULT_LOG_CAPACITY: usize = 1024;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Info => "INFO",
        };
        f.write_str(label)
    }
}

/// What a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Tabular source larger than the size cap
    OversizeInput,
    /// Output spec does not start with a digit
    InvalidOutputChannel,
    UnexpectedSymbol,
    UnexpectedComma,
    UnexpectedAt,
    /// Nothing usable after '@'
    MissingConstant,
    ConstantOutOfBounds,
    InputChannelOutOfBounds,
    OutputChannelOutOfBounds,
    /// A ranged directive would run past channel 512
    RangeExceedsChannels,
    /// Stream ended where more tokens were required
    UnexpectedEof,
    /// A rule overwrote an earlier rule for the same output
    DuplicateRule,
    /// The map file could not be opened
    SourceUnavailable,
    /// Confirmation of an applied rule
    Applied,
}

impl DiagnosticKind {
    /// Severity this kind is reported with.
    pub fn severity(self) -> Severity {
        match self {
            Self::ConstantOutOfBounds
            | Self::InputChannelOutOfBounds
            | Self::OutputChannelOutOfBounds
            | Self::RangeExceedsChannels
            | Self::DuplicateRule
            | Self::SourceUnavailable => Severity::Warning,
            Self::Applied => Severity::Info,
            Self::OversizeInput
            | Self::InvalidOutputChannel
            | Self::UnexpectedSymbol
            | Self::UnexpectedComma
            | Self::UnexpectedAt
            | Self::MissingConstant
            | Self::UnexpectedEof => Severity::Error,
        }
    }
}

/// A single diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    /// 1-based source line, if the message has line context
    pub line: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic with the kind's default severity.
    pub fn new(kind: DiagnosticKind, line: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            line: line.filter(|&n| n > 0),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.severity, self.line) {
            (Severity::Info, _) => f.write_str(&self.message),
            (severity, Some(line)) => write!(f, "{}: Line {}: {}", severity, line, self.message),
            (severity, None) => write!(f, "{}: {}", severity, self.message),
        }
    }
}

/// Accumulated diagnostics for one load cycle.
pub struct DiagnosticsLog<S = LogSink> {
    sink: S,
    entries: Vec<Diagnostic>,
    text: String,
    capacity: usize,
}

impl<S: DiagnosticSink> DiagnosticsLog<S> {
    /// Create a log with the default capacity.
    pub fn new(sink: S) -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY, sink)
    }

    /// Create a log holding at most `capacity` bytes of text.
    pub fn with_capacity(capacity: usize, sink: S) -> Self {
        Self {
            sink,
            entries: Vec::new(),
            text: String::new(),
            capacity,
        }
    }

    /// Record a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        let formatted = diagnostic.to_string();
        self.sink.emit(&diagnostic, &formatted);

        // Every retained entry also costs one terminator byte.
        let used = self.text.len() + self.entries.len();
        if used + formatted.len() + 2 > self.capacity {
            return;
        }
        self.text.push_str(&formatted);
        self.text.push('\n');
        self.entries.push(diagnostic);
    }

    /// Record a warning.
    pub fn warning(&mut self, kind: DiagnosticKind, line: Option<usize>, message: impl Into<String>) {
        self.push(Diagnostic {
            severity: Severity::Warning,
            ..Diagnostic::new(kind, line, message)
        });
    }

    /// Record an error.
    pub fn error(&mut self, kind: DiagnosticKind, line: Option<usize>, message: impl Into<String>) {
        self.push(Diagnostic {
            severity: Severity::Error,
            ..Diagnostic::new(kind, line, message)
        });
    }

    /// Record an informational message.
    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Diagnostic::new(DiagnosticKind::Applied, None, message));
    }

    /// Retained entries, oldest first.
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Accumulated text, one formatted message per line.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of retained entries of the given kind.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    /// Whether any retained entry has Error severity.
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Drop every retained entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.text.clear();
    }

    /// Write the accumulated text to `writer` and clear the log.
    pub fn flush_to<W: std::io::Write>(&mut self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(self.text.as_bytes())?;
        writer.flush()?;
        self.clear();
        Ok(())
    }

    /// Replace the log file at `path` with the accumulated text.
    ///
    /// Any existing file is removed first; when the log is empty no new file
    /// is created.
    pub fn write_to_file(&mut self, path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(LutError::log_write(path, e)),
        }

        if self.text.is_empty() {
            return Ok(());
        }

        let mut file = std::fs::File::create(path).map_err(|e| LutError::log_write(path, e))?;
        self.flush_to(&mut file).map_err(|e| LutError::log_write(path, e))
    }
}

impl Default for DiagnosticsLog<LogSink> {
    fn default() -> Self {
        Self::new(LogSink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_log(capacity: usize) -> DiagnosticsLog<MemorySink> {
        DiagnosticsLog::with_capacity(capacity, MemorySink::default())
    }

    #[test]
    fn test_format() {
        let d = Diagnostic::new(DiagnosticKind::DuplicateRule, Some(3), "Duplicate rule");
        assert_eq!(d.to_string(), "WARNING: Line 3: Duplicate rule");

        let d = Diagnostic::new(DiagnosticKind::OversizeInput, None, "too big");
        assert_eq!(d.to_string(), "ERROR: too big");

        let d = Diagnostic::new(DiagnosticKind::Applied, Some(4), "Mapping channel 1 --> 2");
        assert_eq!(d.to_string(), "Mapping channel 1 --> 2");
    }

    #[test]
    fn test_line_zero_means_no_context() {
        let d = Diagnostic::new(DiagnosticKind::UnexpectedEof, Some(0), "eof");
        assert_eq!(d.line, None);
        assert_eq!(d.to_string(), "ERROR: eof");
    }

    #[test]
    fn test_push_reaches_sink_and_buffer() {
        let mut log = memory_log(DEFAULT_LOG_CAPACITY);
        log.warning(DiagnosticKind::DuplicateRule, Some(2), "Duplicate rule for output channel 4");
        log.info("Mapping channel 1 --> 4");

        assert_eq!(log.entries().len(), 2);
        assert_eq!(log.sink().lines().len(), 2);
        assert_eq!(
            log.text(),
            "WARNING: Line 2: Duplicate rule for output channel 4\nMapping channel 1 --> 4\n"
        );
        assert_eq!(log.count(DiagnosticKind::DuplicateRule), 1);
        assert!(!log.has_errors());
    }

    #[test]
    fn test_capacity_drops_from_buffer_only() {
        let mut log = memory_log(32);
        log.info("0123456789");
        log.info("0123456789");
        log.info("0123456789");

        assert_eq!(log.entries().len(), 2);
        assert_eq!(log.text().len(), 22);
        assert_eq!(log.sink().records().len(), 3);
    }

    #[test]
    fn test_capacity_counts_terminator_per_entry() {
        let mut log = memory_log(DEFAULT_LOG_CAPACITY);
        for _ in 0..200 {
            log.info("0123456789");
        }

        assert_eq!(log.entries().len(), 85);
        assert_eq!(log.text().len(), 85 * 11);
        assert_eq!(log.sink().records().len(), 200);
    }

    #[test]
    fn test_flush_clears() {
        let mut log = memory_log(DEFAULT_LOG_CAPACITY);
        log.error(DiagnosticKind::UnexpectedSymbol, Some(1), "Unexpected symbol 'x'");

        let mut out = Vec::new();
        log.flush_to(&mut out).unwrap();
        assert_eq!(out, b"ERROR: Line 1: Unexpected symbol 'x'\n");
        assert!(log.is_empty());
        assert!(log.text().is_empty());
    }

    #[test]
    fn test_write_to_file_replaces_and_skips_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        std::fs::write(&path, "stale").unwrap();

        let mut log = memory_log(DEFAULT_LOG_CAPACITY);
        log.write_to_file(&path).unwrap();
        assert!(!path.exists());

        log.warning(DiagnosticKind::SourceUnavailable, None, "Unable to open map.txt! Using saved map.");
        log.write_to_file(&path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "WARNING: Unable to open map.txt! Using saved map.\n"
        );
    }
}
