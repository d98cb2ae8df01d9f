//! Live destinations for diagnostics.

use std::io::Write;

use super::{Diagnostic, Severity};

/// Receives every diagnostic as soon as it is produced.
pub trait DiagnosticSink {
    /// Handle one diagnostic; `formatted` is its display form.
    fn emit(&mut self, diagnostic: &Diagnostic, formatted: &str);
}

/// Forwards diagnostics to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&mut self, diagnostic: &Diagnostic, formatted: &str) {
        match diagnostic.severity {
            Severity::Warning => log::warn!(target: "dmx_lut::diagnostics", "{}", formatted),
            Severity::Error => log::error!(target: "dmx_lut::diagnostics", "{}", formatted),
            Severity::Info => log::info!(target: "dmx_lut::diagnostics", "{}", formatted),
        }
    }
}

/// Writes one formatted line per diagnostic to any writer (a serial
/// console, stderr, ...).
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DiagnosticSink for WriterSink<W> {
    fn emit(&mut self, _diagnostic: &Diagnostic, formatted: &str) {
        if let Err(e) = writeln!(self.writer, "{}", formatted) {
            log::warn!("diagnostic sink write failed: {}", e);
        }
    }
}

/// Records every diagnostic in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Vec<(Diagnostic, String)>,
}

impl MemorySink {
    /// Every diagnostic received, oldest first.
    pub fn records(&self) -> Vec<&Diagnostic> {
        self.records.iter().map(|(d, _)| d).collect()
    }

    /// The formatted lines received, oldest first.
    pub fn lines(&self) -> Vec<&str> {
        self.records.iter().map(|(_, s)| s.as_str()).collect()
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&mut self, diagnostic: &Diagnostic, formatted: &str) {
        self.records.push((diagnostic.clone(), formatted.to_string()));
    }
}
