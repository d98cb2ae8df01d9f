//! Shared write policy used by both map parsers.

use super::table::{Channel, Lut, Slot};
use crate::diagnostics::{DiagnosticKind, DiagnosticSink, DiagnosticsLog};

/// Applies parsed rules to a table, reporting overwrites.
///
/// The last rule for an output channel always wins; overwriting anything
/// other than identity emits a [`DiagnosticKind::DuplicateRule`] warning.
pub struct LutBuilder<'a, S: DiagnosticSink> {
    table: &'a mut Lut,
    log: &'a mut DiagnosticsLog<S>,
}

impl<'a, S: DiagnosticSink> LutBuilder<'a, S> {
    pub fn new(table: &'a mut Lut, log: &'a mut DiagnosticsLog<S>) -> Self {
        Self { table, log }
    }

    /// Route input channel `input` to output channel `output`.
    pub fn map_channel(&mut self, input: Channel, output: Channel, line: Option<usize>) {
        if !self.table.slot(output).is_identity() {
            self.log.warning(
                DiagnosticKind::DuplicateRule,
                line,
                format!("Duplicate rule for output channel {}", output),
            );
        }

        self.log.info(format!("Mapping channel {} --> {}", input, output));
        self.table.set(output, Slot::mapped(output, input));
    }

    /// Hold output channel `output` at `constant`.
    pub fn write_constant(&mut self, output: Channel, constant: u8, line: Option<usize>) {
        match self.table.slot(output) {
            Slot::Identity => {}
            Slot::Constant(_) => self.log.warning(
                DiagnosticKind::DuplicateRule,
                line,
                format!("Duplicate constant for output channel {}", output),
            ),
            Slot::MappedFrom(_) => self.log.warning(
                DiagnosticKind::DuplicateRule,
                line,
                format!(
                    "Duplicate rule for output channel {}, replacing map with constant",
                    output
                ),
            ),
        }

        self.log
            .info(format!("Writing constant {} --> Channel {}", constant, output));
        self.table.set(output, Slot::Constant(constant));
    }

    /// Emit a blank line separating batches of confirmations.
    pub fn end_batch(&mut self) {
        self.log.info("");
    }

    pub fn log(&mut self) -> &mut DiagnosticsLog<S> {
        &mut *self.log
    }
}
