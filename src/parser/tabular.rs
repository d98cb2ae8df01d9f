//! Parser for the comma-separated tabular map format.
//!
//! ```text
//! input,output
//! 7,"1,2,3"
//! 10,20
//! -,5@200
//! ```
//!
//! Channels 1, 2 and 3 take input 7, channel 20 takes input 10 and channel 5
//! is held at 200. The first row is a header. Only the first two fields of a row are read;
//! a field containing commas must be quoted.

use super::{channel, leading_int, ParseOutcome};
use crate::config::LoaderConfig;
use crate::diagnostics::{DiagnosticKind, DiagnosticSink, DiagnosticsLog};
use crate::lut::{Lut, LutBuilder, MAX_CONSTANT};
use crate::source::ByteSource;

/// How an output spec is to be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode<'s> {
    /// Rejected; a diagnostic has been emitted
    Invalid,
    /// One output channel
    Single,
    /// Comma-separated output channels
    Multi,
    /// `<out>@<constant>`, holding the text after '@'
    Constant(&'s str),
}

/// Tabular format parser.
#[derive(Debug, Clone)]
pub struct TabularParser {
    max_size: u64,
    header: bool,
}

impl TabularParser {
    pub fn new() -> Self {
        Self::from_config(&LoaderConfig::default())
    }

    pub fn from_config(config: &LoaderConfig) -> Self {
        Self {
            max_size: config.max_tabular_size,
            header: config.tabular_header,
        }
    }

    /// Set the largest accepted source, in bytes.
    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set whether the first row is a header.
    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    /// Read `source` completely and parse it.
    pub fn parse_source<B, S>(
        &self,
        source: &mut B,
        table: &mut Lut,
        log: &mut DiagnosticsLog<S>,
    ) -> ParseOutcome
    where
        B: ByteSource + ?Sized,
        S: DiagnosticSink,
    {
        if !self.check_size(source.name(), source.size(), log) {
            return ParseOutcome::Terminated;
        }
        let data = source.read_to_end();
        self.parse_bytes(source.name(), &data, table, log)
    }

    /// Parse an in-memory map named `name`.
    pub fn parse_bytes<S: DiagnosticSink>(
        &self,
        name: &str,
        data: &[u8],
        table: &mut Lut,
        log: &mut DiagnosticsLog<S>,
    ) -> ParseOutcome {
        if !self.check_size(name, data.len() as u64, log) {
            return ParseOutcome::Terminated;
        }

        let text = String::from_utf8_lossy(data);
        let records = split_records(&text);
        let rows = records.iter().skip(usize::from(self.header));

        let mut builder = LutBuilder::new(table, log);
        for (index, record) in rows.enumerate() {
            let input = record.first().map(String::as_str).unwrap_or("");
            let output = record.get(1).map(String::as_str).unwrap_or("");
            parse_row(&mut builder, index + 1, input, output);
        }

        ParseOutcome::Completed
    }

    fn check_size<S: DiagnosticSink>(
        &self,
        name: &str,
        size: u64,
        log: &mut DiagnosticsLog<S>,
    ) -> bool {
        if size <= self.max_size {
            return true;
        }
        log.error(
            DiagnosticKind::OversizeInput,
            None,
            format!(
                "{} exceeds specified maximum size ({} bytes)",
                name, self.max_size
            ),
        );
        false
    }
}

impl Default for TabularParser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_row<S: DiagnosticSink>(
    builder: &mut LutBuilder<'_, S>,
    line: usize,
    input: &str,
    output: &str,
) {
    if input.is_empty() || output.is_empty() {
        return;
    }

    if !output.starts_with(|c: char| c.is_ascii_digit()) {
        builder.log().error(
            DiagnosticKind::InvalidOutputChannel,
            Some(line),
            "Invalid output channel",
        );
        return;
    }

    let output = output.trim_end_matches(' ');

    match classify(output, line, builder.log()) {
        OutputMode::Invalid => {}
        OutputMode::Constant(constant_text) => {
            if !constant_text.starts_with(|c: char| c.is_ascii_digit()) {
                builder.log().error(
                    DiagnosticKind::MissingConstant,
                    Some(line),
                    "Missing constant after @",
                );
                return;
            }

            let constant = leading_int(constant_text);
            if constant > i64::from(MAX_CONSTANT) {
                builder.log().warning(
                    DiagnosticKind::ConstantOutOfBounds,
                    Some(line),
                    format!("Constant exceeds {}", MAX_CONSTANT),
                );
                return;
            }

            let Some(target) = channel(leading_int(output)) else {
                builder.log().warning(
                    DiagnosticKind::OutputChannelOutOfBounds,
                    Some(line),
                    "Output channel out of bounds",
                );
                return;
            };

            builder.write_constant(target, constant as u8, Some(line));
        }
        OutputMode::Single | OutputMode::Multi => {
            let Some(source) = channel(leading_int(input)) else {
                builder.log().warning(
                    DiagnosticKind::InputChannelOutOfBounds,
                    Some(line),
                    "Input channel out of bounds",
                );
                return;
            };

            for token in output.split(',').filter(|t| !t.is_empty()) {
                match channel(leading_int(token)) {
                    Some(target) => builder.map_channel(source, target, Some(line)),
                    None => builder.log().warning(
                        DiagnosticKind::OutputChannelOutOfBounds,
                        Some(line),
                        "Output channel out of bounds",
                    ),
                }
            }
        }
    }
}

/// Work out how `spec` is to be applied, reporting the first syntax
/// violation found.
fn classify<'s, S: DiagnosticSink>(
    spec: &'s str,
    line: usize,
    log: &mut DiagnosticsLog<S>,
) -> OutputMode<'s> {
    let mut mode = OutputMode::Single;
    let mut prev: Option<char> = None;

    for (i, c) in spec.char_indices() {
        let after = prev.replace(c);

        if c == ' ' && after == Some(',') {
            continue;
        }

        match c {
            '0'..='9' => {}
            ',' => {
                let after_digit = after.is_some_and(|p| p.is_ascii_digit());
                match mode {
                    OutputMode::Single | OutputMode::Multi if after_digit => {
                        mode = OutputMode::Multi;
                    }
                    _ => {
                        log.error(DiagnosticKind::UnexpectedComma, Some(line), "Unexpected comma");
                        return OutputMode::Invalid;
                    }
                }
            }
            '@' => match mode {
                OutputMode::Single => mode = OutputMode::Constant(&spec[i + 1..]),
                _ => {
                    log.error(DiagnosticKind::UnexpectedAt, Some(line), "Unexpected @");
                    return OutputMode::Invalid;
                }
            },
            _ => {
                log.error(
                    DiagnosticKind::UnexpectedSymbol,
                    Some(line),
                    format!("Unexpected symbol '{}'", c),
                );
                return OutputMode::Invalid;
            }
        }
    }

    mode
}

/// Split comma-separated text into records of fields.
///
/// Fields starting with `"` run to the matching closing quote (`""` is a
/// literal quote) and may contain commas and newlines. `\r\n` ends a record
/// like `\n`.
fn split_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if quoted {
            if c != '"' {
                field.push(c);
            } else if chars.peek() == Some(&'"') {
                chars.next();
                field.push('"');
            } else {
                quoted = false;
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => quoted = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    records
}
