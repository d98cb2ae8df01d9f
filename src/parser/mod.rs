//! Map file parsers.
//!
//! Two human-editable formats describe a remap table.
//!
//! # Tabular format
//!
//! Comma-separated rows `input,output` after a header row. `output` is one
//! channel (`20`), a quoted list (`"1,2,3"`) or a constant (`5@200`, hold
//! channel 5 at 200; the input field is ignored).
//!
//! ```text
//! input,output
//! 10,20
//! 7,"1,2,3"
//! -,5@200
//! ```
//!
//! # Directive format
//!
//! One `in[/range] out` statement per line, `;` starts a comment.
//!
//! ```text
//! ; dimmers
//! 10 20
//! 1/8 100      ; inputs 1..=8 to outputs 100..=107
//! ```
//!
//! Neither parser fails: every problem becomes a diagnostic and the
//! offending rule or line is skipped. [`ParseOutcome`] tells whether the
//! parse ran to the end of its input.

mod directive;
mod int_reader;
mod tabular;

pub use directive::{parse_directive, DirectiveParser};
pub use int_reader::{read_int, IntToken};
pub use tabular::TabularParser;

use std::fmt;
use std::str::FromStr;

use crate::config::LoaderConfig;
use crate::diagnostics::{DiagnosticSink, DiagnosticsLog};
use crate::error::LutError;
use crate::lut::{Channel, Lut};
use crate::source::{ByteSource, MemorySource};

/// Map file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Format {
    /// Comma-separated `input,output` rows
    #[cfg_attr(feature = "cli", value(alias = "csv"))]
    Tabular,
    /// `in[/range] out` statements
    #[cfg_attr(feature = "cli", value(alias = "custom"))]
    Directive,
}

impl FromStr for Format {
    type Err = LutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tabular" | "csv" | "0" => Ok(Self::Tabular),
            "directive" | "custom" | "1" => Ok(Self::Directive),
            _ => Err(LutError::UnknownFormat {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tabular => f.write_str("tabular"),
            Self::Directive => f.write_str("directive"),
        }
    }
}

/// How a parse ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// All input was consumed
    Completed,
    /// A structural error stopped the parse early
    Terminated,
}

/// Parse `source` in `format` into `table`.
pub fn parse_source<B, S>(
    format: Format,
    source: &mut B,
    table: &mut Lut,
    log: &mut DiagnosticsLog<S>,
    config: &LoaderConfig,
) -> ParseOutcome
where
    B: ByteSource + ?Sized,
    S: DiagnosticSink,
{
    match format {
        Format::Tabular => TabularParser::from_config(config).parse_source(source, table, log),
        Format::Directive => parse_directive(source, table, log),
    }
}

/// Parse map text held in memory.
pub fn parse_str<S: DiagnosticSink>(
    format: Format,
    text: &str,
    table: &mut Lut,
    log: &mut DiagnosticsLog<S>,
    config: &LoaderConfig,
) -> ParseOutcome {
    let mut source = MemorySource::new("<input>", text);
    parse_source(format, &mut source, table, log, config)
}

/// Leading integer of `text`: optional whitespace, optional sign, then
/// digits up to the first non-digit. Text without digits reads as 0.
pub(crate) fn leading_int(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, b| acc.saturating_mul(10).saturating_add(i64::from(b - b'0')));

    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// Channel for a parsed integer, if in bounds.
pub(crate) fn channel(value: i64) -> Option<Channel> {
    u32::try_from(value).ok().and_then(Channel::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;

    #[test]
    fn test_format_from_str() {
        assert_eq!("tabular".parse::<Format>().unwrap(), Format::Tabular);
        assert_eq!("CSV".parse::<Format>().unwrap(), Format::Tabular);
        assert_eq!("directive".parse::<Format>().unwrap(), Format::Directive);
        assert_eq!("1".parse::<Format>().unwrap(), Format::Directive);
        assert!("ini".parse::<Format>().is_err());
        assert_eq!(Format::Directive.to_string(), "directive");
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("42"), 42);
        assert_eq!(leading_int("  17abc"), 17);
        assert_eq!(leading_int("-3"), -3);
        assert_eq!(leading_int("+8"), 8);
        assert_eq!(leading_int("x"), 0);
        assert_eq!(leading_int(""), 0);
        assert_eq!(leading_int("5@200"), 5);
    }

    #[test]
    fn test_channel_conversion() {
        assert!(channel(-1).is_none());
        assert!(channel(513).is_none());
        assert_eq!(channel(512).map(Channel::get), Some(512));
    }

    #[test]
    fn test_parse_str_dispatch() {
        let config = LoaderConfig::default();
        let mut log = DiagnosticsLog::new(MemorySink::default());

        let mut lut = Lut::identity();
        parse_str(Format::Directive, "3 4\n", &mut lut, &mut log, &config);
        assert_eq!(lut.raw(Channel::new(4).unwrap()), 3);

        let mut lut = Lut::identity();
        parse_str(Format::Tabular, "in,out\n3,4\n", &mut lut, &mut log, &config);
        assert_eq!(lut.raw(Channel::new(4).unwrap()), 3);
    }
}
