//! Parser for the compact directive map format.
//!
//! # Grammar
//!
//! ```text
//! map        = { line }
//! line       = [ directive ] [ comment ] '\n'
//! directive  = channel [ '/' range ] ws+ channel
//! comment    = ';' { any_char }
//! channel    = digit+
//! range      = digit+
//! ws         = ' ' | '\t'
//! ```
//!
//! `10 20` feeds input 10 to output 20; `10/3 20` feeds inputs 10..=12 to
//! outputs 20..=22.
//!
//! The source is read one byte at a time. A structurally required token
//! missing at end of stream aborts the whole parse; rules applied before
//! that point stay in the table.

use super::int_reader::{read_int, IntToken};
use super::ParseOutcome;
use crate::diagnostics::{DiagnosticKind, DiagnosticSink, DiagnosticsLog};
use crate::lut::{Channel, Lut, LutBuilder, CHANNEL_COUNT};
use crate::source::ByteSource;

/// What the scanner does after handling one token.
enum Flow {
    Continue,
    /// End of stream reached where stopping is acceptable
    Finished,
    /// Fatal error, parse abandoned
    Aborted,
}

/// Parse a directive map from `source` into `table`.
///
/// The source is closed before returning.
pub fn parse_directive<B, S>(
    source: &mut B,
    table: &mut Lut,
    log: &mut DiagnosticsLog<S>,
) -> ParseOutcome
where
    B: ByteSource + ?Sized,
    S: DiagnosticSink,
{
    DirectiveParser::new(source, table, log).parse()
}

/// Streaming directive scanner.
pub struct DirectiveParser<'a, B: ByteSource + ?Sized, S: DiagnosticSink> {
    source: &'a mut B,
    builder: LutBuilder<'a, S>,
    line: usize,
    /// Byte over-read by the last integer token, handled before reading on
    carry: Option<u8>,
}

impl<'a, B: ByteSource + ?Sized, S: DiagnosticSink> DirectiveParser<'a, B, S> {
    pub fn new(source: &'a mut B, table: &'a mut Lut, log: &'a mut DiagnosticsLog<S>) -> Self {
        Self {
            source,
            builder: LutBuilder::new(table, log),
            line: 1,
            carry: None,
        }
    }

    /// Run to the end of the source or to the first fatal error.
    pub fn parse(mut self) -> ParseOutcome {
        let outcome = loop {
            // A byte carried past the end of the stream is never dispatched.
            if self.carry.is_some() && !self.source.available() {
                break ParseOutcome::Completed;
            }
            let Some(byte) = self.next_byte() else {
                break ParseOutcome::Completed;
            };

            let flow = match byte {
                b'\n' => {
                    self.line += 1;
                    Flow::Continue
                }
                b';' => self.discard_line(),
                b' ' | b'\t' => Flow::Continue,
                b'0'..=b'9' => self.directive(byte),
                other => {
                    self.unexpected_symbol(other);
                    self.discard_line()
                }
            };

            match flow {
                Flow::Continue => {}
                Flow::Finished => break ParseOutcome::Completed,
                Flow::Aborted => break ParseOutcome::Terminated,
            }
        };

        self.source.close();
        outcome
    }

    fn next_byte(&mut self) -> Option<u8> {
        match self.carry.take() {
            Some(byte) => Some(byte),
            None => self.source.read_byte(),
        }
    }

    /// Parse one `in[/range] out` directive starting at digit `first`.
    fn directive(&mut self, first: u8) -> Flow {
        let (in_value, mut next) = match read_int(&mut *self.source, Some(first), false) {
            IntToken::Value { value, terminator } => (value, terminator),
            IntToken::EndOfStream => {
                return self.unexpected_eof("Unexpected EOF (expected range/output channel)")
            }
        };

        let Some(input) = Channel::new(in_value) else {
            self.warning(
                DiagnosticKind::InputChannelOutOfBounds,
                "Input channel out of bounds, skipping".to_string(),
            );
            return self.skip_line(next);
        };

        let mut range = 1;
        if next == Some(b'/') {
            match read_int(&mut *self.source, None, false) {
                IntToken::Value { value, terminator } => {
                    range = value;
                    next = terminator;
                }
                IntToken::EndOfStream => {
                    return self.unexpected_eof("Unexpected EOF (expected output channel)")
                }
            }

            if exceeds_channels(in_value, range) {
                self.warning(
                    DiagnosticKind::RangeExceedsChannels,
                    format!(
                        "Selected input range ({}) extends past 512 channels, skipping",
                        range
                    ),
                );
                return self.skip_line(next);
            }
        }

        while matches!(next, Some(b' ' | b'\t')) {
            if !self.source.available() {
                return self.unexpected_eof("Unexpected EOF (expected output channel)");
            }
            next = self.source.read_byte();
        }

        let first_out = match next {
            Some(b) if b.is_ascii_digit() => b,
            Some(b) => {
                self.unexpected_symbol(b);
                return self.skip_line(next);
            }
            None => return self.unexpected_eof("Unexpected EOF (expected output channel)"),
        };

        // The output channel may be the last token of the file.
        let (out_value, terminator) = match read_int(&mut *self.source, Some(first_out), true) {
            IntToken::Value { value, terminator } => (value, terminator),
            IntToken::EndOfStream => return Flow::Finished,
        };

        let Some(output) = Channel::new(out_value) else {
            self.warning(
                DiagnosticKind::OutputChannelOutOfBounds,
                "Output channel out of bounds, skipping".to_string(),
            );
            return self.skip_line(terminator);
        };

        if exceeds_channels(out_value, range) {
            self.warning(
                DiagnosticKind::RangeExceedsChannels,
                format!(
                    "Selected output range ({}) extends past 512 channels, skipping",
                    range
                ),
            );
            return self.skip_line(terminator);
        }

        let line = self.line;
        for i in 0..range {
            if let (Some(from), Some(to)) = (input.offset(i), output.offset(i)) {
                self.builder.map_channel(from, to, Some(line));
            }
        }
        self.builder.end_batch();

        self.carry = terminator;
        Flow::Continue
    }

    /// Skip the rest of a rejected line. `next` is the byte that stopped
    /// the scan, already taken from the stream.
    fn skip_line(&mut self, next: Option<u8>) -> Flow {
        match next {
            Some(b'\n') => {
                self.line += 1;
                Flow::Continue
            }
            Some(_) => self.discard_line(),
            None => Flow::Finished,
        }
    }

    /// Consume bytes up to and including the next newline.
    fn discard_line(&mut self) -> Flow {
        loop {
            if !self.source.available() {
                return Flow::Finished;
            }
            match self.source.read_byte() {
                Some(b'\n') => break,
                Some(_) => {}
                None => return Flow::Finished,
            }
        }
        self.line += 1;
        Flow::Continue
    }

    fn unexpected_symbol(&mut self, byte: u8) {
        self.error(
            DiagnosticKind::UnexpectedSymbol,
            format!("Unexpected symbol '{}'", char::from(byte).escape_default()),
        );
    }

    fn unexpected_eof(&mut self, message: &str) -> Flow {
        self.error(DiagnosticKind::UnexpectedEof, message.to_string());
        Flow::Aborted
    }

    fn warning(&mut self, kind: DiagnosticKind, message: String) {
        let line = self.line;
        self.builder.log().warning(kind, Some(line), message);
    }

    fn error(&mut self, kind: DiagnosticKind, message: String) {
        let line = self.line;
        self.builder.log().error(kind, Some(line), message);
    }
}

/// Whether `count` channels starting at `start` run past the table.
fn exceeds_channels(start: u32, count: u32) -> bool {
    start.saturating_add(count) > CHANNEL_COUNT as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{MemorySink, Severity};
    use crate::lut::Slot;
    use crate::source::MemorySource;

    fn ch(n: u32) -> Channel {
        Channel::new(n).unwrap()
    }

    fn parse(text: &str) -> (Lut, DiagnosticsLog<MemorySink>, ParseOutcome, MemorySource) {
        let mut lut = Lut::identity();
        let mut log = DiagnosticsLog::new(MemorySink::default());
        let mut source = MemorySource::new("map.txt", text);
        let outcome = parse_directive(&mut source, &mut lut, &mut log);
        (lut, log, outcome, source)
    }

    fn problems(log: &DiagnosticsLog<MemorySink>) -> Vec<(DiagnosticKind, Option<usize>)> {
        log.sink()
            .records()
            .into_iter()
            .filter(|d| d.severity != Severity::Info)
            .map(|d| (d.kind, d.line))
            .collect()
    }

    #[test]
    fn test_simple_map() {
        let (lut, log, outcome, source) = parse("10 20\n");
        assert_eq!(outcome, ParseOutcome::Completed);
        assert_eq!(lut.slot(ch(20)), Slot::MappedFrom(ch(10)));
        assert_eq!(lut.rules().count(), 1);
        assert!(problems(&log).is_empty());
        assert!(source.is_closed());
    }

    #[test]
    fn test_last_token_without_newline() {
        let (lut, _, outcome, _) = parse("1 2\n3\t\t4");
        assert_eq!(outcome, ParseOutcome::Completed);
        assert_eq!(lut.raw(ch(2)), 1);
        assert_eq!(lut.raw(ch(4)), 3);
    }

    #[test]
    fn test_range() {
        let (lut, log, _, _) = parse("10/3 20\n");
        assert_eq!(lut.raw(ch(20)), 10);
        assert_eq!(lut.raw(ch(21)), 11);
        assert_eq!(lut.raw(ch(22)), 12);
        assert_eq!(lut.rules().count(), 3);
        assert_eq!(
            log.text(),
            "Mapping channel 10 --> 20\nMapping channel 11 --> 21\nMapping channel 12 --> 22\n\n"
        );
    }

    #[test]
    fn test_comment_and_line_numbers() {
        let (lut, log, _, _) = parse(";comment\n10 20\nx\n");
        assert_eq!(lut.raw(ch(20)), 10);
        assert_eq!(problems(&log), vec![(DiagnosticKind::UnexpectedSymbol, Some(3))]);
        assert_eq!(log.sink().lines().last().copied(), Some("ERROR: Line 3: Unexpected symbol 'x'"));
    }

    #[test]
    fn test_trailing_comment() {
        let (lut, log, outcome, _) = parse("1 2 ; first\n3 4 ;no newline");
        assert_eq!(outcome, ParseOutcome::Completed);
        assert_eq!(lut.raw(ch(2)), 1);
        assert_eq!(lut.raw(ch(4)), 3);
        assert!(problems(&log).is_empty());
    }

    #[test]
    fn test_eof_inside_in_channel_is_fatal() {
        let (lut, log, outcome, source) = parse("1 2\n3");
        assert_eq!(outcome, ParseOutcome::Terminated);
        assert_eq!(lut.raw(ch(2)), 1);
        assert_eq!(problems(&log), vec![(DiagnosticKind::UnexpectedEof, Some(2))]);
        assert!(source.is_closed());
    }

    #[test]
    fn test_eof_after_in_channel_is_fatal() {
        let (_, log, outcome, _) = parse("5 ");
        assert_eq!(outcome, ParseOutcome::Terminated);
        assert_eq!(problems(&log), vec![(DiagnosticKind::UnexpectedEof, Some(1))]);

        let (_, log, outcome, _) = parse("5/2");
        assert_eq!(outcome, ParseOutcome::Terminated);
        assert_eq!(problems(&log), vec![(DiagnosticKind::UnexpectedEof, Some(1))]);
    }

    #[test]
    fn test_fatal_eof_stops_before_later_rules() {
        let (lut, _, outcome, _) = parse("1 2\n5   ");
        assert_eq!(outcome, ParseOutcome::Terminated);
        assert_eq!(lut.rules().count(), 1);
    }

    #[test]
    fn test_bounds_skip_line() {
        let (lut, log, outcome, _) = parse("600 20\n510/4 1\n1/4 510\n1 700\n7 8\n");
        assert_eq!(outcome, ParseOutcome::Completed);
        assert_eq!(lut.rules().collect::<Vec<_>>(), vec![(ch(8), Slot::MappedFrom(ch(7)))]);
        assert_eq!(
            problems(&log),
            vec![
                (DiagnosticKind::InputChannelOutOfBounds, Some(1)),
                (DiagnosticKind::RangeExceedsChannels, Some(2)),
                (DiagnosticKind::RangeExceedsChannels, Some(3)),
                (DiagnosticKind::OutputChannelOutOfBounds, Some(4)),
            ]
        );
    }

    #[test]
    fn test_bounds_are_warnings() {
        let (_, log, _, _) = parse("600 20\n1/600 2\n1 700\n");
        assert_eq!(
            log.sink().lines(),
            vec![
                "WARNING: Line 1: Input channel out of bounds, skipping",
                "WARNING: Line 2: Selected input range (600) extends past 512 channels, skipping",
                "WARNING: Line 3: Output channel out of bounds, skipping",
            ]
        );
        assert!(!log.has_errors());
    }

    #[test]
    fn test_range_reaching_last_channel() {
        let (lut, log, _, _) = parse("1/3 510\n");
        assert_eq!(lut.raw(ch(510)), 1);
        assert_eq!(lut.raw(ch(512)), 3);
        assert!(problems(&log).is_empty());
    }

    #[test]
    fn test_missing_output_channel() {
        let (lut, log, _, _) = parse("4 x 5\n6 7\n");
        assert_eq!(lut.rules().count(), 1);
        assert_eq!(lut.raw(ch(7)), 6);
        assert_eq!(problems(&log), vec![(DiagnosticKind::UnexpectedSymbol, Some(1))]);
    }

    #[test]
    fn test_duplicate_rule_warns() {
        let (lut, log, _, _) = parse("1 5\n2 5\n");
        assert_eq!(lut.raw(ch(5)), 2);
        assert_eq!(problems(&log), vec![(DiagnosticKind::DuplicateRule, Some(2))]);
        assert_eq!(
            log.sink().lines()[2],
            "WARNING: Line 2: Duplicate rule for output channel 5"
        );
    }

    #[test]
    fn test_garbage_line_then_rule() {
        let (lut, log, _, _) = parse("foo bar\n\n3 4\n");
        assert_eq!(lut.raw(ch(4)), 3);
        assert_eq!(problems(&log), vec![(DiagnosticKind::UnexpectedSymbol, Some(1))]);
    }

    #[test]
    fn test_trailing_byte_at_end_of_stream_is_ignored() {
        let (lut, log, outcome, _) = parse("1 2x");
        assert_eq!(outcome, ParseOutcome::Completed);
        assert_eq!(lut.raw(ch(2)), 1);
        assert!(problems(&log).is_empty());
    }

    #[test]
    fn test_trailing_garbage_mid_stream() {
        let (lut, log, outcome, _) = parse("1 2x
3 4
");
        assert_eq!(outcome, ParseOutcome::Completed);
        assert_eq!(lut.raw(ch(2)), 1);
        assert_eq!(lut.raw(ch(4)), 3);
        assert_eq!(problems(&log), vec![(DiagnosticKind::UnexpectedSymbol, Some(1))]);
    }
}
