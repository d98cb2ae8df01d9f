//! Integer token reader for streamed sources.

use crate::source::ByteSource;

/// Result of reading an integer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntToken {
    /// Digits read; `terminator` is the first non-digit byte, or `None`
    /// if the stream ended (only when end of stream was tolerated).
    Value { value: u32, terminator: Option<u8> },
    /// The stream ended before the token was terminated.
    EndOfStream,
}

/// Read a run of decimal digits.
///
/// `first` is a byte the caller has already taken from the stream; when it
/// is `None` the read starts with the next byte. Unless `tolerate_eof` is
/// set, running out of input after any byte, terminator included, yields
/// [`IntToken::EndOfStream`]. A token whose first byte is not a digit has
/// value 0.
pub fn read_int<B: ByteSource + ?Sized>(
    source: &mut B,
    first: Option<u8>,
    tolerate_eof: bool,
) -> IntToken {
    let mut value: u32 = 0;
    let mut pending = first;

    loop {
        let byte = match pending.take() {
            Some(b) => Some(b),
            None => source.read_byte(),
        };

        if !source.available() && !tolerate_eof {
            return IntToken::EndOfStream;
        }

        match byte {
            Some(b) if b.is_ascii_digit() => {
                value = value.saturating_mul(10).saturating_add(u32::from(b - b'0'));
            }
            terminator => return IntToken::Value { value, terminator },
        }
    }
}
