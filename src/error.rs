//! Error types for the LUT loader.
//!
//! Parsing problems are never errors: they are reported through the
//! [`DiagnosticsLog`](crate::diagnostics::DiagnosticsLog). [`LutError`] covers
//! the failures of the collaborators around the parsers (file sources, store
//! images, log files) and of user-supplied selectors.

use thiserror::Error;

/// Result type alias using [`LutError`].
pub type Result<T> = std::result::Result<T, LutError>;

/// Unified error type for all LUT loader operations.
#[derive(Error, Debug)]
pub enum LutError {
    // ============ Source Errors ============
    /// A map file could not be opened
    #[error("Unable to open '{path}': {source}")]
    SourceOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A map file is not known to an in-memory opener
    #[error("No such source '{path}'")]
    SourceMissing { path: String },

    // ============ Store Errors ============
    /// Error reading a persisted store image
    #[error("Failed to read store image '{path}': {source}")]
    StoreRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing a persisted store image
    #[error("Failed to write store image '{path}': {source}")]
    StoreWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Persisted slot value that encodes neither identity, map nor constant
    #[error("Invalid slot value {value} for channel {channel}")]
    InvalidSlot { channel: usize, value: u16 },

    // ============ Log Errors ============
    /// Error writing the accumulated diagnostics to a file
    #[error("Unable to write logs to '{path}': {source}")]
    LogWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ============ Selector Errors ============
    /// Unknown map format name
    #[error("Unknown map format '{name}' (expected 'tabular' or 'directive')")]
    UnknownFormat { name: String },

    // ============ WASM Errors ============
    /// WASM-specific error
    #[cfg(feature = "wasm")]
    #[error("WASM error: {message}")]
    WasmError { message: String },
}

impl LutError {
    /// Create a source open error
    pub fn source_open(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::SourceOpen {
            path: path.display().to_string(),
            source,
        }
    }

    /// Create a store read error
    pub fn store_read(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::StoreRead {
            path: path.display().to_string(),
            source,
        }
    }

    /// Create a store write error
    pub fn store_write(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::StoreWrite {
            path: path.display().to_string(),
            source,
        }
    }

    /// Create a log write error
    pub fn log_write(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::LogWrite {
            path: path.display().to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LutError::UnknownFormat {
            name: "ini".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unknown map format 'ini' (expected 'tabular' or 'directive')"
        );

        let err = LutError::InvalidSlot {
            channel: 7,
            value: 900,
        };
        assert_eq!(err.to_string(), "Invalid slot value 900 for channel 7");
    }

    #[test]
    fn test_io_source_is_kept() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = LutError::source_open(std::path::Path::new("map.csv"), io);
        assert!(err.to_string().starts_with("Unable to open 'map.csv'"));
        assert!(err.source().is_some());
    }
}
