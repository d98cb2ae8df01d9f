//! Map file sources.
//!
//! Parsers read through [`ByteSource`], a minimal byte-stream interface
//! (size, bulk read, single-byte read, availability, close). A
//! [`SourceOpener`] resolves a path to a source; opening is the only
//! operation that can fail; read failures surface as end of stream.

mod file;

pub use file::{FileSource, FsOpener};

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{LutError, Result};

/// A readable map file.
pub trait ByteSource {
    /// Display name used in diagnostics.
    fn name(&self) -> &str;

    /// Total size of the source in bytes.
    fn size(&self) -> u64;

    /// Whether more bytes can be read.
    fn available(&self) -> bool;

    /// Read the next byte, or `None` at end of stream.
    fn read_byte(&mut self) -> Option<u8>;

    /// Read up to `buf.len()` bytes, returning how many were read.
    fn read_into(&mut self, buf: &mut [u8]) -> usize;

    /// Release the source. Further reads return end of stream.
    fn close(&mut self);

    /// Read everything that remains.
    fn read_to_end(&mut self) -> Vec<u8> {
        let mut data = vec![0u8; self.size() as usize];
        let mut filled = 0;
        while filled < data.len() {
            let n = self.read_into(&mut data[filled..]);
            if n == 0 {
                break;
            }
            filled += n;
        }
        data.truncate(filled);
        data
    }
}

/// Resolves paths to sources.
pub trait SourceOpener {
    type Source: ByteSource;

    fn open(&self, path: &Path) -> Result<Self::Source>;
}

/// A source over an in-memory buffer.
#[derive(Debug, Clone)]
pub struct MemorySource {
    name: String,
    data: Vec<u8>,
    pos: usize,
    closed: bool,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            pos: 0,
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl ByteSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn available(&self) -> bool {
        !self.closed && self.pos < self.data.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        if !self.available() {
            return None;
        }
        let byte = self.data[self.pos];
        self.pos += 1;
        Some(byte)
    }

    fn read_into(&mut self, buf: &mut [u8]) -> usize {
        if self.closed {
            return 0;
        }
        let remaining = &self.data[self.pos..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.pos += n;
        n
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

/// Opens sources from a fixed set of in-memory files.
#[derive(Debug, Clone, Default)]
pub struct MemoryOpener {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemoryOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file.
    pub fn with_file(mut self, path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(path, data);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), data.into());
    }
}

impl SourceOpener for MemoryOpener {
    type Source = MemorySource;

    fn open(&self, path: &Path) -> Result<MemorySource> {
        let data = self.files.get(path).ok_or_else(|| LutError::SourceMissing {
            path: path.display().to_string(),
        })?;
        Ok(MemorySource::new(path.display().to_string(), data.clone()))
    }
}
