//! Filesystem-backed sources.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::{ByteSource, SourceOpener};
use crate::error::{LutError, Result};

/// Opens map files from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsOpener;

impl SourceOpener for FsOpener {
    type Source = FileSource;

    fn open(&self, path: &Path) -> Result<FileSource> {
        FileSource::open(path)
    }
}

/// A buffered map file.
#[derive(Debug)]
pub struct FileSource {
    name: String,
    reader: Option<BufReader<File>>,
    size: u64,
    pos: u64,
}

impl FileSource {
    /// Open the file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| LutError::source_open(path, e))?;
        let metadata = file.metadata().map_err(|e| LutError::source_open(path, e))?;
        if metadata.is_dir() {
            return Err(LutError::source_open(
                path,
                std::io::Error::new(std::io::ErrorKind::Other, "is a directory"),
            ));
        }

        log::debug!("opened map file {} ({} bytes)", path.display(), metadata.len());

        Ok(Self {
            name: path.display().to_string(),
            reader: Some(BufReader::new(file)),
            size: metadata.len(),
            pos: 0,
        })
    }

    fn fail(&mut self, e: std::io::Error) {
        log::warn!("read from {} failed: {}", self.name, e);
        self.reader = None;
    }
}

impl ByteSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn available(&self) -> bool {
        self.reader.is_some() && self.pos < self.size
    }

    fn read_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        (self.read_into(&mut byte) == 1).then_some(byte[0])
    }

    fn read_into(&mut self, buf: &mut [u8]) -> usize {
        let Some(reader) = self.reader.as_mut() else {
            return 0;
        };
        let mut filled = 0;
        let mut failure = None;
        while filled < buf.len() {
            match reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        if let Some(e) = failure {
            self.fail(e);
        }
        self.pos += filled as u64;
        filled
    }

    fn close(&mut self) {
        self.reader = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.txt");
        std::fs::write(&path, "10 20\n").unwrap();

        let mut src = FsOpener.open(&path).unwrap();
        assert_eq!(src.size(), 6);
        assert_eq!(src.read_byte(), Some(b'1'));
        assert_eq!(src.read_to_end(), b"0 20\n");
        assert!(!src.available());

        src.close();
        assert_eq!(src.read_byte(), None);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FsOpener.open(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, LutError::SourceOpen { .. }));
    }
}
