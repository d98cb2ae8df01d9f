//! Store image kept in a file.

use std::path::PathBuf;

use super::{MemoryStore, PersistentStore};
use crate::error::{LutError, Result};

/// A persistent store backed by an image file.
///
/// The image is read once on [`FileStore::open`]; updates stay in memory
/// until [`FileStore::commit`].
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    image: MemoryStore,
    dirty: bool,
}

impl FileStore {
    /// Open the image at `path`. A missing file is an erased store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no store image at {}, starting erased", path.display());
                Vec::new()
            }
            Err(e) => return Err(LutError::store_read(&path, e)),
        };

        Ok(Self {
            path,
            image: MemoryStore::from_bytes(bytes),
            dirty: false,
        })
    }

    /// Write the image back if anything changed.
    pub fn commit(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        std::fs::write(&self.path, self.image.as_bytes())
            .map_err(|e| LutError::store_write(&self.path, e))?;
        self.dirty = false;
        Ok(())
    }
}

impl PersistentStore for FileStore {
    fn read(&self, address: usize) -> u8 {
        self.image.read(address)
    }

    fn update(&mut self, address: usize, value: u8) {
        let before = self.image.writes();
        self.image.update(address, value);
        self.dirty |= self.image.writes() != before;
    }
}
