//! Persisted copy of the last good table.
//!
//! # Layout
//!
//! | Offset          | Content |
//! |-----------------|---------|
//! | `0..1026`       | 513 slots, little-endian u16 (low byte first) |
//! | `0x0FFF`        | magic `0xBE` |
//! | `0x1000`        | magic `0xEF` |
//!
//! A store whose magic bytes do not match holds no table.

mod file;

pub use file::FileStore;

use crate::lut::{Lut, CHANNEL_COUNT};

/// Minimum number of addressable bytes a store must provide.
pub const STORE_SIZE: usize = 0x1001;

/// Offset of the first magic byte.
pub const MAGIC_OFFSET: usize = 0x0FFF;

/// Magic bytes marking a valid persisted table.
pub const MAGIC: [u8; 2] = [0xBE, 0xEF];

/// Value of a never-written byte.
pub const ERASED: u8 = 0xFF;

/// Byte-addressable persistent memory.
pub trait PersistentStore {
    /// Read the byte at `address`.
    fn read(&self, address: usize) -> u8;

    /// Write `value` at `address` if it differs from the stored byte.
    fn update(&mut self, address: usize, value: u8);
}

/// Whether `store` holds a persisted table.
pub fn has_table<P: PersistentStore + ?Sized>(store: &P) -> bool {
    store.read(MAGIC_OFFSET) == MAGIC[0] && store.read(MAGIC_OFFSET + 1) == MAGIC[1]
}

/// Load the persisted table into `table`.
///
/// Returns `false`, leaving `table` untouched, when the store holds no table
/// or the persisted slots do not decode.
pub fn load_table<P: PersistentStore + ?Sized>(store: &P, table: &mut Lut) -> bool {
    if !has_table(store) {
        log::debug!("store holds no table, keeping current map");
        return false;
    }

    let mut raw = [0u16; CHANNEL_COUNT];
    for (i, slot) in raw.iter_mut().enumerate() {
        *slot = u16::from_le_bytes([store.read(i * 2), store.read(i * 2 + 1)]);
    }

    match Lut::from_raw(&raw) {
        Ok(lut) => {
            *table = lut;
            true
        }
        Err(e) => {
            log::warn!("ignoring persisted table: {}", e);
            false
        }
    }
}

/// Persist `table` and mark the store as holding a table.
pub fn save_table<P: PersistentStore + ?Sized>(store: &mut P, table: &Lut) {
    for (i, value) in table.to_raw().iter().enumerate() {
        let [low, high] = value.to_le_bytes();
        store.update(i * 2, low);
        store.update(i * 2 + 1, high);
    }
    store.update(MAGIC_OFFSET, MAGIC[0]);
    store.update(MAGIC_OFFSET + 1, MAGIC[1]);
}

/// A store held in memory, initially erased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryStore {
    bytes: Vec<u8>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::from_bytes(Vec::new())
    }

    /// Wrap an existing image, padding it with erased bytes up to
    /// [`STORE_SIZE`].
    pub fn from_bytes(mut bytes: Vec<u8>) -> Self {
        if bytes.len() < STORE_SIZE {
            bytes.resize(STORE_SIZE, ERASED);
        }
        Self { bytes, writes: 0 }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of bytes actually changed by [`PersistentStore::update`].
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PersistentStore for MemoryStore {
    fn read(&self, address: usize) -> u8 {
        self.bytes.get(address).copied().unwrap_or(ERASED)
    }

    fn update(&mut self, address: usize, value: u8) {
        if address >= self.bytes.len() {
            self.bytes.resize(address + 1, ERASED);
        }
        if self.bytes[address] != value {
            self.bytes[address] = value;
            self.writes += 1;
        }
    }
}
