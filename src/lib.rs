//! # DMX LUT
//!
//! Channel remap tables for DMX channel remappers.
//!
//! This library provides:
//! - Parsers for two human-editable map formats (tabular and directive)
//! - A 513-slot remap table with identity, channel-map and constant slots
//! - Line-numbered diagnostics with a live sink and a bounded log buffer
//! - A persisted fallback table for when no map file is available
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`parser`] - Tabular and directive map parsers
//! - [`lut`] - Remap table representation and the shared write policy
//! - [`diagnostics`] - Diagnostics log and sinks
//! - [`source`] - Map file sources (filesystem and in-memory)
//! - [`storage`] - Persisted table image
//! - [`loader`] - Table loading with persisted fallback
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! dmxlut stage.map --format directive --store lut.bin --save --log-file lut.log
//! ```
//!
//! ### Library
//!
//! ```
//! use std::path::Path;
//! use dmx_lut::{Format, MemoryOpener, MemorySink, MemoryStore, TableLoader};
//!
//! let opener = MemoryOpener::new().with_file("stage.map", "10/3 20\n");
//! let mut loader = TableLoader::new(opener, MemoryStore::new(), MemorySink::default());
//! let loaded = loader.load(Path::new("stage.map"), Format::Directive);
//! assert_eq!(loaded.table.rules().count(), 3);
//! ```
//!
//! ## Slot Encoding
//!
//! Stored tables keep one u16 per output channel:
//!
//! 1. `value == channel`: identity
//! 2. `value <= 512`: output takes input channel `value`
//! 3. `value >= 1000`: output is held at `value - 1000` (0..=255)

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod loader;
pub mod lut;
pub mod parser;
pub mod source;
pub mod storage;

// Re-export main types for convenience
pub use config::LoaderConfig;
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticsLog, LogSink, MemorySink, Severity};
pub use error::{LutError, Result};
pub use loader::{Loaded, TableLoader, TableOrigin};
pub use lut::{Channel, Lut, Slot};
pub use parser::{Format, ParseOutcome};
pub use source::{FsOpener, MemoryOpener};
pub use storage::{FileStore, MemoryStore};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmLut;
