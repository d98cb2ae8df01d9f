//! Table loading: parse a map file, or fall back to the persisted table.

use std::path::Path;

use crate::config::LoaderConfig;
use crate::diagnostics::{DiagnosticKind, DiagnosticSink, DiagnosticsLog, LogSink};
use crate::error::Result;
use crate::lut::Lut;
use crate::parser::{self, Format, ParseOutcome};
use crate::source::{ByteSource, SourceOpener};
use crate::storage::{self, PersistentStore};

/// Where a loaded table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableOrigin {
    /// Parsed from the map file
    Parsed(ParseOutcome),
    /// Map file unavailable, persisted table used
    Persisted,
    /// Map file unavailable and nothing persisted, identity table used
    Default,
}

/// Result of one load cycle.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub table: Lut,
    pub origin: TableOrigin,
}

/// Loads remap tables from map files, with a persisted fallback.
///
/// The loader owns the diagnostics log; it is reset at the start of every
/// [`load`](Self::load) and can be flushed with
/// [`write_logs`](Self::write_logs) afterwards.
pub struct TableLoader<O, P, S = LogSink> {
    opener: O,
    store: P,
    log: DiagnosticsLog<S>,
    config: LoaderConfig,
}

impl<O, P, S> TableLoader<O, P, S>
where
    O: SourceOpener,
    P: PersistentStore,
    S: DiagnosticSink,
{
    /// Create a loader with the default configuration.
    pub fn new(opener: O, store: P, sink: S) -> Self {
        Self::with_config(opener, store, sink, LoaderConfig::default())
    }

    /// Create a loader with a custom configuration.
    pub fn with_config(opener: O, store: P, sink: S, config: LoaderConfig) -> Self {
        Self {
            opener,
            store,
            log: DiagnosticsLog::with_capacity(config.log_capacity, sink),
            config,
        }
    }

    /// Load the table described by the map at `path`.
    ///
    /// When the map cannot be opened the persisted table is used instead,
    /// or the identity table if nothing is persisted.
    pub fn load(&mut self, path: &Path, format: Format) -> Loaded {
        self.log.clear();
        let mut table = Lut::identity();

        let mut source = match self.opener.open(path) {
            Ok(source) => source,
            Err(e) => {
                log::debug!("{}", e);
                self.log.warning(
                    DiagnosticKind::SourceUnavailable,
                    None,
                    format!("Unable to open {}! Using saved map.", path.display()),
                );
                let origin = if storage::load_table(&self.store, &mut table) {
                    TableOrigin::Persisted
                } else {
                    TableOrigin::Default
                };
                return Loaded { table, origin };
            }
        };

        let outcome =
            parser::parse_source(format, &mut source, &mut table, &mut self.log, &self.config);
        source.close();

        log::info!(
            "loaded {} map {} ({} rules, {:?})",
            format,
            path.display(),
            table.rules().count(),
            outcome
        );

        Loaded {
            table,
            origin: TableOrigin::Parsed(outcome),
        }
    }

    /// Persist `table` as the fallback for later loads.
    pub fn save(&mut self, table: &Lut) {
        storage::save_table(&mut self.store, table);
    }

    /// Replace the log file at `path` with this cycle's diagnostics.
    pub fn write_logs(&mut self, path: &Path) -> Result<()> {
        self.log.write_to_file(path)
    }

    pub fn log(&self) -> &DiagnosticsLog<S> {
        &self.log
    }

    pub fn store_mut(&mut self) -> &mut P {
        &mut self.store
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }
}
