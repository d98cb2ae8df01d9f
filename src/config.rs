//! Loader configuration.

use crate::diagnostics::DEFAULT_LOG_CAPACITY;

/// Largest tabular map accepted by default, in bytes.
pub const DEFAULT_MAX_TABULAR_SIZE: u64 = 4096;

/// Configuration for the [`TableLoader`](crate::loader::TableLoader).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Tabular sources larger than this are rejected outright.
    pub max_tabular_size: u64,
    /// Capacity of the accumulated diagnostics text.
    pub log_capacity: usize,
    /// Whether the first tabular row is a header.
    pub tabular_header: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_tabular_size: DEFAULT_MAX_TABULAR_SIZE,
            log_capacity: DEFAULT_LOG_CAPACITY,
            tabular_header: true,
        }
    }
}

impl LoaderConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum tabular source size.
    pub fn with_max_tabular_size(mut self, max_tabular_size: u64) -> Self {
        self.max_tabular_size = max_tabular_size;
        self
    }

    /// Set the diagnostics text capacity.
    pub fn with_log_capacity(mut self, log_capacity: usize) -> Self {
        self.log_capacity = log_capacity;
        self
    }

    /// Set whether tabular maps start with a header row.
    pub fn with_tabular_header(mut self, tabular_header: bool) -> Self {
        self.tabular_header = tabular_header;
        self
    }
}
