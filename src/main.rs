//! dmxlut - DMX channel remap table loader
//!
//! Parses a map file into a remap table and prints the resulting rules.
//!
//! # Usage
//!
//! ```bash
//! dmxlut stage.csv --format tabular --store lut.bin --save --log-file lut.log
//! ```

use std::path::PathBuf;

use clap::Parser;
use dmx_lut::{
    error::Result, FileStore, Format, FsOpener, LoaderConfig, LogSink, Slot, TableLoader,
    TableOrigin,
};

/// DMX channel remap table loader
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the map file
    #[arg(value_name = "MAP_FILE")]
    map_file: PathBuf,

    /// Map file format
    #[arg(short, long, value_enum, default_value_t = Format::Directive)]
    format: Format,

    /// Store image holding the fallback table
    #[arg(long, value_name = "IMAGE", default_value = "lut.bin")]
    store: PathBuf,

    /// Persist the loaded table to the store image
    #[arg(long)]
    save: bool,

    /// Write this run's diagnostics to a file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Maximum tabular map size in bytes
    #[arg(long, default_value_t = dmx_lut::config::DEFAULT_MAX_TABULAR_SIZE)]
    max_size: u64,

    /// Tabular maps have no header row
    #[arg(long)]
    no_header: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    let store = FileStore::open(&args.store)?;
    let config = LoaderConfig::new()
        .with_max_tabular_size(args.max_size)
        .with_tabular_header(!args.no_header);
    let mut loader = TableLoader::with_config(FsOpener, store, LogSink, config);

    // Load the table
    let loaded = loader.load(&args.map_file, args.format);

    match loaded.origin {
        TableOrigin::Parsed(outcome) => println!("# parsed {} ({:?})", args.map_file.display(), outcome),
        TableOrigin::Persisted => println!("# using saved map from {}", args.store.display()),
        TableOrigin::Default => println!("# no saved map, using identity"),
    }

    for (channel, slot) in loaded.table.rules() {
        match slot {
            Slot::MappedFrom(input) => println!("{:>3} <- {}", channel, input),
            Slot::Constant(value) => println!("{:>3} =  {}", channel, value),
            Slot::Identity => {}
        }
    }

    if args.save && matches!(loaded.origin, TableOrigin::Parsed(_)) {
        loader.save(&loaded.table);
        loader.store_mut().commit()?;
    }

    if let Some(path) = &args.log_file {
        loader.write_logs(path)?;
    }

    Ok(())
}
