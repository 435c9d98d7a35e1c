//! logcache CLI
//!
//! Offline inspection and maintenance of a cache log file. Keys and values
//! are taken and shown as UTF-8 text; binary bytes are printed lossily.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use logcache::codec::RawCodec;
use logcache::log::RecordReader;
use logcache::{LogStore, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// logcache CLI
#[derive(Parser, Debug)]
#[command(name = "logcache")]
#[command(about = "Inspect and maintain logcache log files")]
#[command(version)]
struct Args {
    /// Log file to operate on
    #[arg(short, long)]
    file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show record counts and file size
    Stats,

    /// List live keys in log order
    Keys,

    /// List every record in the file, live or dead
    Dump,

    /// Print the value stored for a key
    Get {
        /// The key to get
        key: String,
    },

    /// Append a value for a key
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Remove a key and compact the log
    Remove {
        /// The key to remove
        key: String,
    },

    /// Rewrite the log keeping only live records
    Compact,

    /// Delete the log file
    Clear,
}

type RawStore = LogStore<Vec<u8>, Vec<u8>>;

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,logcache=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::debug!("logcache v{}", logcache::VERSION);

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let path = args.file.as_path();

    match args.command {
        Commands::Dump => dump(path)?,
        Commands::Stats => {
            let store = open(path)?;
            let stats = store.stats()?;
            println!("file:          {}", store.path().display());
            println!("file bytes:    {}", stats.file_bytes);
            println!("records:       {}", stats.total_records);
            println!("live records:  {}", stats.live_records);
            println!("dead records:  {}", stats.dead_records());
        }
        Commands::Keys => {
            let store = open(path)?;
            for key in store.keys()? {
                println!("{}", String::from_utf8_lossy(&key));
            }
        }
        Commands::Get { key } => match open(path)?.get(&key.into_bytes()) {
            Ok(value) => println!("{}", String::from_utf8_lossy(&value)),
            Err(e) if e.is_not_found() => {
                println!("(not found)");
            }
            Err(e) => return Err(e),
        },
        Commands::Set { key, value } => {
            open(path)?.set(&key.into_bytes(), &value.into_bytes())?;
        }
        Commands::Remove { key } => {
            open(path)?.remove(&key.into_bytes())?;
        }
        Commands::Compact => {
            let report = open(path)?.compact()?;
            println!(
                "kept {} records, dropped {}, {} -> {} bytes",
                report.kept, report.dropped, report.bytes_before, report.bytes_after
            );
        }
        Commands::Clear => {
            open(path)?.clear()?;
        }
    }

    Ok(())
}

fn open(path: &Path) -> Result<RawStore> {
    LogStore::open(path, Arc::new(RawCodec), Arc::new(RawCodec))
}

/// Print every record without building an index, so dead records show too
fn dump(path: &Path) -> Result<()> {
    let mut reader = RecordReader::open(path)?;
    let mut records = 0usize;
    while let Some((offset, record)) = reader.next_record()? {
        println!(
            "{:>10}  {}  ({} bytes)",
            offset,
            String::from_utf8_lossy(&record.key),
            record.value.len()
        );
        records += 1;
    }
    println!("{} records, end of log at {}", records, reader.offset());
    Ok(())
}
