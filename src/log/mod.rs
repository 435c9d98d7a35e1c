//! Log Module
//!
//! Append-only, log-structured storage with an in-memory offset index.
//!
//! ## Responsibilities
//! - Append one record per write, never rewriting in place
//! - Rebuild the offset index by replaying the file on open
//! - Reclaim dead records by synchronous compaction
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │ Record 1                                        │
//! │ ┌───────────┬─────────┬───────────┬──────────┐  │
//! │ │KeyLen (4) │   Key   │ValLen (4) │  Value   │  │
//! │ └───────────┴─────────┴───────────┴──────────┘  │
//! ├─────────────────────────────────────────────────┤
//! │ Record 2 ...                                    │
//! └─────────────────────────────────────────────────┘
//! ```
//! Lengths are little-endian `u32`. There is no header, magic, version or
//! checksum; the file is a bare sequence of records up to EOF.

mod compaction;
mod file;
pub mod record;
mod store;

pub use compaction::{temp_path, CompactionReport};
pub use file::LogStats;
pub use record::{RawRecord, RecordReader};
pub use store::LogStore;

pub(crate) use file::LogFile;
