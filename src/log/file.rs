//! Log file with offset index
//!
//! The untyped engine shared by the value log and the metadata log: an
//! append-only file plus an in-memory map from key bytes to the offset of
//! the key's latest record.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::SyncStrategy;
use crate::error::{CacheError, Result};

use super::compaction::{self, CompactionReport};
use super::record::{self, RecordReader};

/// Record counts and file size of a log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogStats {
    /// Keys currently reachable through the index
    pub live_records: usize,
    /// Records physically present in the file, live or dead
    pub total_records: u64,
    /// Size of the file in bytes (0 when it does not exist)
    pub file_bytes: u64,
}

impl LogStats {
    /// Records that compaction would drop
    pub fn dead_records(&self) -> u64 {
        self.total_records.saturating_sub(self.live_records as u64)
    }
}

/// State guarded by the log's lock
#[derive(Debug, Default)]
struct LogState {
    /// key bytes → offset of the latest record for that key
    index: HashMap<Vec<u8>, u64>,
    total_records: u64,
}

/// Append-only log file
///
/// ## Concurrency
/// One `RwLock` covers the index and every file access made through this
/// handle. Reads hold the shared lock for lookup plus file read; appends,
/// compaction and clear hold the exclusive lock for their whole duration,
/// so a reader never sees a half-written record.
///
/// Nothing coordinates two handles (or two processes) on the same path.
pub(crate) struct LogFile {
    path: PathBuf,
    sync_strategy: SyncStrategy,
    state: RwLock<LogState>,
}

impl LogFile {
    /// Create or open the log at `path` and rebuild its index
    ///
    /// Any truncated or malformed record fails the open.
    pub fn open(path: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        OpenOptions::new().create(true).append(true).open(path)?;

        let state = Self::scan(path)?;
        debug!(
            path = %path.display(),
            records = state.total_records,
            live = state.index.len(),
            "opened log"
        );

        Ok(Self {
            path: path.to_path_buf(),
            sync_strategy,
            state: RwLock::new(state),
        })
    }

    fn scan(path: &Path) -> Result<LogState> {
        let mut state = LogState::default();
        for item in RecordReader::open(path)? {
            let (offset, record) = item?;
            state.index.insert(record.key, offset);
            state.total_records += 1;
        }
        Ok(state)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the latest value stored for `key`
    pub fn read(&self, key: &[u8]) -> Result<Vec<u8>> {
        let state = self.state.read();
        let offset = *state.index.get(key).ok_or(CacheError::NotFound)?;
        let mut file = File::open(&self.path)?;
        record::read_value_at(&mut file, offset)
    }

    /// Append a record and point the index at it
    pub fn append(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let buf = record::encode(key, value)?;

        let mut state = self.state.write();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let offset = file.metadata()?.len();
        // A partial record would make every later record unreachable
        let mut writer = &file;
        if let Err(e) = record::write_record(&mut writer, &buf, || file.set_len(offset)) {
            warn!(path = %self.path.display(), offset, error = %e, "append failed");
            return Err(e);
        }
        if self.sync_strategy == SyncStrategy::EveryWrite {
            file.sync_data()?;
        }

        state.index.insert(key.to_vec(), offset);
        state.total_records += 1;
        Ok(())
    }

    /// Drop `key` from the log and rewrite the file without it
    ///
    /// Returns `None` when the key was not present; the file is then left
    /// alone. The index is only updated once the rewritten file has been
    /// renamed into place, so a failed rewrite leaves the key readable.
    pub fn remove(
        &self,
        key: &[u8],
        validate: &dyn Fn(&[u8]) -> Result<()>,
    ) -> Result<Option<CompactionReport>> {
        let mut state = self.state.write();
        if !state.index.contains_key(key) {
            return Ok(None);
        }

        let mut survivors = state.index.clone();
        survivors.remove(key);
        let report = self.rewrite(&mut state, &survivors, validate)?;
        Ok(Some(report))
    }

    /// Rewrite the file keeping only live records
    pub fn compact(&self, validate: &dyn Fn(&[u8]) -> Result<()>) -> Result<CompactionReport> {
        let mut state = self.state.write();
        let survivors = state.index.clone();
        self.rewrite(&mut state, &survivors, validate)
    }

    fn rewrite(
        &self,
        state: &mut LogState,
        survivors: &HashMap<Vec<u8>, u64>,
        validate: &dyn Fn(&[u8]) -> Result<()>,
    ) -> Result<CompactionReport> {
        let (index, report) = compaction::rewrite(&self.path, survivors, validate)?;
        state.total_records = index.len() as u64;
        state.index = index;
        info!(
            path = %self.path.display(),
            kept = report.kept,
            dropped = report.dropped,
            bytes_before = report.bytes_before,
            bytes_after = report.bytes_after,
            "compacted log"
        );
        Ok(report)
    }

    /// Delete the file and forget every key
    pub fn clear(&self) -> Result<()> {
        let mut state = self.state.write();
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        *state = LogState::default();
        info!(path = %self.path.display(), "cleared log");
        Ok(())
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.state.read().index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.state.read().index.len()
    }

    /// Live keys in log order
    pub fn keys(&self) -> Vec<Vec<u8>> {
        let state = self.state.read();
        let mut keys: Vec<(&Vec<u8>, u64)> =
            state.index.iter().map(|(k, &off)| (k, off)).collect();
        keys.sort_by_key(|&(_, off)| off);
        keys.into_iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn stats(&self) -> Result<LogStats> {
        let state = self.state.read();
        let file_bytes = match fs::metadata(&self.path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
            Err(e) => return Err(e.into()),
        };
        Ok(LogStats {
            live_records: state.index.len(),
            total_records: state.total_records,
            file_bytes,
        })
    }
}
