//! Log compaction
//!
//! Copies the live record of every surviving key into a sibling temp file,
//! then renames the temp file over the log. The rename is the only commit
//! point: until it happens the original file is untouched, and a failed
//! rewrite or rename deletes the temp file.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{CacheError, Result};

use super::record;

/// Outcome of one compaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompactionReport {
    /// Records copied into the new file
    pub kept: usize,
    /// Surviving keys whose record could not be read or decoded
    pub dropped: usize,
    pub bytes_before: u64,
    pub bytes_after: u64,
}

/// Path of the temp file used while compacting `path`
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("log"));
    name.push(".compact");
    path.with_file_name(name)
}

/// Rewrite `path` with one record per surviving key, in log order
///
/// `validate` receives each value before it is copied; a value it rejects,
/// like one that cannot be read, is dropped with a warning instead of
/// failing the whole rewrite. Returns the index of the new file.
pub(super) fn rewrite(
    path: &Path,
    survivors: &HashMap<Vec<u8>, u64>,
    validate: &dyn Fn(&[u8]) -> Result<()>,
) -> Result<(HashMap<Vec<u8>, u64>, CompactionReport)> {
    let bytes_before = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    let tmp = temp_path(path);

    let result = write_survivors(path, &tmp, survivors, validate).and_then(|written| {
        fs::rename(&tmp, path)?;
        Ok(written)
    });
    match result {
        Ok((index, mut report)) => {
            report.bytes_before = bytes_before;
            Ok((index, report))
        }
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            Err(e)
        }
    }
}

fn write_survivors(
    path: &Path,
    tmp: &Path,
    survivors: &HashMap<Vec<u8>, u64>,
    validate: &dyn Fn(&[u8]) -> Result<()>,
) -> Result<(HashMap<Vec<u8>, u64>, CompactionReport)> {
    let mut ordered: Vec<(&Vec<u8>, u64)> =
        survivors.iter().map(|(k, &off)| (k, off)).collect();
    ordered.sort_by_key(|&(_, off)| off);

    let mut source = if ordered.is_empty() {
        None
    } else {
        Some(File::open(path)?)
    };

    let mut writer = BufWriter::new(File::create(tmp)?);
    let mut index = HashMap::with_capacity(ordered.len());
    let mut report = CompactionReport::default();
    let mut position = 0u64;

    for (key, offset) in ordered {
        let Some(file) = source.as_mut() else { break };
        let value = match record::read_value_at(file, offset)
            .and_then(|value| validate(&value).map(|()| value))
        {
            Ok(value) => value,
            Err(e) => {
                warn!(offset, error = %e, "dropping unreadable record during compaction");
                report.dropped += 1;
                continue;
            }
        };

        let buf = record::encode(key, &value)?;
        writer.write_all(&buf)?;
        index.insert(key.clone(), position);
        position += buf.len() as u64;
        report.kept += 1;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| CacheError::Io(e.into_error()))?;
    file.sync_all()?;

    report.bytes_after = position;
    Ok((index, report))
}
