//! Tests for the record format
//!
//! These tests verify:
//! - Exact on-disk layout of a record
//! - Sequential reading with record offsets
//! - Clean EOF versus truncated or overrunning records
//! - Reading a single value at an offset
//! - A failed write rolls the log back to the last whole record

use std::fs::{File, OpenOptions};
use std::cell::RefCell;
use std::io::{self, Cursor, Write};
use std::path::PathBuf;

use logcache::log::record::{self, encoded_len, read_value_at, RawRecord, RecordReader};
use logcache::CacheError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_log() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("test.log");
    (temp_dir, path)
}

fn write_raw(path: &PathBuf, bytes: &[u8]) {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .unwrap();
    file.write_all(bytes).unwrap();
}

/// Accepts `limit` bytes, then fails every write
struct ShortWriter<'a> {
    buf: &'a RefCell<Vec<u8>>,
    limit: usize,
}

impl Write for ShortWriter<'_> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buf = self.buf.borrow_mut();
        let room = self.limit.saturating_sub(buf.len());
        if room == 0 {
            return Err(io::Error::new(io::ErrorKind::Other, "no space left"));
        }
        let n = room.min(data.len());
        buf.extend_from_slice(&data[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn reader_over(bytes: Vec<u8>) -> RecordReader<Cursor<Vec<u8>>> {
    let len = bytes.len() as u64;
    RecordReader::new(Cursor::new(bytes), len)
}

// =============================================================================
// Encoding Tests
// =============================================================================

#[test]
fn test_encode_layout() {
    let bytes = record::encode(b"key", b"value").unwrap();

    let mut expected = Vec::new();
    expected.extend_from_slice(&3u32.to_le_bytes());
    expected.extend_from_slice(b"key");
    expected.extend_from_slice(&5u32.to_le_bytes());
    expected.extend_from_slice(b"value");

    assert_eq!(bytes, expected);
    assert_eq!(bytes.len() as u64, encoded_len(3, 5));
}

#[test]
fn test_encode_empty_key_and_value() {
    let bytes = record::encode(b"", b"").unwrap();

    assert_eq!(bytes, vec![0u8; 8]);
}

#[test]
fn test_raw_record_encoded_len() {
    let record = RawRecord {
        key: b"alice".to_vec(),
        value: b"{}".to_vec(),
    };

    assert_eq!(record.encoded_len(), 4 + 5 + 4 + 2);
}

// =============================================================================
// Sequential Reader Tests
// =============================================================================

#[test]
fn test_reader_empty_log() {
    let mut reader = reader_over(Vec::new());

    assert!(reader.next_record().unwrap().is_none());
}

#[test]
fn test_reader_yields_offsets() {
    let mut bytes = record::encode(b"a", b"1").unwrap();
    bytes.extend(record::encode(b"bb", b"22").unwrap());
    bytes.extend(record::encode(b"a", b"333").unwrap());

    let records: Vec<(u64, RawRecord)> = reader_over(bytes)
        .collect::<Result<_, _>>()
        .unwrap();

    let offsets: Vec<u64> = records.iter().map(|(off, _)| *off).collect();
    assert_eq!(offsets, vec![0, 10, 22]);
    assert_eq!(records[2].1.key, b"a");
    assert_eq!(records[2].1.value, b"333");
}

#[test]
fn test_reader_offset_tracks_position() {
    let mut bytes = record::encode(b"a", b"1").unwrap();
    bytes.extend(record::encode(b"bb", b"22").unwrap());
    let end = bytes.len() as u64;

    let mut reader = reader_over(bytes);
    assert_eq!(reader.offset(), 0);

    reader.next_record().unwrap().unwrap();
    assert_eq!(reader.offset(), 10);

    reader.next_record().unwrap().unwrap();
    assert!(reader.next_record().unwrap().is_none());
    assert_eq!(reader.offset(), end);
}

#[test]
fn test_reader_truncated_length_prefix() {
    let mut bytes = record::encode(b"a", b"1").unwrap();
    bytes.extend_from_slice(&[7, 0]);

    let mut reader = reader_over(bytes);
    assert!(reader.next_record().unwrap().is_some());

    match reader.next_record() {
        Err(CacheError::CorruptLog { offset, .. }) => assert_eq!(offset, 10),
        other => panic!("expected CorruptLog, got {:?}", other),
    }
}

#[test]
fn test_reader_key_overruns_end() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&100u32.to_le_bytes());
    bytes.extend_from_slice(b"short");

    let err = reader_over(bytes).next_record().unwrap_err();
    assert!(matches!(err, CacheError::CorruptLog { offset: 0, .. }));
}

#[test]
fn test_reader_missing_value_length() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&1u32.to_le_bytes());
    bytes.push(b'k');

    let err = reader_over(bytes).next_record().unwrap_err();
    assert!(matches!(err, CacheError::CorruptLog { offset: 0, .. }));
}

#[test]
fn test_reader_value_overruns_end() {
    let mut bytes = record::encode(b"k", b"value").unwrap();
    bytes.truncate(bytes.len() - 2);

    let err = reader_over(bytes).next_record().unwrap_err();
    assert!(matches!(err, CacheError::CorruptLog { offset: 0, .. }));
}

#[test]
fn test_reader_iterator_stops_after_error() {
    let mut bytes = record::encode(b"a", b"1").unwrap();
    bytes.extend_from_slice(&[1, 2, 3]);

    let mut reader = reader_over(bytes);
    assert!(matches!(reader.next(), Some(Ok(_))));
    assert!(matches!(reader.next(), Some(Err(CacheError::CorruptLog { .. }))));
    assert!(reader.next().is_none());
}

#[test]
fn test_reader_open_file() {
    let (_temp, path) = setup_temp_log();
    write_raw(&path, &record::encode(b"x", b"y").unwrap());
    write_raw(&path, &record::encode(b"z", b"w").unwrap());

    let reader = RecordReader::open(&path).unwrap();
    let keys: Vec<Vec<u8>> = reader.map(|r| r.unwrap().1.key).collect();

    assert_eq!(keys, vec![b"x".to_vec(), b"z".to_vec()]);
}

// =============================================================================
// Random Read Tests
// =============================================================================

#[test]
fn test_read_value_at_offset() {
    let (_temp, path) = setup_temp_log();
    write_raw(&path, &record::encode(b"first", b"one").unwrap());
    write_raw(&path, &record::encode(b"second", b"two").unwrap());

    let mut file = File::open(&path).unwrap();
    assert_eq!(read_value_at(&mut file, 0).unwrap(), b"one");
    assert_eq!(read_value_at(&mut file, encoded_len(5, 3)).unwrap(), b"two");
}

#[test]
fn test_read_value_at_truncated_record() {
    let (_temp, path) = setup_temp_log();
    let bytes = record::encode(b"key", b"a longer value").unwrap();
    write_raw(&path, &bytes[..bytes.len() - 4]);

    let mut file = File::open(&path).unwrap();
    let err = read_value_at(&mut file, 0).unwrap_err();
    assert!(matches!(err, CacheError::CorruptLog { offset: 0, .. }));
}

// =============================================================================
// Write Rollback Tests
// =============================================================================

#[test]
fn test_write_record_rolls_back_partial_write() {
    let first = record::encode(b"a", b"1").unwrap();
    let log = RefCell::new(first.clone());
    let mut writer = ShortWriter {
        buf: &log,
        limit: first.len() + 6,
    };

    let second = record::encode(b"bb", b"22").unwrap();
    let err = record::write_record(&mut writer, &second, || {
        log.borrow_mut().truncate(first.len());
        Ok(())
    })
    .unwrap_err();
    assert!(matches!(err, CacheError::Io(_)));
    assert_eq!(*log.borrow(), first);

    // The log is still a sequence of whole records after the failure
    let mut bytes = log.into_inner();
    bytes.extend(record::encode(b"c", b"3").unwrap());
    let keys: Vec<Vec<u8>> = reader_over(bytes)
        .map(|item| item.unwrap().1.key)
        .collect();
    assert_eq!(keys, vec![b"a".to_vec(), b"c".to_vec()]);
}

#[test]
fn test_write_record_reports_rollback_failure() {
    let log = RefCell::new(Vec::new());
    let mut writer = ShortWriter { buf: &log, limit: 3 };
    let buf = record::encode(b"a", b"1").unwrap();

    let err = record::write_record(&mut writer, &buf, || {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
    })
    .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("no space left"));
    assert!(message.contains("rollback failed"));
}

#[test]
fn test_write_record_success_skips_rollback() {
    let mut out = Vec::new();
    let buf = record::encode(b"key", b"value").unwrap();

    record::write_record(&mut out, &buf, || panic!("rollback on success")).unwrap();

    assert_eq!(out, buf);
}
