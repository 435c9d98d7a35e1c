//! Record encoding and reading
//!
//! A record is `key_len (u32 LE) | key | val_len (u32 LE) | value`. There is
//! no header, checksum or terminator, so the only structural check possible
//! is that every declared length fits inside the file.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{CacheError, Result};

/// Size of each length prefix
pub const LEN_PREFIX_SIZE: u64 = 4;

/// A record as stored on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl RawRecord {
    /// Number of bytes the record occupies in the log
    pub fn encoded_len(&self) -> u64 {
        encoded_len(self.key.len(), self.value.len())
    }
}

/// Size of a record with the given key and value lengths
pub fn encoded_len(key_len: usize, value_len: usize) -> u64 {
    2 * LEN_PREFIX_SIZE + key_len as u64 + value_len as u64
}

/// Encode a record into a single buffer so it can be appended in one write
pub fn encode(key: &[u8], value: &[u8]) -> Result<Vec<u8>> {
    let key_len = u32::try_from(key.len())
        .map_err(|_| CacheError::Encode(format!("key too large: {} bytes", key.len())))?;
    let val_len = u32::try_from(value.len())
        .map_err(|_| CacheError::Encode(format!("value too large: {} bytes", value.len())))?;

    let mut buf = Vec::with_capacity(encoded_len(key.len(), value.len()) as usize);
    buf.extend_from_slice(&key_len.to_le_bytes());
    buf.extend_from_slice(key);
    buf.extend_from_slice(&val_len.to_le_bytes());
    buf.extend_from_slice(value);
    Ok(buf)
}

/// Write an encoded record, calling `rollback` if the write fails partway
///
/// `rollback` must restore the log to its length before the write (the
/// file appender truncates back to the record's offset). A rollback
/// failure is reported alongside the write error it follows.
pub fn write_record<W, F>(writer: &mut W, buf: &[u8], rollback: F) -> Result<()>
where
    W: Write,
    F: FnOnce() -> io::Result<()>,
{
    match writer.write_all(buf) {
        Ok(()) => Ok(()),
        Err(e) => match rollback() {
            Ok(()) => Err(e.into()),
            Err(trunc) => Err(CacheError::Io(io::Error::new(
                e.kind(),
                format!("{} (rollback failed: {})", e, trunc),
            ))),
        },
    }
}

/// Read the value of the record starting at `offset`
///
/// The key is skipped, not compared: the offset index is trusted to point
/// at the record for the key being looked up.
pub fn read_value_at(file: &mut File, offset: u64) -> Result<Vec<u8>> {
    let end = file.metadata()?.len();
    file.seek(SeekFrom::Start(offset))?;

    let key_len = read_u32(file, offset, "key length")? as u64;
    let value_pos = offset + LEN_PREFIX_SIZE + key_len + LEN_PREFIX_SIZE;
    if value_pos > end {
        return Err(CacheError::corrupt(offset, "key overruns end of log"));
    }
    file.seek(SeekFrom::Current(key_len as i64))?;

    let val_len = read_u32(file, offset, "value length")? as u64;
    if value_pos + val_len > end {
        return Err(CacheError::corrupt(offset, "value overruns end of log"));
    }

    let mut value = vec![0u8; val_len as usize];
    file.read_exact(&mut value)
        .map_err(|e| truncated(e, offset, "value"))?;
    Ok(value)
}

fn read_u32<R: Read>(reader: &mut R, offset: u64, what: &str) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader
        .read_exact(&mut buf)
        .map_err(|e| truncated(e, offset, what))?;
    Ok(u32::from_le_bytes(buf))
}

fn truncated(e: io::Error, offset: u64, what: &str) -> CacheError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        CacheError::corrupt(offset, format!("truncated {}", what))
    } else {
        CacheError::Io(e)
    }
}

// =============================================================================
// Sequential Reader
// =============================================================================

/// Reads records sequentially from the start of a log
///
/// Iteration yields `(record_offset, record)` and stops at a clean end of
/// file. A partial or overrunning record yields a single
/// [`CacheError::CorruptLog`] and ends the iteration.
pub struct RecordReader<R> {
    reader: R,
    /// Position of the next unread byte
    offset: u64,
    /// Length of the underlying log
    end: u64,
    failed: bool,
}

impl RecordReader<BufReader<File>> {
    /// Open a log file for a full scan
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let end = file.metadata()?.len();
        Ok(Self::new(BufReader::new(file), end))
    }
}

impl<R: Read> RecordReader<R> {
    /// Wrap a reader positioned at the start of a log of `end` bytes
    pub fn new(reader: R, end: u64) -> Self {
        Self {
            reader,
            offset: 0,
            end,
            failed: false,
        }
    }

    /// Offset of the next record to be read
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read the next record, or `None` at a clean end of file
    pub fn next_record(&mut self) -> Result<Option<(u64, RawRecord)>> {
        let start = self.offset;

        let mut len_buf = [0u8; 4];
        match fill(&mut self.reader, &mut len_buf)? {
            0 => return Ok(None),
            4 => {}
            n => {
                return Err(CacheError::corrupt(
                    start,
                    format!("truncated key length: {} of 4 bytes", n),
                ))
            }
        }
        self.offset += LEN_PREFIX_SIZE;
        let key_len = u32::from_le_bytes(len_buf) as u64;
        let key = self.read_field(start, "key", key_len)?;

        if self.offset + LEN_PREFIX_SIZE > self.end {
            return Err(CacheError::corrupt(start, "truncated value length"));
        }
        let val_len = read_u32(&mut self.reader, start, "value length")? as u64;
        self.offset += LEN_PREFIX_SIZE;
        let value = self.read_field(start, "value", val_len)?;

        Ok(Some((start, RawRecord { key, value })))
    }

    fn read_field(&mut self, start: u64, what: &str, len: u64) -> Result<Vec<u8>> {
        if self.offset + len > self.end {
            return Err(CacheError::corrupt(
                start,
                format!(
                    "{} length {} overruns end of log at {}",
                    what, len, self.end
                ),
            ));
        }
        let mut buf = vec![0u8; len as usize];
        self.reader
            .read_exact(&mut buf)
            .map_err(|e| truncated(e, start, what))?;
        self.offset += len;
        Ok(buf)
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<(u64, RawRecord)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.next_record().transpose();
        if matches!(item, Some(Err(_))) {
            self.failed = true;
        }
        item
    }
}

/// Fill `buf` as far as the reader allows, returning the bytes read
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut read = 0;
    while read < buf.len() {
        match reader.read(&mut buf[read..]) {
            Ok(0) => break,
            Ok(n) => read += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(read)
}
