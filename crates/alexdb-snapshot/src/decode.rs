//! Gzip JSONL shard reading
//!
//! A shard is a gz-compressed file of one JSON record per line. Lines
//! that fail to parse are reported per-line so the caller can count
//! them and keep going; a failing read (truncated or corrupt gzip
//! stream) ends the shard with an error.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use serde::de::DeserializeOwned;

use alexdb_core::{DecodeError, StageError};

/// Streaming line reader over one gz shard.
pub struct ShardReader {
    path: PathBuf,
    reader: BufReader<MultiGzDecoder<File>>,
    line_no: usize,
    buf: String,
}

impl ShardReader {
    pub fn open(path: &Path) -> Result<Self, StageError> {
        let file = File::open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(MultiGzDecoder::new(file)),
            line_no: 0,
            buf: String::with_capacity(16 * 1024),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lines read so far.
    pub fn lines_read(&self) -> usize {
        self.line_no
    }

    /// Read the next non-empty line. `Ok(None)` at end of stream; an
    /// `Err` means the compressed stream itself is unreadable.
    pub fn next_line(&mut self) -> Result<Option<&str>, StageError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            if !self.buf.trim().is_empty() {
                return Ok(Some(self.buf.trim()));
            }
        }
    }

    /// Parse the next line into `T`, returning the raw line alongside.
    ///
    /// A malformed line yields `Ok(Some(Err(..)))` with its shard and
    /// line number so the caller can count it and continue.
    pub fn next_record<T: DeserializeOwned>(
        &mut self,
    ) -> Result<Option<Result<(T, String), DecodeError>>, StageError> {
        let line = match self.next_line()? {
            None => return Ok(None),
            Some(line) => line.to_string(),
        };
        match sonic_rs::from_str::<T>(&line) {
            Ok(record) => Ok(Some(Ok((record, line)))),
            Err(e) => Ok(Some(Err(DecodeError {
                shard: self.path.clone(),
                line: self.line_no,
                message: e.to_string(),
            }))),
        }
    }
}
