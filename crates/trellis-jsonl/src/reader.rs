//! JSONL reading operations.
//!
//! This module provides async, buffered, line-by-line reading of JSONL
//! files with line number tracking for error reporting, plus a resilient
//! whole-file loader that skips bad lines and collects [`Warning`]s.

use crate::error::Result;
use crate::warning::Warning;
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Async reader for JSONL (JSON Lines) data.
///
/// Wraps an async reader with buffering and tracks line numbers so parse
/// errors can point at the offending line.
pub struct JsonlReader<R> {
    reader: BufReader<R>,
    /// 1-based after the first line is read; 0 before any lines are read.
    line_number: usize,
}

impl<R: AsyncRead + Unpin> JsonlReader<R> {
    /// Creates a new `JsonlReader` wrapping the given async reader.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
        }
    }

    /// Creates a new `JsonlReader` with a custom buffer capacity.
    #[must_use]
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader: BufReader::with_capacity(capacity, reader),
            line_number: 0,
        }
    }

    /// Returns the line number of the last line read (0 before any read).
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Reads the next record, deserializing it from one JSON line.
    ///
    /// Blank lines are skipped. Returns `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// Returns an error on IO failure or if the line is not valid JSON for
    /// `T`. Use [`read_jsonl_resilient`] when bad lines should be skipped
    /// rather than aborting.
    pub async fn read_record<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        loop {
            let mut line = String::new();
            let bytes = self.reader.read_line(&mut line).await?;
            if bytes == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            return Ok(Some(serde_json::from_str(trimmed)?));
        }
    }

    /// Consumes the reader, returning the underlying buffered reader.
    #[must_use]
    pub fn into_inner(self) -> BufReader<R> {
        self.reader
    }
}

/// Reads an entire JSONL file, skipping lines that fail to parse.
///
/// Each line is deserialized into `T`. Lines that are not valid JSON, or
/// that are valid JSON but do not match `T`'s shape, are skipped and
/// reported as [`Warning`]s. Blank lines are ignored silently.
///
/// # Errors
///
/// Returns an error only for IO failures (file missing, unreadable).
/// Parse failures never abort the load.
pub async fn read_jsonl_resilient<T, P>(path: P) -> Result<(Vec<T>, Vec<Warning>)>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref()).await?;
    let mut lines = BufReader::new(file).lines();

    let mut records = Vec::new();
    let mut warnings = Vec::new();
    let mut line_number = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match serde_json::from_str::<T>(trimmed) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(line_number, error = %e, "skipping malformed JSONL line");
                warnings.push(Warning::MalformedJson {
                    line_number,
                    error: e.to_string(),
                });
            }
        }
    }

    Ok((records, warnings))
}
