//! JSONL writing operations.
//!
//! This module provides async, buffered writing of data in JSONL format.
//! Each value is serialized to a single JSON line followed by a newline.

use crate::error::Result;
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

/// Async writer for JSONL (JSON Lines) data.
///
/// Wraps an async writer with buffering, reducing the number of system
/// calls when writing many small records.
pub struct JsonlWriter<W> {
    writer: BufWriter<W>,
}

impl<W: AsyncWrite + Unpin> JsonlWriter<W> {
    /// Creates a new `JsonlWriter` wrapping the given async writer.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }

    /// Creates a new `JsonlWriter` with a custom buffer capacity.
    #[must_use]
    pub fn with_capacity(writer: W, capacity: usize) -> Self {
        Self {
            writer: BufWriter::with_capacity(capacity, writer),
        }
    }

    /// Serializes one value and writes it as a single JSON line.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the underlying write fails.
    pub async fn write<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        Ok(())
    }

    /// Writes every value from an iterator, one JSON line each.
    ///
    /// # Errors
    ///
    /// Returns the first serialization or IO error encountered; values
    /// before the failure may already be buffered.
    pub async fn write_all<T, I>(&mut self, values: I) -> Result<()>
    where
        T: Serialize,
        I: IntoIterator<Item = T>,
    {
        for value in values {
            self.write(&value).await?;
        }
        Ok(())
    }

    /// Flushes buffered data to the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying flush fails.
    pub async fn flush(&mut self) -> Result<()> {
        self.writer.flush().await?;
        Ok(())
    }

    /// Consumes the writer, returning the underlying buffered writer.
    ///
    /// Note: this does not flush. Call [`flush`](Self::flush) first to
    /// ensure all data is written.
    #[must_use]
    pub fn into_inner(self) -> BufWriter<W> {
        self.writer
    }
}
