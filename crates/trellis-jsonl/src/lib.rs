//! Resilient JSONL (JSON Lines) reading and crash-safe atomic writing.
//!
//! This library provides the persistence primitives used by the trellis
//! dependency engine: buffered async reading and writing of JSONL data,
//! a resilient loader that collects warnings for bad lines instead of
//! failing the whole file, and atomic whole-file writes using the
//! temp-file-then-rename pattern.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod atomic;
pub mod error;
pub mod reader;
pub mod warning;
pub mod writer;

pub use atomic::{write_jsonl_atomic, write_jsonl_atomic_iter};
pub use error::{Error, Result};
pub use reader::read_jsonl_resilient;
pub use warning::Warning;
pub use writer::JsonlWriter;
