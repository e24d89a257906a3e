//! Error types for the trellis dependency engine.
//!
//! Every domain-rule violation carries a stable machine-readable code (see
//! [`Error::code`]) so the UI layer can map errors to localized messages
//! without parsing display strings. Storage failures propagate unchanged
//! as `STORAGE_UNAVAILABLE` and are never swallowed.

use crate::domain::{DependencyId, TaskId};
use std::io;
use thiserror::Error;

/// The error type for trellis operations.
#[derive(Debug, Error)]
pub enum Error {
    /// One of the referenced tasks does not exist in the task repository.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// A task may not depend on itself.
    #[error("a task cannot depend on itself: {0}")]
    SelfReference(TaskId),

    /// An identical (dependent, blocking) edge already exists.
    #[error("dependency already exists: {dependent} depends on {blocking}")]
    Duplicate {
        /// The dependent task
        dependent: TaskId,
        /// The blocking task
        blocking: TaskId,
    },

    /// The dependent task already has the maximum number of blockers.
    #[error("task {task} already has the maximum of {limit} blockers")]
    LimitExceeded {
        /// The dependent task
        task: TaskId,
        /// The configured blocker limit
        limit: usize,
    },

    /// The proposed edge would create a cycle. Carries the offending chain
    /// of tasks for diagnostics.
    #[error("dependency would create a cycle: {}", format_cycle_path(.path))]
    Circular {
        /// Chain of tasks from the proposed blocking task to the proposed
        /// dependent task
        path: Vec<TaskId>,
    },

    /// Delete of a dependency edge that does not exist.
    #[error("dependency not found: {0}")]
    DependencyNotFound(DependencyId),

    /// The storage medium failed.
    #[error("storage unavailable: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error (CLI layer).
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error occurred (CLI layer).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Returns the stable, machine-readable code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::TaskNotFound(_) => "TASK_NOT_FOUND",
            Self::SelfReference(_) => "SELF_REFERENCE",
            Self::Duplicate { .. } => "DUPLICATE",
            Self::LimitExceeded { .. } => "LIMIT_EXCEEDED",
            Self::Circular { .. } => "CIRCULAR",
            Self::DependencyNotFound(_) => "NOT_FOUND",
            Self::Storage(_) | Self::Io(_) => "STORAGE_UNAVAILABLE",
            Self::Config(_) => "CONFIG",
        }
    }
}

/// Failures of the underlying storage medium.
#[derive(Debug, Error)]
pub enum StorageError {
    /// IO error while reading or writing the data file.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The data file did not have the expected format.
    #[error("invalid data format: {0}")]
    InvalidFormat(String),
}

impl From<trellis_jsonl::Error> for StorageError {
    fn from(e: trellis_jsonl::Error) -> Self {
        match e {
            trellis_jsonl::Error::Io(io_err) => Self::Io(io_err),
            trellis_jsonl::Error::Json(json_err) => Self::Serialization(json_err),
            trellis_jsonl::Error::InvalidFormat(msg) => Self::InvalidFormat(msg),
        }
    }
}

impl From<trellis_jsonl::Error> for Error {
    fn from(e: trellis_jsonl::Error) -> Self {
        Self::Storage(e.into())
    }
}

/// Renders a cycle path as a readable chain, e.g. `task-a -> task-b -> task-a`.
fn format_cycle_path(path: &[TaskId]) -> String {
    path.iter()
        .map(TaskId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// A specialized Result type for trellis operations.
pub type Result<T> = std::result::Result<T, Error>;
