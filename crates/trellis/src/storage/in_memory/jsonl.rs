//! JSONL persistence for the in-memory edge store.
//!
//! Loading is resilient: a bad line never fails the whole file. Instead,
//! malformed lines and edges that would violate graph invariants
//! (duplicates, self references, cycles) are skipped and reported as
//! [`LoadWarning`]s. Saving is atomic via temp-file-then-rename.

use super::inner::{sort_edges, InMemoryStoreInner};
use crate::domain::{TaskDependency, TaskId};
use crate::engine::cycle::would_create_cycle;
use crate::error::{Result, StorageError};
use crate::storage::DependencyStore;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use trellis_jsonl::{read_jsonl_resilient, write_jsonl_atomic, Warning as JsonlWarning};

/// Non-fatal problems encountered while loading an edge file.
///
/// When a warning occurs the load continues, but the offending record is
/// skipped. Applications should log these: each one is a record that was
/// silently dropped from the graph.
#[derive(Debug, Clone)]
pub enum LoadWarning {
    /// A line could not be parsed and was skipped entirely.
    MalformedLine {
        /// 1-based line number in the file
        line_number: usize,
        /// The parser's error message
        error: String,
    },

    /// A second edge with an already-loaded ID was skipped.
    DuplicateId {
        /// The colliding edge ID
        id: String,
    },

    /// A second edge for the same (dependent, blocking) pair was skipped.
    DuplicatePair {
        /// The dependent task
        dependent: TaskId,
        /// The blocking task
        blocking: TaskId,
    },

    /// An edge from a task to itself was skipped.
    SelfReference {
        /// The self-referencing task
        task: TaskId,
    },

    /// An edge that would close a cycle was skipped to keep the graph
    /// acyclic.
    CircularEdge {
        /// The dependent task
        dependent: TaskId,
        /// The blocking task
        blocking: TaskId,
    },
}

/// Load an edge store from a JSONL file.
///
/// Each line is one serialized [`TaskDependency`]. Records that violate
/// graph invariants are skipped with warnings so that a hand-edited or
/// corrupted file still yields a usable, invariant-clean store.
///
/// # Errors
///
/// Returns `Error::Storage` only for IO failures; parse and invariant
/// problems become warnings instead.
pub async fn load_from_jsonl(
    path: &Path,
    prefix: String,
) -> Result<(Box<dyn DependencyStore>, Vec<LoadWarning>)> {
    let (records, jsonl_warnings) = read_jsonl_resilient::<TaskDependency, _>(path)
        .await
        .map_err(StorageError::from)?;

    let mut warnings: Vec<LoadWarning> = jsonl_warnings
        .into_iter()
        .map(|warning| match warning {
            JsonlWarning::MalformedJson { line_number, error } => LoadWarning::MalformedLine {
                line_number,
                error,
            },
            JsonlWarning::SkippedLine {
                line_number,
                reason,
            } => LoadWarning::MalformedLine {
                line_number,
                error: reason,
            },
        })
        .collect();

    let mut inner = InMemoryStoreInner::new(prefix);
    let mut accepted: Vec<TaskDependency> = Vec::new();

    for edge in records {
        if inner.edges.contains_key(&edge.id) {
            warnings.push(LoadWarning::DuplicateId {
                id: edge.id.as_str().to_string(),
            });
            continue;
        }

        if edge.dependent_task_id == edge.blocking_task_id {
            warnings.push(LoadWarning::SelfReference {
                task: edge.dependent_task_id,
            });
            continue;
        }

        if accepted.iter().any(|existing| {
            existing.dependent_task_id == edge.dependent_task_id
                && existing.blocking_task_id == edge.blocking_task_id
        }) {
            warnings.push(LoadWarning::DuplicatePair {
                dependent: edge.dependent_task_id,
                blocking: edge.blocking_task_id,
            });
            continue;
        }

        let check = would_create_cycle(&accepted, &edge.dependent_task_id, &edge.blocking_task_id);
        if check.would_cycle {
            warnings.push(LoadWarning::CircularEdge {
                dependent: edge.dependent_task_id,
                blocking: edge.blocking_task_id,
            });
            continue;
        }

        inner.insert_edge(edge.clone());
        accepted.push(edge);
    }

    Ok((Box::new(Arc::new(Mutex::new(inner))), warnings))
}

/// Save an edge store to a JSONL file with an atomic write.
///
/// Edges are sorted by creation time for deterministic output across
/// saves, preventing spurious diffs when the file is under version
/// control.
///
/// # Errors
///
/// Returns `Error::Storage` if exporting or writing fails. On failure the
/// original file is left unchanged.
pub async fn save_to_jsonl(store: &dyn DependencyStore, path: &Path) -> Result<()> {
    let mut edges = store.list_all().await?;
    sort_edges(&mut edges);

    write_jsonl_atomic(path, &edges)
        .await
        .map_err(StorageError::from)?;
    Ok(())
}
