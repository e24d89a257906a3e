//! In-memory edge store backed by `HashMap` indexes.
//!
//! All data is held in RAM and lost when the process exits unless the
//! store is wrapped with JSONL persistence (see [`load_from_jsonl`] and
//! [`save_to_jsonl`]).
//!
//! # Architecture
//!
//! - `HashMap<DependencyId, TaskDependency>` for O(1) edge lookups
//! - `HashMap<TaskId, HashSet<DependencyId>>` indexes by dependent and by
//!   blocker, so both query directions are near-O(1)
//! - Hash-based ID generation with adaptive length
//!
//! # Thread Safety
//!
//! The store is wrapped in `Arc<Mutex<_>>` for thread-safe access in async
//! contexts. Every operation holds the mutex for its full scope, which is
//! what makes batch deletes atomic with respect to other callers.

mod inner;
mod jsonl;
mod trait_impl;

use crate::storage::DependencyStore;
use inner::InMemoryStoreInner;
use std::sync::Arc;
use tokio::sync::Mutex;

// Re-export public API
pub use jsonl::{load_from_jsonl, save_to_jsonl, LoadWarning};

/// Thread-safe in-memory edge store.
pub(crate) type InMemoryStore = Arc<Mutex<InMemoryStoreInner>>;

/// Create a new in-memory edge store.
///
/// # Arguments
///
/// * `prefix` - The prefix for edge IDs (e.g., "dep")
pub fn new_in_memory_store(prefix: String) -> Box<dyn DependencyStore> {
    Box::new(Arc::new(Mutex::new(InMemoryStoreInner::new(prefix))))
}
