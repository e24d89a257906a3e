//! Storage abstraction for dependency edges (the Graph Storage Adapter).
//!
//! This module provides the core storage trait and factory for creating
//! edge-store backends:
//!
//! - **In-memory**: fast, ephemeral storage backed by `HashMap` indexes
//! - **JSONL**: the in-memory store plus atomic file persistence
//!
//! # Architecture
//!
//! The storage layer uses an async trait so blocking (in-memory) and truly
//! async backends share one interface. The trait is object-safe, allowing
//! dynamic dispatch via `Box<dyn DependencyStore>`.
//!
//! Edges are indexed three ways — by id, by dependent task and by blocking
//! task — so both query directions ("what blocks X" / "what does X block")
//! are near-O(1) lookups.
//!
//! # Atomicity
//!
//! Every trait method is atomic for its scope: a single edge for `put` and
//! `delete_by_id`, a single batch for `delete_touching`. The in-memory
//! implementation serializes all access through one `tokio::sync::Mutex`,
//! which is what makes a batch delete all-or-nothing.

use crate::domain::{DependencyId, NewDependency, TaskDependency, TaskId};
use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub mod in_memory;

/// Core storage trait for dependency edges.
///
/// Implementations must be `Send + Sync` to support concurrent access in
/// async contexts.
///
/// # Error Handling
///
/// Storage medium failures surface as `Error::Storage` and are never
/// swallowed. Domain-rule validation (duplicates, cycles, limits) is the
/// engine's job, not the store's; the store only guarantees index
/// consistency and atomicity.
#[async_trait]
pub trait DependencyStore: Send + Sync {
    /// Persist a new edge, assigning its ID and creation timestamp.
    ///
    /// Returns the stored record. The store assigns IDs because the ID
    /// generator's collision state lives next to the data.
    ///
    /// # Errors
    ///
    /// Returns `Error::Storage` if the edge cannot be persisted.
    async fn put(&mut self, new: NewDependency) -> Result<TaskDependency>;

    /// Delete a single edge by ID.
    ///
    /// # Errors
    ///
    /// Returns `Error::DependencyNotFound` if no such edge exists.
    async fn delete_by_id(&mut self, id: &DependencyId) -> Result<()>;

    /// Delete every edge where the task is either endpoint, as one atomic
    /// batch. Returns the number of edges removed (possibly zero).
    ///
    /// # Errors
    ///
    /// Returns `Error::Storage` if the batch cannot be applied; on error
    /// no edges have been removed.
    async fn delete_touching(&mut self, task: &TaskId) -> Result<usize>;

    /// Get an edge by ID.
    async fn get(&self, id: &DependencyId) -> Result<Option<TaskDependency>>;

    /// List every edge, ordered by creation time.
    async fn list_all(&self) -> Result<Vec<TaskDependency>>;

    /// List edges where the task is the dependent ("what blocks me").
    async fn list_by_dependent(&self, task: &TaskId) -> Result<Vec<TaskDependency>>;

    /// List edges where the task is the blocker ("what I block").
    async fn list_by_blocker(&self, task: &TaskId) -> Result<Vec<TaskDependency>>;

    /// Count of distinct blockers for the given dependent task.
    async fn count_for_dependent(&self, task: &TaskId) -> Result<usize>;

    /// Save changes to persistent storage.
    ///
    /// Takes `&self` so callers can save after read-only queries;
    /// implementations use interior mutability. No-op for the plain
    /// in-memory backend.
    async fn save(&self) -> Result<()>;

    /// Reload state from persistent storage, discarding in-memory changes.
    ///
    /// Restores the store to match the on-disk state. Essential when a
    /// `save()` fails and in-memory state must be rolled back to disk.
    /// No-op for the plain in-memory backend.
    async fn reload(&mut self) -> Result<()>;
}

/// Storage backend configuration.
#[derive(Debug, Clone)]
pub enum StoreBackend {
    /// In-memory storage (ephemeral)
    InMemory,

    /// JSONL file storage (persistent)
    Jsonl(PathBuf),
}

impl StoreBackend {
    /// Returns the data file path for file-based backends.
    #[must_use]
    pub fn data_path(&self) -> Option<&Path> {
        match self {
            Self::Jsonl(path) => Some(path),
            Self::InMemory => None,
        }
    }
}

/// Wrapper that adds JSONL file persistence to the in-memory store.
///
/// `save()` writes all edges to the JSONL file atomically; `reload()`
/// re-reads the file and replaces the inner store.
struct JsonlBackedStore {
    inner: Box<dyn DependencyStore>,
    path: PathBuf,
    prefix: String,
}

#[async_trait]
impl DependencyStore for JsonlBackedStore {
    async fn put(&mut self, new: NewDependency) -> Result<TaskDependency> {
        self.inner.put(new).await
    }

    async fn delete_by_id(&mut self, id: &DependencyId) -> Result<()> {
        self.inner.delete_by_id(id).await
    }

    async fn delete_touching(&mut self, task: &TaskId) -> Result<usize> {
        self.inner.delete_touching(task).await
    }

    async fn get(&self, id: &DependencyId) -> Result<Option<TaskDependency>> {
        self.inner.get(id).await
    }

    async fn list_all(&self) -> Result<Vec<TaskDependency>> {
        self.inner.list_all().await
    }

    async fn list_by_dependent(&self, task: &TaskId) -> Result<Vec<TaskDependency>> {
        self.inner.list_by_dependent(task).await
    }

    async fn list_by_blocker(&self, task: &TaskId) -> Result<Vec<TaskDependency>> {
        self.inner.list_by_blocker(task).await
    }

    async fn count_for_dependent(&self, task: &TaskId) -> Result<usize> {
        self.inner.count_for_dependent(task).await
    }

    async fn save(&self) -> Result<()> {
        in_memory::save_to_jsonl(self.inner.as_ref(), &self.path).await
    }

    async fn reload(&mut self) -> Result<()> {
        if self.path.exists() {
            let (new_store, warnings) =
                in_memory::load_from_jsonl(&self.path, self.prefix.clone()).await?;
            for warning in &warnings {
                tracing::warn!(warning = ?warning, "JSONL reload warning");
            }
            self.inner = new_store;
        } else {
            // File doesn't exist - reset to empty storage
            self.inner = in_memory::new_in_memory_store(self.prefix.clone());
        }
        Ok(())
    }
}

/// Create a dependency store for the given backend.
///
/// # Arguments
///
/// * `backend` - The storage backend to use
/// * `prefix` - The prefix for generated edge IDs (e.g., "dep")
///
/// # Errors
///
/// Returns `Error::Storage` if a file-based backend fails to load.
pub async fn create_store(backend: StoreBackend, prefix: String) -> Result<Box<dyn DependencyStore>> {
    match backend {
        StoreBackend::InMemory => Ok(in_memory::new_in_memory_store(prefix)),
        StoreBackend::Jsonl(path) => {
            let inner = if path.exists() {
                let (store, warnings) = in_memory::load_from_jsonl(&path, prefix.clone()).await?;
                for warning in &warnings {
                    // Log but continue - the store is still usable
                    tracing::warn!(warning = ?warning, "JSONL load warning");
                }
                store
            } else {
                // First run - start empty
                in_memory::new_in_memory_store(prefix.clone())
            };
            Ok(Box::new(JsonlBackedStore {
                inner,
                path,
                prefix,
            }))
        }
    }
}
