//! Task repository: the external collaborator the engine queries.
//!
//! The dependency engine never owns tasks. It only asks two questions:
//! does a task exist, and what is its status. Those questions are the
//! [`TaskRepository`] trait. The engine's side of the bargain is the
//! deletion hook: the repository's delete path must run the cascade
//! (`DependencyEngine::delete_dependencies_for_task`) before or within
//! its own delete, so no dangling edges survive.
//!
//! [`JsonlTaskStore`] is the minimal CRUD store used by the CLI and by
//! tests: a `HashMap` behind a `tokio::sync::Mutex`, optionally persisted
//! to a JSONL file with atomic writes.

use crate::domain::{Task, TaskId, TaskStatus};
use crate::error::{Error, Result};
use crate::id_generation::{IdGenerator, IdGeneratorConfig};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use trellis_jsonl::{read_jsonl_resilient, write_jsonl_atomic, Warning};

/// Read-side view of the task store, consumed by the dependency engine.
///
/// Implementations must be `Send + Sync`; the engine holds them behind an
/// `Arc<dyn TaskRepository>`.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Returns whether a task with the given ID exists.
    async fn task_exists(&self, id: &TaskId) -> Result<bool>;

    /// Returns the task's status, or `None` if the task does not exist.
    async fn task_status(&self, id: &TaskId) -> Result<Option<TaskStatus>>;
}

struct TaskStoreInner {
    tasks: HashMap<TaskId, Task>,
    id_generator: IdGenerator,
}

impl TaskStoreInner {
    fn new(prefix: String) -> Self {
        Self {
            tasks: HashMap::new(),
            id_generator: IdGenerator::new(IdGeneratorConfig {
                prefix,
                database_size: 0,
            }),
        }
    }
}

/// Task store backed by a `HashMap`, optionally persisted to JSONL.
///
/// Cloning is cheap and shares the underlying state, so the same store can
/// be handed to the engine as an `Arc<dyn TaskRepository>` while the CLI
/// keeps a handle for CRUD operations.
#[derive(Clone)]
pub struct JsonlTaskStore {
    inner: Arc<Mutex<TaskStoreInner>>,
    path: Option<PathBuf>,
}

impl JsonlTaskStore {
    /// Create an ephemeral in-memory task store.
    #[must_use]
    pub fn in_memory(prefix: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TaskStoreInner::new(prefix.into()))),
            path: None,
        }
    }

    /// Load a task store from a JSONL file.
    ///
    /// Malformed lines are skipped; the returned warnings describe them.
    /// A missing file yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns `Error::Storage` if the file exists but cannot be read.
    pub async fn load(path: &Path, prefix: impl Into<String>) -> Result<(Self, Vec<Warning>)> {
        let mut inner = TaskStoreInner::new(prefix.into());
        let mut warnings = Vec::new();

        if path.exists() {
            let (tasks, load_warnings) = read_jsonl_resilient::<Task, _>(path)
                .await
                .map_err(crate::error::StorageError::from)?;
            warnings = load_warnings;

            for task in tasks {
                if inner.tasks.contains_key(&task.id) {
                    tracing::warn!(task_id = %task.id, "skipping duplicate task record");
                    continue;
                }
                inner.id_generator.register_id(task.id.as_str().to_string());
                inner.tasks.insert(task.id.clone(), task);
            }
        }

        Ok((
            Self {
                inner: Arc::new(Mutex::new(inner)),
                path: Some(path.to_path_buf()),
            },
            warnings,
        ))
    }

    /// Persist all tasks to the backing JSONL file.
    ///
    /// No-op for in-memory stores. The write is atomic.
    ///
    /// # Errors
    ///
    /// Returns `Error::Storage` if the write fails.
    pub async fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let inner = self.inner.lock().await;
        let mut tasks: Vec<Task> = inner.tasks.values().cloned().collect();
        // Deterministic file contents across saves
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        write_jsonl_atomic(path, &tasks)
            .await
            .map_err(crate::error::StorageError::from)?;
        Ok(())
    }

    /// Create a new task with the given title, initially pending.
    ///
    /// # Errors
    ///
    /// Returns `Error::Storage` if ID generation fails.
    pub async fn create(&self, title: impl Into<String>) -> Result<Task> {
        let title = title.into();
        let mut inner = self.inner.lock().await;

        let id = inner
            .id_generator
            .generate(&title)
            .map_err(|e| crate::error::StorageError::InvalidFormat(e.to_string()))?;

        let now = Utc::now();
        let task = Task {
            id: TaskId::new(id),
            title,
            status: TaskStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        inner.tasks.insert(task.id.clone(), task.clone());
        Ok(task)
    }

    /// Change a task's status.
    ///
    /// # Errors
    ///
    /// Returns `Error::TaskNotFound` if the task does not exist.
    pub async fn set_status(&self, id: &TaskId, status: TaskStatus) -> Result<Task> {
        let mut inner = self.inner.lock().await;
        let task = inner
            .tasks
            .get_mut(id)
            .ok_or_else(|| Error::TaskNotFound(id.clone()))?;
        task.status = status;
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    /// Remove a task, returning the removed record.
    ///
    /// Callers must run the dependency cascade first; this method only
    /// removes the task record itself.
    ///
    /// # Errors
    ///
    /// Returns `Error::TaskNotFound` if the task does not exist.
    pub async fn remove(&self, id: &TaskId) -> Result<Task> {
        let mut inner = self.inner.lock().await;
        inner
            .tasks
            .remove(id)
            .ok_or_else(|| Error::TaskNotFound(id.clone()))
    }

    /// Get a task by ID.
    ///
    /// # Errors
    ///
    /// Infallible for the in-memory store; the `Result` mirrors the trait.
    pub async fn get(&self, id: &TaskId) -> Result<Option<Task>> {
        let inner = self.inner.lock().await;
        Ok(inner.tasks.get(id).cloned())
    }

    /// List all tasks, oldest first.
    ///
    /// # Errors
    ///
    /// Infallible for the in-memory store; the `Result` mirrors the trait.
    pub async fn list(&self) -> Result<Vec<Task>> {
        let inner = self.inner.lock().await;
        let mut tasks: Vec<Task> = inner.tasks.values().cloned().collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(tasks)
    }
}

#[async_trait]
impl TaskRepository for JsonlTaskStore {
    async fn task_exists(&self, id: &TaskId) -> Result<bool> {
        let inner = self.inner.lock().await;
        Ok(inner.tasks.contains_key(id))
    }

    async fn task_status(&self, id: &TaskId) -> Result<Option<TaskStatus>> {
        let inner = self.inner.lock().await;
        Ok(inner.tasks.get(id).map(|task| task.status))
    }
}
