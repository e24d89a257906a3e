//! Application context for CLI command execution.
//!
//! This module provides the `App` struct that wires configuration, the
//! task store and the dependency engine together for CLI commands.
//!
//! # Example
//!
//! ```no_run
//! use trellis::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_directory(Path::new(".")).await?;
//!     // Execute commands using app...
//!     Ok(())
//! }
//! ```

use crate::commands::init::{find_trellis_root, TrellisConfig, CONFIG_FILE_NAME, TRELLIS_DIR_NAME};
use crate::engine::DependencyEngine;
use crate::error::{Error, Result};
use crate::storage::create_store;
use crate::tasks::JsonlTaskStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// ID prefix for dependency edges. Fixed rather than configurable so edge
/// IDs stay distinguishable from task IDs regardless of the task prefix.
const DEP_PREFIX: &str = "dep";

/// Application context for CLI operations.
///
/// Loads configuration from the trellis directory on creation, then holds
/// the dependency engine and a handle to the task store for the lifetime
/// of a command.
pub struct App {
    /// The dependency engine over the configured edge store
    engine: DependencyEngine,

    /// Task CRUD store, also registered with the engine as its repository
    tasks: JsonlTaskStore,

    /// Path to the trellis directory (.trellis)
    trellis_dir: PathBuf,

    /// Task ID prefix from configuration
    prefix: String,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("trellis_dir", &self.trellis_dir)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl App {
    /// Create an App instance from the given working directory.
    ///
    /// Searches up the directory tree to find a `.trellis/` directory,
    /// loads configuration, and initializes the task store and engine.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No trellis repository is found in the directory tree
    /// - Configuration cannot be loaded
    /// - Storage initialization fails
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        let root_dir = find_trellis_root(working_dir).ok_or_else(|| {
            Error::Config(
                "Not a trellis repository (run 'trellis init' to create one)".to_string(),
            )
        })?;

        let trellis_dir = root_dir.join(TRELLIS_DIR_NAME);
        let config_path = trellis_dir.join(CONFIG_FILE_NAME);

        let config = TrellisConfig::load(&config_path).await?;

        let tasks_path = config.tasks_path(&root_dir);
        let (tasks, warnings) = JsonlTaskStore::load(&tasks_path, &config.task_prefix).await?;
        for warning in &warnings {
            tracing::warn!(warning = %warning, "task file load warning");
        }

        let backend = config.to_backend(&root_dir)?;
        let store = create_store(backend, DEP_PREFIX.to_string()).await?;

        let engine = DependencyEngine::new(store, Arc::new(tasks.clone()))
            .with_max_blockers(config.max_blockers);

        Ok(Self {
            engine,
            tasks,
            trellis_dir,
            prefix: config.task_prefix,
        })
    }

    /// Get a reference to the dependency engine.
    pub fn engine(&self) -> &DependencyEngine {
        &self.engine
    }

    /// Get a mutable reference to the dependency engine.
    pub fn engine_mut(&mut self) -> &mut DependencyEngine {
        &mut self.engine
    }

    /// Get a handle to the task store.
    pub fn tasks(&self) -> &JsonlTaskStore {
        &self.tasks
    }

    /// Get the task ID prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Get the path to the trellis directory.
    pub fn trellis_dir(&self) -> &Path {
        &self.trellis_dir
    }

    /// Save both stores to persistent storage.
    ///
    /// This should be called after any mutating operations.
    ///
    /// Edges are written before tasks: if the edge write fails, the task
    /// file is left at its previous state, so a cascade-then-remove that
    /// could not persist its edge deletions also keeps the task on disk.
    /// The reverse order could durably record a task removal while its
    /// edges survived in the edge file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Storage` if either write fails. On error, nothing
    /// later in the write sequence has been touched.
    pub async fn save(&self) -> Result<()> {
        self.engine.save().await?;
        self.tasks.save().await
    }
}
