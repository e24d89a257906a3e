//! Implementation of the `init` command.
//!
//! This module handles initialization of a new trellis repository, creating
//! the `.trellis/` directory structure with configuration and data files.

use crate::engine::DEFAULT_MAX_BLOCKERS;
use crate::error::{Error, Result};
use crate::storage::StoreBackend;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Default task ID prefix if none specified
pub const DEFAULT_PREFIX: &str = "task";

/// Name of the trellis directory
pub const TRELLIS_DIR_NAME: &str = ".trellis";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Name of the tasks data file
pub const TASKS_FILE_NAME: &str = "tasks.jsonl";

/// Name of the dependency edges data file
pub const DEPS_FILE_NAME: &str = "deps.jsonl";

/// Minimum prefix length
pub const MIN_PREFIX_LENGTH: usize = 2;

/// Maximum prefix length
pub const MAX_PREFIX_LENGTH: usize = 20;

/// Maximum directory depth to traverse when searching for the trellis root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Configuration file structure for trellis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrellisConfig {
    /// Task ID prefix (e.g., "task" for "task-abc")
    #[serde(rename = "task-prefix")]
    pub task_prefix: String,

    /// Cap on blockers per dependent task
    #[serde(rename = "max-blockers", default = "default_max_blockers")]
    pub max_blockers: usize,

    /// Storage configuration
    pub storage: StorageConfig,
}

fn default_max_blockers() -> usize {
    DEFAULT_MAX_BLOCKERS
}

/// Storage configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// Storage backend type ("memory" for in-memory with JSONL persistence)
    pub backend: String,

    /// Path to the tasks data file, relative to the repository root
    pub tasks_file: String,

    /// Path to the dependency edges data file, relative to the repository root
    pub deps_file: String,
}

impl TrellisConfig {
    /// Create a new configuration with the given prefix
    pub fn new(prefix: &str) -> Self {
        Self {
            task_prefix: prefix.to_string(),
            max_blockers: DEFAULT_MAX_BLOCKERS,
            storage: StorageConfig {
                backend: "memory".to_string(),
                tasks_file: format!("{TRELLIS_DIR_NAME}/{TASKS_FILE_NAME}"),
                deps_file: format!("{TRELLIS_DIR_NAME}/{DEPS_FILE_NAME}"),
            },
        }
    }

    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read and `Error::Config`
    /// if it is not valid YAML.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        serde_yaml::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be written.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Resolve the edge-store backend from this configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for an unknown backend name.
    pub fn to_backend(&self, root_dir: &Path) -> Result<StoreBackend> {
        match self.storage.backend.as_str() {
            "memory" => Ok(StoreBackend::Jsonl(root_dir.join(&self.storage.deps_file))),
            other => Err(Error::Config(format!("Unknown storage backend: {other}"))),
        }
    }

    /// Resolve the tasks data file path from this configuration.
    #[must_use]
    pub fn tasks_path(&self, root_dir: &Path) -> PathBuf {
        root_dir.join(&self.storage.tasks_file)
    }
}

impl Default for TrellisConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created trellis directory
    pub trellis_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Path to the created tasks file
    pub tasks_file: PathBuf,
    /// Path to the created dependency edges file
    pub deps_file: PathBuf,
    /// The prefix used for task IDs
    pub prefix: String,
}

/// Validate task ID prefix format.
///
/// Requirements:
/// - 2-20 characters
/// - Alphanumeric only (letters and digits)
/// - No special characters or spaces
///
/// Note: Expects pre-trimmed input. Callers should trim whitespace before calling.
///
/// # Errors
///
/// Returns `Error::Config` describing the violated requirement.
pub fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.len() < MIN_PREFIX_LENGTH {
        return Err(Error::Config(format!(
            "Prefix must be at least {MIN_PREFIX_LENGTH} characters"
        )));
    }

    if prefix.len() > MAX_PREFIX_LENGTH {
        return Err(Error::Config(format!(
            "Prefix cannot exceed {MAX_PREFIX_LENGTH} characters"
        )));
    }

    if !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::Config(
            "Prefix must contain only alphanumeric characters".to_string(),
        ));
    }

    Ok(())
}

/// Initialize a new trellis repository in the given directory.
///
/// # Arguments
///
/// * `base_dir` - The base directory where `.trellis/` will be created
/// * `prefix` - Optional task ID prefix (defaults to "task")
///
/// # Errors
///
/// Returns an error if:
/// - The `.trellis/` directory already exists
/// - The prefix is invalid
/// - File system operations fail
pub async fn init(base_dir: &Path, prefix: Option<&str>) -> Result<InitResult> {
    // Trim whitespace and use the trimmed version consistently
    let prefix = prefix.unwrap_or(DEFAULT_PREFIX).trim();

    validate_prefix(prefix)?;

    let trellis_dir = base_dir.join(TRELLIS_DIR_NAME);

    if trellis_dir.exists() {
        return Err(Error::Config(format!(
            "Trellis is already initialized in this directory. Found existing '{TRELLIS_DIR_NAME}'"
        )));
    }

    fs::create_dir_all(&trellis_dir).await?;

    let config_file = trellis_dir.join(CONFIG_FILE_NAME);
    let config = TrellisConfig::new(prefix);
    config.save(&config_file).await?;

    // Empty data files so the first load finds them in place
    let tasks_file = trellis_dir.join(TASKS_FILE_NAME);
    fs::write(&tasks_file, "").await?;

    let deps_file = trellis_dir.join(DEPS_FILE_NAME);
    fs::write(&deps_file, "").await?;

    Ok(InitResult {
        trellis_dir,
        config_file,
        tasks_file,
        deps_file,
        prefix: prefix.to_string(),
    })
}

/// Check if a directory has been initialized with trellis.
///
/// Returns `true` if the `.trellis/` directory exists.
#[must_use]
pub fn is_initialized(base_dir: &Path) -> bool {
    base_dir.join(TRELLIS_DIR_NAME).exists()
}

/// Find the trellis root directory by searching up the directory tree.
///
/// Starts from the given directory and traverses parent directories
/// until a `.trellis/` directory is found, the root is reached, or
/// the maximum traversal depth is exceeded.
///
/// Returns `Some(path)` with the directory containing `.trellis/`,
/// or `None` if no trellis repository is found within the depth limit.
#[must_use]
pub fn find_trellis_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if current.join(TRELLIS_DIR_NAME).exists() {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}
