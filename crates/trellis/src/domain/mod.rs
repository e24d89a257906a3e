//! Domain types for the task dependency graph.
//!
//! This module contains the core types of the trellis engine: task and
//! dependency identifiers, the dependency edge record, task status, and
//! the result types for cycle pre-flight checks and blocked-state
//! classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a task.
///
/// Task records themselves are owned by the task repository; the engine
/// only ever handles their identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl TaskId {
    /// Create a new task ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a dependency edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependencyId(pub String);

impl DependencyId {
    /// Create a new dependency ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DependencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DependencyId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DependencyId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A finish-to-start dependency edge between two tasks.
///
/// Meaning: the dependent task cannot start until the blocking task is
/// completed. Edges are immutable after creation; they are only ever
/// deleted, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDependency {
    /// Unique identifier for this edge
    pub id: DependencyId,

    /// The task that is blocked (cannot start yet)
    pub dependent_task_id: TaskId,

    /// The task that must complete first
    pub blocking_task_id: TaskId,

    /// Who created the edge
    pub created_by: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new dependency edge.
#[derive(Debug, Clone)]
pub struct NewDependency {
    /// The task that will be blocked
    pub dependent_task_id: TaskId,

    /// The task that must complete first
    pub blocking_task_id: TaskId,

    /// Who is creating the edge
    pub created_by: String,
}

/// Status of a task, as reported by the task repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Task has not been started
    Pending,

    /// Task is currently being worked on
    InProgress,

    /// Task has been completed
    Completed,
}

impl TaskStatus {
    /// Returns `true` for [`TaskStatus::Completed`].
    #[must_use]
    pub fn is_completed(self) -> bool {
        self == Self::Completed
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        };
        write!(f, "{s}")
    }
}

/// A task record, owned by the task repository.
///
/// The engine never reads anything beyond `id` and `status`; the rest is
/// application glue for the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Task title
    pub title: String,

    /// Current status
    pub status: TaskStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Result of a cycle pre-flight check.
///
/// When `would_cycle` is true, `path` holds the existing chain of tasks
/// from the proposed blocking task to the proposed dependent task, for
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleCheck {
    /// Whether adding the proposed edge would create a cycle
    pub would_cycle: bool,

    /// The offending chain, when a cycle was found
    pub path: Option<Vec<TaskId>>,
}

impl CycleCheck {
    /// A check result that found no cycle.
    #[must_use]
    pub fn clear() -> Self {
        Self {
            would_cycle: false,
            path: None,
        }
    }

    /// A check result that found a cycle along the given chain.
    #[must_use]
    pub fn cycle(path: Vec<TaskId>) -> Self {
        Self {
            would_cycle: true,
            path: Some(path),
        }
    }
}

/// Blocked-state classification for a task.
///
/// Soft block: this only classifies, it never prevents a status
/// transition. The UI layer decides whether to warn-and-allow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockState {
    /// Whether at least one blocker is not yet completed
    pub is_blocked: bool,

    /// The incomplete blockers
    pub blocking_tasks: Vec<TaskId>,
}

impl BlockState {
    /// An unblocked state with no outstanding blockers.
    #[must_use]
    pub fn unblocked() -> Self {
        Self {
            is_blocked: false,
            blocking_tasks: Vec::new(),
        }
    }
}
