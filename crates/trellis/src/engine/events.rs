//! Engine event notifications.
//!
//! Events are published on a `tokio::sync::broadcast` channel and only
//! reach subscribers who registered beforehand via
//! [`DependencyEngine::subscribe`](crate::engine::DependencyEngine::subscribe).
//! Publishing never blocks engine operations: if nobody is listening the
//! send is a no-op.

use crate::domain::TaskId;

/// A change notification from the dependency engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphEvent {
    /// The edge set changed (edges created or deleted). Carries every
    /// task whose blocked state may have changed as a result.
    EdgesChanged {
        /// Tasks touched by the change
        tasks: Vec<TaskId>,
    },

    /// A task's status changed, which may unblock or re-block its
    /// dependents.
    TaskStatusChanged {
        /// The task whose status changed
        task: TaskId,
    },
}
