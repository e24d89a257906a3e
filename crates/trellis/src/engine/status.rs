//! Blocked-state resolution.
//!
//! A task is blocked when at least one of its blockers is not completed.
//! This is a soft block: resolution only classifies, it never prevents a
//! status transition. The CLI warns and proceeds.

use crate::domain::{BlockState, TaskDependency, TaskId};
use crate::error::Result;
use crate::tasks::TaskRepository;
use std::sync::Arc;

/// Resolves the blocked state of tasks against the task repository.
pub struct StatusResolver {
    tasks: Arc<dyn TaskRepository>,
}

impl StatusResolver {
    /// Create a resolver over the given task repository.
    pub fn new(tasks: Arc<dyn TaskRepository>) -> Self {
        Self { tasks }
    }

    /// Classify a task's blocked state from its blocker edges.
    ///
    /// `blocker_edges` must be the edges where the task is the dependent.
    /// A blocker that no longer exists in the repository is skipped with a
    /// warning rather than treated as blocking; a dangling reference
    /// should never freeze a task forever.
    ///
    /// # Errors
    ///
    /// Returns `Error::Storage` if the repository cannot be queried.
    pub async fn resolve(
        &self,
        task: &TaskId,
        blocker_edges: &[TaskDependency],
    ) -> Result<BlockState> {
        let mut blocking_tasks = Vec::new();

        for edge in blocker_edges {
            let blocker = &edge.blocking_task_id;
            match self.tasks.task_status(blocker).await? {
                Some(status) if !status.is_completed() => {
                    blocking_tasks.push(blocker.clone());
                }
                Some(_) => {}
                None => {
                    tracing::warn!(
                        task = %task,
                        blocker = %blocker,
                        "blocker no longer exists, ignoring for blocked-state resolution"
                    );
                }
            }
        }

        Ok(BlockState {
            is_blocked: !blocking_tasks.is_empty(),
            blocking_tasks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DependencyId, TaskStatus};
    use crate::tasks::JsonlTaskStore;
    use chrono::Utc;

    fn edge_to(dependent: &TaskId, blocking: &TaskId) -> TaskDependency {
        TaskDependency {
            id: DependencyId::new(format!("dep-{dependent}-{blocking}")),
            dependent_task_id: dependent.clone(),
            blocking_task_id: blocking.clone(),
            created_by: "test".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn unblocked_when_no_edges() {
        let store = JsonlTaskStore::in_memory("task".to_string());
        let resolver = StatusResolver::new(Arc::new(store));

        let state = resolver.resolve(&TaskId::new("task-1"), &[]).await.unwrap();
        assert_eq!(state, BlockState::unblocked());
    }

    #[tokio::test]
    async fn blocked_by_incomplete_blockers_only() {
        let store = JsonlTaskStore::in_memory("task".to_string());
        let dependent = store.create("dependent").await.unwrap();
        let done = store.create("done").await.unwrap();
        let pending = store.create("pending").await.unwrap();
        store
            .set_status(&done.id, TaskStatus::Completed)
            .await
            .unwrap();

        let edges = vec![edge_to(&dependent.id, &done.id), edge_to(&dependent.id, &pending.id)];
        let resolver = StatusResolver::new(Arc::new(store));

        let state = resolver.resolve(&dependent.id, &edges).await.unwrap();
        assert!(state.is_blocked);
        assert_eq!(state.blocking_tasks, vec![pending.id]);
    }

    #[tokio::test]
    async fn missing_blocker_is_skipped() {
        let store = JsonlTaskStore::in_memory("task".to_string());
        let dependent = store.create("dependent").await.unwrap();

        let edges = vec![edge_to(&dependent.id, &TaskId::new("task-gone"))];
        let resolver = StatusResolver::new(Arc::new(store));

        let state = resolver.resolve(&dependent.id, &edges).await.unwrap();
        assert!(!state.is_blocked);
        assert!(state.blocking_tasks.is_empty());
    }
}
