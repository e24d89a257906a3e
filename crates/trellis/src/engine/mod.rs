//! The dependency engine: validation, queries and cascades over the edge
//! store.
//!
//! All domain rules live here, not in storage. An edge is only handed to
//! the store after every validation gate passes, in a fixed order:
//! task existence, self-reference, duplicate, blocker limit, cycle. A
//! rejected edge leaves the store untouched.
//!
//! The engine also publishes [`GraphEvent`]s on a broadcast channel so
//! interested parties (the CLI today, a watcher tomorrow) can react to
//! edge and status changes. Subscription is explicit; without it, no
//! events are delivered.

pub mod cycle;
mod events;
mod status;

pub use events::GraphEvent;
pub use status::StatusResolver;

use crate::domain::{
    BlockState, CycleCheck, DependencyId, NewDependency, TaskDependency, TaskId,
};
use crate::error::{Error, Result};
use crate::storage::DependencyStore;
use crate::tasks::TaskRepository;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Default cap on blockers per dependent task.
pub const DEFAULT_MAX_BLOCKERS: usize = 10;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Coordinates the edge store, the task repository and the validation
/// rules of the dependency graph.
pub struct DependencyEngine {
    store: Box<dyn DependencyStore>,
    tasks: Arc<dyn TaskRepository>,
    resolver: StatusResolver,
    max_blockers: usize,
    events: broadcast::Sender<GraphEvent>,
}

impl DependencyEngine {
    /// Create an engine over the given store and task repository, with the
    /// default blocker limit.
    pub fn new(store: Box<dyn DependencyStore>, tasks: Arc<dyn TaskRepository>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            resolver: StatusResolver::new(Arc::clone(&tasks)),
            tasks,
            max_blockers: DEFAULT_MAX_BLOCKERS,
            events,
        }
    }

    /// Override the blocker limit.
    #[must_use]
    pub fn with_max_blockers(mut self, max_blockers: usize) -> Self {
        self.max_blockers = max_blockers;
        self
    }

    /// Subscribe to engine events. Only events published after this call
    /// are delivered.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<GraphEvent> {
        self.events.subscribe()
    }

    /// Create a dependency edge after running every validation gate.
    ///
    /// # Errors
    ///
    /// In gate order: `Error::TaskNotFound` if either task is missing,
    /// `Error::SelfReference` for an edge from a task to itself,
    /// `Error::Duplicate` for an already-present (dependent, blocking)
    /// pair, `Error::LimitExceeded` when the dependent is at the blocker
    /// cap, and `Error::Circular` (with the offending chain) when the edge
    /// would close a cycle. `Error::Storage` if persistence fails.
    pub async fn create_dependency(&mut self, new: NewDependency) -> Result<TaskDependency> {
        let dependent = &new.dependent_task_id;
        let blocking = &new.blocking_task_id;

        if !self.tasks.task_exists(dependent).await? {
            return Err(Error::TaskNotFound(dependent.clone()));
        }
        if !self.tasks.task_exists(blocking).await? {
            return Err(Error::TaskNotFound(blocking.clone()));
        }

        if dependent == blocking {
            return Err(Error::SelfReference(dependent.clone()));
        }

        let existing = self.store.list_by_dependent(dependent).await?;
        if existing
            .iter()
            .any(|edge| &edge.blocking_task_id == blocking)
        {
            return Err(Error::Duplicate {
                dependent: dependent.clone(),
                blocking: blocking.clone(),
            });
        }

        if existing.len() >= self.max_blockers {
            return Err(Error::LimitExceeded {
                task: dependent.clone(),
                limit: self.max_blockers,
            });
        }

        let snapshot = self.store.list_all().await?;
        let check = cycle::would_create_cycle(&snapshot, dependent, blocking);
        if check.would_cycle {
            return Err(Error::Circular {
                path: check.path.unwrap_or_default(),
            });
        }

        let edge = self.store.put(new).await?;
        self.publish_edges_changed(vec![
            edge.dependent_task_id.clone(),
            edge.blocking_task_id.clone(),
        ]);
        Ok(edge)
    }

    /// Delete a single edge by ID, returning the removed record.
    ///
    /// # Errors
    ///
    /// Returns `Error::DependencyNotFound` if no such edge exists.
    pub async fn delete_dependency(&mut self, id: &DependencyId) -> Result<TaskDependency> {
        let Some(edge) = self.store.get(id).await? else {
            return Err(Error::DependencyNotFound(id.clone()));
        };

        self.store.delete_by_id(id).await?;
        self.publish_edges_changed(vec![
            edge.dependent_task_id.clone(),
            edge.blocking_task_id.clone(),
        ]);
        Ok(edge)
    }

    /// Cascade delete: remove every edge where the task is either
    /// endpoint, as one atomic batch. Returns the number of edges removed.
    ///
    /// The task repository's delete path must call this so that removing a
    /// task never strands edges pointing at it. Deleting for a task with
    /// no edges is a successful no-op.
    ///
    /// # Errors
    ///
    /// Returns `Error::Storage` if the batch cannot be applied.
    pub async fn delete_dependencies_for_task(&mut self, task: &TaskId) -> Result<usize> {
        let mut touched: Vec<TaskId> = self
            .store
            .list_by_dependent(task)
            .await?
            .into_iter()
            .map(|edge| edge.blocking_task_id)
            .chain(
                self.store
                    .list_by_blocker(task)
                    .await?
                    .into_iter()
                    .map(|edge| edge.dependent_task_id),
            )
            .collect();

        let removed = self.store.delete_touching(task).await?;
        if removed > 0 {
            touched.push(task.clone());
            self.publish_edges_changed(touched);
        }
        Ok(removed)
    }

    /// Edges where the task is the dependent: everything that blocks it.
    ///
    /// # Errors
    ///
    /// Returns `Error::Storage` if the store cannot be queried.
    pub async fn dependencies_for_task(&self, task: &TaskId) -> Result<Vec<TaskDependency>> {
        self.store.list_by_dependent(task).await
    }

    /// Edges where the task is the blocker: everything it holds up.
    ///
    /// # Errors
    ///
    /// Returns `Error::Storage` if the store cannot be queried.
    pub async fn tasks_blocked_by(&self, task: &TaskId) -> Result<Vec<TaskDependency>> {
        self.store.list_by_blocker(task).await
    }

    /// Every edge in the graph, ordered by creation time.
    ///
    /// # Errors
    ///
    /// Returns `Error::Storage` if the store cannot be queried.
    pub async fn all_dependencies(&self) -> Result<Vec<TaskDependency>> {
        self.store.list_all().await
    }

    /// Number of blockers the task currently has.
    ///
    /// # Errors
    ///
    /// Returns `Error::Storage` if the store cannot be queried.
    pub async fn dependency_count(&self, task: &TaskId) -> Result<usize> {
        self.store.count_for_dependent(task).await
    }

    /// Pre-flight cycle check: would `dependent -> blocking` close a
    /// cycle against the current edge set?
    ///
    /// Purely advisory. It does not require either task to exist and
    /// never modifies anything; `create_dependency` re-checks at commit
    /// time.
    ///
    /// # Errors
    ///
    /// Returns `Error::Storage` if the store cannot be queried.
    pub async fn would_create_cycle(
        &self,
        dependent: &TaskId,
        blocking: &TaskId,
    ) -> Result<CycleCheck> {
        let snapshot = self.store.list_all().await?;
        Ok(cycle::would_create_cycle(&snapshot, dependent, blocking))
    }

    /// Resolve a task's blocked state from its current blockers.
    ///
    /// # Errors
    ///
    /// Returns `Error::Storage` if the store or repository cannot be
    /// queried.
    pub async fn block_state(&self, task: &TaskId) -> Result<BlockState> {
        let edges = self.store.list_by_dependent(task).await?;
        self.resolver.resolve(task, &edges).await
    }

    /// Publish a status-change notification for a task.
    ///
    /// The engine does not own task status, so the application calls this
    /// after changing one.
    pub fn notify_status_changed(&self, task: &TaskId) {
        // Err just means nobody is subscribed
        let _ = self.events.send(GraphEvent::TaskStatusChanged {
            task: task.clone(),
        });
    }

    /// Persist the edge store to its backing file, if it has one.
    ///
    /// # Errors
    ///
    /// Returns `Error::Storage` if the write fails.
    pub async fn save(&self) -> Result<()> {
        self.store.save().await
    }

    fn publish_edges_changed(&self, mut tasks: Vec<TaskId>) {
        tasks.sort();
        tasks.dedup();
        let _ = self.events.send(GraphEvent::EdgesChanged { tasks });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::in_memory::new_in_memory_store;
    use crate::tasks::JsonlTaskStore;

    async fn engine_with_tasks(names: &[&str]) -> (DependencyEngine, Vec<TaskId>) {
        let tasks = JsonlTaskStore::in_memory("task");
        let mut ids = Vec::new();
        for name in names {
            ids.push(tasks.create(*name).await.unwrap().id);
        }
        let engine = DependencyEngine::new(
            new_in_memory_store("dep".to_string()),
            Arc::new(tasks),
        );
        (engine, ids)
    }

    fn dep(dependent: &TaskId, blocking: &TaskId) -> NewDependency {
        NewDependency {
            dependent_task_id: dependent.clone(),
            blocking_task_id: blocking.clone(),
            created_by: "test".to_string(),
        }
    }

    #[tokio::test]
    async fn create_requires_both_tasks() {
        let (mut engine, ids) = engine_with_tasks(&["a"]).await;
        let ghost = TaskId::new("task-ghost");

        let result = engine.create_dependency(dep(&ids[0], &ghost)).await;
        assert!(matches!(result, Err(Error::TaskNotFound(ref t)) if *t == ghost));

        let result = engine.create_dependency(dep(&ghost, &ids[0])).await;
        assert!(matches!(result, Err(Error::TaskNotFound(_))));
    }

    #[tokio::test]
    async fn create_rejects_self_reference() {
        let (mut engine, ids) = engine_with_tasks(&["a"]).await;
        let result = engine.create_dependency(dep(&ids[0], &ids[0])).await;
        assert!(matches!(result, Err(Error::SelfReference(_))));
        assert!(engine.all_dependencies().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_duplicate_pair() {
        let (mut engine, ids) = engine_with_tasks(&["a", "b"]).await;
        engine.create_dependency(dep(&ids[0], &ids[1])).await.unwrap();

        let result = engine.create_dependency(dep(&ids[0], &ids[1])).await;
        assert!(matches!(result, Err(Error::Duplicate { .. })));
        assert_eq!(engine.all_dependencies().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn subscribers_receive_edge_events() {
        let (mut engine, ids) = engine_with_tasks(&["a", "b"]).await;
        let mut receiver = engine.subscribe();

        engine.create_dependency(dep(&ids[0], &ids[1])).await.unwrap();

        let event = receiver.recv().await.unwrap();
        let GraphEvent::EdgesChanged { tasks } = event else {
            panic!("expected EdgesChanged");
        };
        assert!(tasks.contains(&ids[0]));
        assert!(tasks.contains(&ids[1]));
    }

    #[tokio::test]
    async fn status_notifications_reach_subscribers() {
        let (engine, ids) = engine_with_tasks(&["a"]).await;
        let mut receiver = engine.subscribe();

        engine.notify_status_changed(&ids[0]);
        assert_eq!(
            receiver.recv().await.unwrap(),
            GraphEvent::TaskStatusChanged {
                task: ids[0].clone()
            }
        );
    }
}
