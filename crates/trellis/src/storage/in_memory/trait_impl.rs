//! `DependencyStore` trait implementation for the in-memory store.

use super::InMemoryStore;
use crate::domain::{DependencyId, NewDependency, TaskDependency, TaskId};
use crate::error::{Error, Result};
use crate::storage::DependencyStore;
use async_trait::async_trait;
use chrono::Utc;

#[async_trait]
impl DependencyStore for InMemoryStore {
    async fn put(&mut self, new: NewDependency) -> Result<TaskDependency> {
        let mut inner = self.lock().await;

        let seed = format!(
            "{}|{}|{}",
            new.dependent_task_id, new.blocking_task_id, new.created_by
        );
        let id = inner.generate_id(&seed)?;

        let edge = TaskDependency {
            id,
            dependent_task_id: new.dependent_task_id,
            blocking_task_id: new.blocking_task_id,
            created_by: new.created_by,
            created_at: Utc::now(),
        };
        inner.insert_edge(edge.clone());

        Ok(edge)
    }

    async fn delete_by_id(&mut self, id: &DependencyId) -> Result<()> {
        let mut inner = self.lock().await;
        inner
            .remove_edge(id)
            .map(|_| ())
            .ok_or_else(|| Error::DependencyNotFound(id.clone()))
    }

    async fn delete_touching(&mut self, task: &TaskId) -> Result<usize> {
        // One lock scope for the whole batch: all-or-nothing with respect
        // to other callers.
        let mut inner = self.lock().await;
        let ids = inner.ids_touching(task);
        for id in &ids {
            inner.remove_edge(id);
        }
        Ok(ids.len())
    }

    async fn get(&self, id: &DependencyId) -> Result<Option<TaskDependency>> {
        let inner = self.lock().await;
        Ok(inner.edges.get(id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<TaskDependency>> {
        let inner = self.lock().await;
        Ok(inner.all_edges())
    }

    async fn list_by_dependent(&self, task: &TaskId) -> Result<Vec<TaskDependency>> {
        let inner = self.lock().await;
        Ok(inner.edges_for_dependent(task))
    }

    async fn list_by_blocker(&self, task: &TaskId) -> Result<Vec<TaskDependency>> {
        let inner = self.lock().await;
        Ok(inner.edges_for_blocker(task))
    }

    async fn count_for_dependent(&self, task: &TaskId) -> Result<usize> {
        let inner = self.lock().await;
        Ok(inner.blocker_count(task))
    }

    async fn save(&self) -> Result<()> {
        // Plain in-memory storage has no backing file
        Ok(())
    }

    async fn reload(&mut self) -> Result<()> {
        // Plain in-memory storage has no backing file
        Ok(())
    }
}
