//! Core in-memory storage data structures.

use crate::domain::{DependencyId, TaskDependency, TaskId};
use crate::error::{Result, StorageError};
use crate::id_generation::{IdGenerator, IdGeneratorConfig};
use std::collections::{HashMap, HashSet};

/// Inner storage structure (not thread-safe).
///
/// Holds the edge records and both direction indexes. Wrapped in
/// `Arc<Mutex<_>>` for thread safety.
///
/// # Index invariant
///
/// Every edge in `edges` has exactly one entry in `by_dependent` under its
/// dependent task and one in `by_blocker` under its blocking task, and the
/// indexes contain nothing else. `insert_edge` and `remove_edge` are the
/// only mutation paths, so the invariant holds by construction.
pub(crate) struct InMemoryStoreInner {
    /// Edges indexed by ID
    pub(super) edges: HashMap<DependencyId, TaskDependency>,

    /// Edge IDs grouped by dependent task ("what blocks me")
    by_dependent: HashMap<TaskId, HashSet<DependencyId>>,

    /// Edge IDs grouped by blocking task ("what I block")
    by_blocker: HashMap<TaskId, HashSet<DependencyId>>,

    /// ID generator for new edges
    id_generator: IdGenerator,
}

impl InMemoryStoreInner {
    /// Create a new empty store
    pub(crate) fn new(prefix: String) -> Self {
        Self {
            edges: HashMap::new(),
            by_dependent: HashMap::new(),
            by_blocker: HashMap::new(),
            id_generator: IdGenerator::new(IdGeneratorConfig {
                prefix,
                database_size: 0,
            }),
        }
    }

    /// Generate a unique ID for a new edge
    pub(super) fn generate_id(&mut self, seed: &str) -> Result<DependencyId> {
        let id = self
            .id_generator
            .generate(seed)
            .map_err(|e| StorageError::InvalidFormat(format!("ID generation failed: {e}")))?;
        Ok(DependencyId::new(id))
    }

    /// Insert an edge, maintaining both direction indexes.
    pub(super) fn insert_edge(&mut self, edge: TaskDependency) {
        self.id_generator.register_id(edge.id.as_str().to_string());
        self.by_dependent
            .entry(edge.dependent_task_id.clone())
            .or_default()
            .insert(edge.id.clone());
        self.by_blocker
            .entry(edge.blocking_task_id.clone())
            .or_default()
            .insert(edge.id.clone());
        self.edges.insert(edge.id.clone(), edge);
    }

    /// Remove an edge by ID, maintaining both direction indexes.
    pub(super) fn remove_edge(&mut self, id: &DependencyId) -> Option<TaskDependency> {
        let edge = self.edges.remove(id)?;

        if let Some(ids) = self.by_dependent.get_mut(&edge.dependent_task_id) {
            ids.remove(id);
            if ids.is_empty() {
                self.by_dependent.remove(&edge.dependent_task_id);
            }
        }
        if let Some(ids) = self.by_blocker.get_mut(&edge.blocking_task_id) {
            ids.remove(id);
            if ids.is_empty() {
                self.by_blocker.remove(&edge.blocking_task_id);
            }
        }

        Some(edge)
    }

    /// All edge IDs where the task is either endpoint.
    pub(super) fn ids_touching(&self, task: &TaskId) -> Vec<DependencyId> {
        let mut ids: HashSet<DependencyId> = HashSet::new();
        if let Some(dependent_ids) = self.by_dependent.get(task) {
            ids.extend(dependent_ids.iter().cloned());
        }
        if let Some(blocker_ids) = self.by_blocker.get(task) {
            ids.extend(blocker_ids.iter().cloned());
        }
        ids.into_iter().collect()
    }

    /// Edges where the task is the dependent, ordered by creation time.
    pub(super) fn edges_for_dependent(&self, task: &TaskId) -> Vec<TaskDependency> {
        self.collect_sorted(self.by_dependent.get(task))
    }

    /// Edges where the task is the blocker, ordered by creation time.
    pub(super) fn edges_for_blocker(&self, task: &TaskId) -> Vec<TaskDependency> {
        self.collect_sorted(self.by_blocker.get(task))
    }

    /// Number of distinct blockers for a dependent task.
    pub(super) fn blocker_count(&self, task: &TaskId) -> usize {
        self.by_dependent.get(task).map_or(0, HashSet::len)
    }

    /// All edges, ordered by creation time.
    pub(super) fn all_edges(&self) -> Vec<TaskDependency> {
        let mut edges: Vec<TaskDependency> = self.edges.values().cloned().collect();
        sort_edges(&mut edges);
        edges
    }

    fn collect_sorted(&self, ids: Option<&HashSet<DependencyId>>) -> Vec<TaskDependency> {
        let mut edges: Vec<TaskDependency> = ids
            .into_iter()
            .flatten()
            .filter_map(|id| self.edges.get(id).cloned())
            .collect();
        sort_edges(&mut edges);
        edges
    }
}

/// Order edges by creation time, breaking ties by ID for determinism.
pub(super) fn sort_edges(edges: &mut [TaskDependency]) {
    edges.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
}
