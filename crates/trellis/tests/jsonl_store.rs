//! Integration tests for JSONL-backed edge storage.
//!
//! Verifies round-trip persistence through `create_store`, rollback via
//! `reload`, and resilient loading of corrupted or invariant-violating
//! edge files.

use chrono::Utc;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};
use trellis::domain::{NewDependency, TaskId};
use trellis::storage::in_memory::{load_from_jsonl, LoadWarning};
use trellis::storage::{create_store, StoreBackend};

fn new_dep(dependent: &str, blocking: &str) -> NewDependency {
    NewDependency {
        dependent_task_id: TaskId::new(dependent),
        blocking_task_id: TaskId::new(blocking),
        created_by: "tester".to_string(),
    }
}

fn edge_json(id: &str, dependent: &str, blocking: &str) -> String {
    let now = Utc::now().to_rfc3339();
    format!(
        r#"{{"id":"{id}","dependentTaskId":"{dependent}","blockingTaskId":"{blocking}","createdBy":"tester","createdAt":"{now}"}}"#
    )
}

fn temp_jsonl(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file.flush().expect("Failed to flush temp file");
    file
}

// =============================================================================
// Round-trip persistence
// =============================================================================

#[tokio::test]
async fn edges_survive_save_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("deps.jsonl");

    let first_id;
    {
        let mut store = create_store(StoreBackend::Jsonl(path.clone()), "dep".to_string())
            .await
            .unwrap();
        let edge = store.put(new_dep("task-a", "task-b")).await.unwrap();
        store.put(new_dep("task-b", "task-c")).await.unwrap();
        store.save().await.unwrap();
        first_id = edge.id;
    }

    let store = create_store(StoreBackend::Jsonl(path), "dep".to_string())
        .await
        .unwrap();
    let edges = store.list_all().await.unwrap();
    assert_eq!(edges.len(), 2);
    assert!(store.get(&first_id).await.unwrap().is_some());
    assert_eq!(
        store
            .list_by_dependent(&TaskId::new("task-a"))
            .await
            .unwrap()
            .len(),
        1
    );
    assert_eq!(
        store
            .list_by_blocker(&TaskId::new("task-b"))
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn reload_discards_unsaved_changes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("deps.jsonl");

    let mut store = create_store(StoreBackend::Jsonl(path), "dep".to_string())
        .await
        .unwrap();
    store.put(new_dep("task-a", "task-b")).await.unwrap();
    store.save().await.unwrap();

    // Unsaved edge disappears after reload, the saved one stays
    store.put(new_dep("task-c", "task-d")).await.unwrap();
    assert_eq!(store.list_all().await.unwrap().len(), 2);

    store.reload().await.unwrap();
    let edges = store.list_all().await.unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].dependent_task_id, TaskId::new("task-a"));
}

#[tokio::test]
async fn missing_file_means_empty_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("never-created.jsonl");

    let store = create_store(StoreBackend::Jsonl(path), "dep".to_string())
        .await
        .unwrap();
    assert!(store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn in_memory_backend_saves_are_noops() {
    let mut store = create_store(StoreBackend::InMemory, "dep".to_string())
        .await
        .unwrap();
    store.put(new_dep("task-a", "task-b")).await.unwrap();
    store.save().await.unwrap();
    store.reload().await.unwrap();
    // Plain in-memory storage keeps its state through save/reload
    assert_eq!(store.list_all().await.unwrap().len(), 1);
}

// =============================================================================
// Resilient loading
// =============================================================================

#[tokio::test]
async fn malformed_lines_are_skipped_with_warnings() {
    let content = format!(
        "{}\nnot json at all\n{}\n",
        edge_json("dep-1", "task-a", "task-b"),
        edge_json("dep-2", "task-b", "task-c"),
    );
    let file = temp_jsonl(&content);

    let (store, warnings) = load_from_jsonl(file.path(), "dep".to_string())
        .await
        .unwrap();

    assert_eq!(store.list_all().await.unwrap().len(), 2);
    assert_eq!(warnings.len(), 1);
    assert!(matches!(
        warnings[0],
        LoadWarning::MalformedLine { line_number: 2, .. }
    ));
}

#[tokio::test]
async fn duplicate_ids_and_pairs_are_skipped() {
    let content = format!(
        "{}\n{}\n{}\n",
        edge_json("dep-1", "task-a", "task-b"),
        edge_json("dep-1", "task-c", "task-d"),
        edge_json("dep-2", "task-a", "task-b"),
    );
    let file = temp_jsonl(&content);

    let (store, warnings) = load_from_jsonl(file.path(), "dep".to_string())
        .await
        .unwrap();

    let edges = store.list_all().await.unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].dependent_task_id, TaskId::new("task-a"));

    assert_eq!(warnings.len(), 2);
    assert!(matches!(warnings[0], LoadWarning::DuplicateId { .. }));
    assert!(matches!(warnings[1], LoadWarning::DuplicatePair { .. }));
}

#[tokio::test]
async fn self_references_are_skipped() {
    let content = format!(
        "{}\n{}\n",
        edge_json("dep-1", "task-a", "task-a"),
        edge_json("dep-2", "task-a", "task-b"),
    );
    let file = temp_jsonl(&content);

    let (store, warnings) = load_from_jsonl(file.path(), "dep".to_string())
        .await
        .unwrap();

    assert_eq!(store.list_all().await.unwrap().len(), 1);
    assert!(matches!(warnings[0], LoadWarning::SelfReference { .. }));
}

#[tokio::test]
async fn cycle_closing_edges_are_skipped() {
    // Third line would close a -> b -> c -> a
    let content = format!(
        "{}\n{}\n{}\n",
        edge_json("dep-1", "task-a", "task-b"),
        edge_json("dep-2", "task-b", "task-c"),
        edge_json("dep-3", "task-c", "task-a"),
    );
    let file = temp_jsonl(&content);

    let (store, warnings) = load_from_jsonl(file.path(), "dep".to_string())
        .await
        .unwrap();

    assert_eq!(store.list_all().await.unwrap().len(), 2);
    assert_eq!(warnings.len(), 1);
    let LoadWarning::CircularEdge {
        dependent,
        blocking,
    } = &warnings[0]
    else {
        panic!("expected CircularEdge warning");
    };
    assert_eq!(dependent, &TaskId::new("task-c"));
    assert_eq!(blocking, &TaskId::new("task-a"));
}

#[tokio::test]
async fn store_is_fully_usable_after_resilient_load() {
    let content = format!(
        "garbage\n{}\n",
        edge_json("dep-1", "task-a", "task-b"),
    );
    let file = temp_jsonl(&content);

    let (mut store, _) = load_from_jsonl(file.path(), "dep".to_string())
        .await
        .unwrap();

    // New writes work and collide with nothing
    let edge = store.put(new_dep("task-c", "task-d")).await.unwrap();
    assert_ne!(edge.id.as_str(), "dep-1");
    assert_eq!(store.list_all().await.unwrap().len(), 2);
}
