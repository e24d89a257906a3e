//! Output formatting for CLI commands.
//!
//! Supports human-readable text (with semantic colors) and JSON for
//! programmatic use. Colors honor the `NO_COLOR` convention
//! (<https://no-color.org/>) and can be forced off with `TRELLIS_COLOR=0`.

use crate::domain::{BlockState, Task, TaskDependency, TaskStatus};
use colored::Colorize;
use serde::Serialize;
use std::env;

/// Output format selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text with colors
    Text,
    /// JSON for programmatic use
    Json,
}

/// Whether colored output is enabled.
fn use_colors() -> bool {
    env::var("NO_COLOR").is_err()
        && env::var("TRELLIS_COLOR")
            .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
            .unwrap_or(true)
}

/// Serialize a value as pretty JSON to stdout.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn print_json<T: Serialize>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Apply semantic "success" color (green).
#[must_use]
pub fn success(text: &str) -> String {
    if use_colors() {
        text.green().to_string()
    } else {
        text.to_string()
    }
}

/// Apply semantic "error" color (red).
#[must_use]
pub fn error(text: &str) -> String {
    if use_colors() {
        text.red().to_string()
    } else {
        text.to_string()
    }
}

/// Apply semantic "warning" color (yellow).
#[must_use]
pub fn warning(text: &str) -> String {
    if use_colors() {
        text.yellow().to_string()
    } else {
        text.to_string()
    }
}

/// Colorize a task or dependency ID (cyan).
#[must_use]
pub fn colorize_id(id: &str) -> String {
    if use_colors() {
        id.cyan().to_string()
    } else {
        id.to_string()
    }
}

/// Colorize a task status.
#[must_use]
pub fn colorize_status(status: TaskStatus) -> String {
    let text = status.to_string();
    if !use_colors() {
        return text;
    }
    match status {
        TaskStatus::Pending => text.white().to_string(),
        TaskStatus::InProgress => text.yellow().to_string(),
        TaskStatus::Completed => text.green().to_string(),
    }
}

/// Print a task list.
pub fn print_tasks(tasks: &[Task], mode: OutputMode) -> serde_json::Result<()> {
    match mode {
        OutputMode::Json => print_json(&tasks),
        OutputMode::Text => {
            if tasks.is_empty() {
                println!("No tasks found");
                return Ok(());
            }
            for task in tasks {
                println!(
                    "{}  [{}]  {}",
                    colorize_id(task.id.as_str()),
                    colorize_status(task.status),
                    task.title
                );
            }
            Ok(())
        }
    }
}

/// Print a dependency edge list.
pub fn print_edges(edges: &[TaskDependency], mode: OutputMode) -> serde_json::Result<()> {
    match mode {
        OutputMode::Json => print_json(&edges),
        OutputMode::Text => {
            if edges.is_empty() {
                println!("No dependencies found");
                return Ok(());
            }
            for edge in edges {
                println!(
                    "{}  {} depends on {}  (by {})",
                    colorize_id(edge.id.as_str()),
                    colorize_id(edge.dependent_task_id.as_str()),
                    colorize_id(edge.blocking_task_id.as_str()),
                    edge.created_by
                );
            }
            Ok(())
        }
    }
}

/// Print a task's blocked state.
pub fn print_block_state(
    task: &Task,
    state: &BlockState,
    mode: OutputMode,
) -> serde_json::Result<()> {
    match mode {
        OutputMode::Json => print_json(&serde_json::json!({
            "taskId": task.id.as_str(),
            "title": task.title,
            "isBlocked": state.is_blocked,
            "blockingTasks": state.blocking_tasks,
        })),
        OutputMode::Text => {
            println!(
                "{}  [{}]  {}",
                colorize_id(task.id.as_str()),
                error("blocked"),
                task.title
            );
            for blocker in &state.blocking_tasks {
                println!("    waiting on {}", colorize_id(blocker.as_str()));
            }
            Ok(())
        }
    }
}
