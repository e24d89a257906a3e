//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands. Domain
//! errors are rendered with their stable code (e.g. `[CIRCULAR]`) so
//! scripts can match on them without parsing message text.

use anyhow::Result;

use super::args::{BlockedArgs, DepAction, DepArgs, InitArgs, TaskAction, TaskArgs};
use crate::app::App;
use crate::domain::{DependencyId, NewDependency, TaskId, TaskStatus};
use crate::error::Error;
use crate::output::{self, OutputMode};

/// Attach the stable error code to a domain error before it crosses the
/// anyhow boundary.
fn domain_error(e: Error) -> anyhow::Error {
    anyhow::anyhow!("[{}] {}", e.code(), e)
}

/// Execute the init command
pub async fn execute_init(args: &InitArgs) -> Result<()> {
    use crate::commands::init;

    let current_dir = std::env::current_dir()?;

    let result = init::init(&current_dir, args.prefix.as_deref())
        .await
        .map_err(domain_error)?;

    if !args.quiet {
        println!("Initialized trellis in {}", result.trellis_dir.display());
        println!("  Config: {}", result.config_file.display());
        println!("  Tasks:  {}", result.tasks_file.display());
        println!("  Deps:   {}", result.deps_file.display());
        println!("  Task prefix: {}", result.prefix);
    }

    Ok(())
}

/// Execute a task subcommand
pub async fn execute_task(app: &mut App, args: &TaskArgs, output_mode: OutputMode) -> Result<()> {
    match &args.action {
        TaskAction::Add { title } => {
            let task = app.tasks().create(title.clone()).await.map_err(domain_error)?;
            app.save().await.map_err(domain_error)?;

            match output_mode {
                OutputMode::Json => output::print_json(&task)?,
                OutputMode::Text => {
                    println!("Created task: {}", output::colorize_id(task.id.as_str()));
                }
            }
            Ok(())
        }
        TaskAction::Start { task_id } => {
            set_task_status(app, task_id, TaskStatus::InProgress, output_mode).await
        }
        TaskAction::Done { task_id } => {
            set_task_status(app, task_id, TaskStatus::Completed, output_mode).await
        }
        TaskAction::Reopen { task_id } => {
            set_task_status(app, task_id, TaskStatus::Pending, output_mode).await
        }
        TaskAction::Rm { task_id } => execute_task_rm(app, task_id, output_mode).await,
        TaskAction::List => {
            let tasks = app.tasks().list().await.map_err(domain_error)?;
            output::print_tasks(&tasks, output_mode)?;
            Ok(())
        }
    }
}

/// Change a task's status, warning (but not failing) when the task is
/// still blocked.
async fn set_task_status(
    app: &mut App,
    task_id: &str,
    status: TaskStatus,
    output_mode: OutputMode,
) -> Result<()> {
    let id = TaskId::new(task_id);

    if status == TaskStatus::InProgress {
        let state = app.engine().block_state(&id).await.map_err(domain_error)?;
        if state.is_blocked && output_mode == OutputMode::Text {
            eprintln!(
                "{}",
                output::warning(&format!(
                    "warning: {} is still blocked by {}",
                    id,
                    state
                        .blocking_tasks
                        .iter()
                        .map(|t| t.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            );
        }
    }

    let task = app
        .tasks()
        .set_status(&id, status)
        .await
        .map_err(domain_error)?;
    app.engine().notify_status_changed(&id);
    app.save().await.map_err(domain_error)?;

    match output_mode {
        OutputMode::Json => output::print_json(&task)?,
        OutputMode::Text => {
            println!(
                "{} is now {}",
                output::colorize_id(task.id.as_str()),
                output::colorize_status(task.status)
            );
        }
    }
    Ok(())
}

/// Remove a task, cascading over every edge touching it.
async fn execute_task_rm(app: &mut App, task_id: &str, output_mode: OutputMode) -> Result<()> {
    let id = TaskId::new(task_id);

    let task = app
        .tasks()
        .get(&id)
        .await
        .map_err(domain_error)?
        .ok_or_else(|| domain_error(Error::TaskNotFound(id.clone())))?;

    // Cascade first so no edge outlives the task record
    let removed_edges = app
        .engine_mut()
        .delete_dependencies_for_task(&id)
        .await
        .map_err(domain_error)?;
    app.tasks().remove(&id).await.map_err(domain_error)?;
    app.save().await.map_err(domain_error)?;

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({
            "removed": task.id.as_str(),
            "removedEdges": removed_edges,
        }))?,
        OutputMode::Text => {
            println!(
                "Removed {} and {} {}",
                output::colorize_id(task.id.as_str()),
                removed_edges,
                if removed_edges == 1 {
                    "dependency"
                } else {
                    "dependencies"
                }
            );
        }
    }
    Ok(())
}

/// Execute a dep subcommand
pub async fn execute_dep(app: &mut App, args: &DepArgs, output_mode: OutputMode) -> Result<()> {
    match &args.action {
        DepAction::Add {
            dependent,
            blocking,
            by,
        } => {
            let edge = app
                .engine_mut()
                .create_dependency(NewDependency {
                    dependent_task_id: TaskId::new(dependent.as_str()),
                    blocking_task_id: TaskId::new(blocking.as_str()),
                    created_by: by.clone(),
                })
                .await
                .map_err(domain_error)?;
            app.save().await.map_err(domain_error)?;

            match output_mode {
                OutputMode::Json => output::print_json(&edge)?,
                OutputMode::Text => {
                    println!(
                        "{} {} now depends on {}",
                        output::colorize_id(edge.id.as_str()),
                        output::colorize_id(edge.dependent_task_id.as_str()),
                        output::colorize_id(edge.blocking_task_id.as_str())
                    );
                }
            }
            Ok(())
        }
        DepAction::Rm { dep_id } => {
            let edge = app
                .engine_mut()
                .delete_dependency(&DependencyId::new(dep_id.as_str()))
                .await
                .map_err(domain_error)?;
            app.save().await.map_err(domain_error)?;

            match output_mode {
                OutputMode::Json => output::print_json(&edge)?,
                OutputMode::Text => {
                    println!(
                        "Removed {} ({} no longer depends on {})",
                        output::colorize_id(edge.id.as_str()),
                        output::colorize_id(edge.dependent_task_id.as_str()),
                        output::colorize_id(edge.blocking_task_id.as_str())
                    );
                }
            }
            Ok(())
        }
        DepAction::List { task_id, reverse } => {
            let edges = match task_id {
                Some(task_id) => {
                    let id = TaskId::new(task_id.as_str());
                    if *reverse {
                        app.engine().tasks_blocked_by(&id).await
                    } else {
                        app.engine().dependencies_for_task(&id).await
                    }
                }
                None => app.engine().all_dependencies().await,
            }
            .map_err(domain_error)?;

            output::print_edges(&edges, output_mode)?;
            Ok(())
        }
        DepAction::Check {
            dependent,
            blocking,
        } => {
            let check = app
                .engine()
                .would_create_cycle(&TaskId::new(dependent.as_str()), &TaskId::new(blocking.as_str()))
                .await
                .map_err(domain_error)?;

            match output_mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "wouldCycle": check.would_cycle,
                    "path": check.path,
                }))?,
                OutputMode::Text => {
                    if check.would_cycle {
                        let chain = check
                            .path
                            .unwrap_or_default()
                            .iter()
                            .map(TaskId::as_str)
                            .collect::<Vec<_>>()
                            .join(" -> ");
                        println!("{} {chain}", output::error("would create a cycle:"));
                    } else {
                        println!("{}", output::success("no cycle"));
                    }
                }
            }
            Ok(())
        }
    }
}

/// Execute the blocked command
pub async fn execute_blocked(app: &App, _args: &BlockedArgs, output_mode: OutputMode) -> Result<()> {
    let tasks = app.tasks().list().await.map_err(domain_error)?;

    let mut blocked = Vec::new();
    for task in tasks {
        if task.status.is_completed() {
            continue;
        }
        let state = app
            .engine()
            .block_state(&task.id)
            .await
            .map_err(domain_error)?;
        if state.is_blocked {
            blocked.push((task, state));
        }
    }

    match output_mode {
        OutputMode::Json => {
            let entries: Vec<_> = blocked
                .iter()
                .map(|(task, state)| {
                    serde_json::json!({
                        "taskId": task.id.as_str(),
                        "title": task.title,
                        "blockingTasks": state.blocking_tasks,
                    })
                })
                .collect();
            output::print_json(&entries)?;
        }
        OutputMode::Text => {
            if blocked.is_empty() {
                println!("No blocked tasks");
            } else {
                for (task, state) in &blocked {
                    output::print_block_state(task, state, OutputMode::Text)?;
                }
            }
        }
    }
    Ok(())
}
