//! Argument structs for each CLI command.

use super::validators::{validate_dep_id, validate_prefix, validate_task_id, validate_title};
use clap::{Parser, Subcommand};

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Task ID prefix (e.g., "task" for "task-abc")
    ///
    /// Must be 2-20 alphanumeric characters. This prefix is used for all
    /// task IDs in this repository.
    #[arg(short, long, value_parser = validate_prefix)]
    pub prefix: Option<String>,

    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `task` command group
#[derive(Parser, Debug, Clone)]
pub struct TaskArgs {
    /// Task subcommand
    #[command(subcommand)]
    pub action: TaskAction,
}

/// Task management actions
#[derive(Subcommand, Debug, Clone)]
pub enum TaskAction {
    /// Add a new task
    Add {
        /// Task title
        #[arg(value_parser = validate_title)]
        title: String,
    },

    /// Mark a task as in progress
    ///
    /// Warns if the task still has incomplete blockers, but proceeds
    /// anyway; blockers are advisory.
    Start {
        /// Task ID
        #[arg(value_parser = validate_task_id)]
        task_id: String,
    },

    /// Mark a task as completed
    Done {
        /// Task ID
        #[arg(value_parser = validate_task_id)]
        task_id: String,
    },

    /// Reopen a completed task
    ///
    /// Sets the task back to pending, which re-blocks its dependents.
    Reopen {
        /// Task ID
        #[arg(value_parser = validate_task_id)]
        task_id: String,
    },

    /// Remove a task and every dependency touching it
    Rm {
        /// Task ID
        #[arg(value_parser = validate_task_id)]
        task_id: String,
    },

    /// List all tasks
    List,
}

/// Arguments for the `dep` command group
#[derive(Parser, Debug, Clone)]
pub struct DepArgs {
    /// Dependency subcommand
    #[command(subcommand)]
    pub action: DepAction,
}

/// Dependency management actions
#[derive(Subcommand, Debug, Clone)]
pub enum DepAction {
    /// Add a dependency: the dependent task waits for the blocking task
    Add {
        /// Task that must wait
        #[arg(value_parser = validate_task_id)]
        dependent: String,

        /// Task that must complete first
        #[arg(value_parser = validate_task_id)]
        blocking: String,

        /// Who is creating the edge
        #[arg(long, default_value = "cli")]
        by: String,
    },

    /// Remove a dependency by its edge ID
    Rm {
        /// Dependency edge ID
        #[arg(value_parser = validate_dep_id)]
        dep_id: String,
    },

    /// List dependencies, for one task or the whole graph
    List {
        /// Task ID (omit to list every edge)
        #[arg(value_parser = validate_task_id)]
        task_id: Option<String>,

        /// Show what the task blocks instead of what blocks it
        #[arg(short, long)]
        reverse: bool,
    },

    /// Check whether a dependency could be added without creating a cycle
    Check {
        /// Task that would wait
        #[arg(value_parser = validate_task_id)]
        dependent: String,

        /// Task that would have to complete first
        #[arg(value_parser = validate_task_id)]
        blocking: String,
    },
}

/// Arguments for the `blocked` command
#[derive(Parser, Debug, Clone, Default)]
pub struct BlockedArgs {}
