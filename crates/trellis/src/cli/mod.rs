//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for trellis using
//! clap's derive API. Each command has its own argument struct with
//! validation and helpful error messages.
//!
//! # Commands
//!
//! - `init`: Initialize a new trellis repository
//! - `task`: Create, update and list tasks
//! - `dep`: Manage dependency edges between tasks
//! - `blocked`: Show blocked tasks and their blockers
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//!
//! # Example
//!
//! ```bash
//! trellis init --prefix work
//! trellis task add "Write the report"
//! trellis dep add work-ab12 work-cd34
//! trellis blocked
//! ```

mod args;
mod execute;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{BlockedArgs, DepAction, DepArgs, InitArgs, TaskAction, TaskArgs};
pub use validators::{validate_dep_id, validate_prefix, validate_task_id, validate_title};

use crate::app::App;
use crate::output::OutputMode;

/// Trellis - a task dependency graph engine
///
/// Track finish-to-start dependencies between tasks with guaranteed
/// acyclicity. Data is stored in `.trellis/` as JSONL for easy version
/// control integration.
#[derive(Parser, Debug)]
#[command(name = "trellis")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a new trellis repository
    ///
    /// Creates the `.trellis/` directory with configuration and empty data
    /// files. Run this once in your project root.
    Init(InitArgs),

    /// Manage tasks
    ///
    /// Create tasks, move them through pending / in-progress / completed,
    /// and remove them (removal cascades over their dependencies).
    Task(TaskArgs),

    /// Manage dependency edges
    ///
    /// Add or remove finish-to-start edges, list them in either direction,
    /// and pre-check proposed edges for cycles.
    Dep(DepArgs),

    /// Show blocked tasks
    ///
    /// Lists tasks that are waiting on at least one incomplete blocker.
    Blocked(BlockedArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    #[must_use]
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    ///
    /// # Errors
    ///
    /// Returns a `clap::Error` if the arguments do not parse.
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    ///
    /// # Errors
    ///
    /// Propagates command failures; domain errors carry their stable code
    /// in the message.
    pub async fn execute(&self) -> Result<()> {
        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Some(Commands::Init(args)) => execute::execute_init(args).await,
            Some(Commands::Task(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_task(&mut app, args, output_mode).await
            }
            Some(Commands::Dep(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_dep(&mut app, args, output_mode).await
            }
            Some(Commands::Blocked(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_blocked(&app, args, output_mode).await
            }
            None => {
                println!("Trellis task dependency engine");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_no_command() {
        let cli = Cli::try_parse_from(["trellis"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn parse_global_json_flag() {
        let cli = Cli::try_parse_from(["trellis", "--json", "blocked"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Some(Commands::Blocked(_))));
    }

    #[test]
    fn parse_init_with_prefix() {
        let cli = Cli::try_parse_from(["trellis", "init", "--prefix", "work"]).unwrap();
        match cli.command {
            Some(Commands::Init(args)) => {
                assert_eq!(args.prefix, Some("work".to_string()));
                assert!(!args.quiet);
            }
            _ => panic!("Expected Init command"),
        }
    }

    #[test]
    fn parse_init_rejects_bad_prefix() {
        let result = Cli::try_parse_from(["trellis", "init", "--prefix", "a"]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_task_add() {
        let cli = Cli::try_parse_from(["trellis", "task", "add", "Fix the bug"]).unwrap();
        match cli.command {
            Some(Commands::Task(args)) => match args.action {
                TaskAction::Add { title } => assert_eq!(title, "Fix the bug"),
                _ => panic!("Expected Add action"),
            },
            _ => panic!("Expected Task command"),
        }
    }

    #[test]
    fn parse_task_start() {
        let cli = Cli::try_parse_from(["trellis", "task", "start", "work-a1b2"]).unwrap();
        match cli.command {
            Some(Commands::Task(args)) => match args.action {
                TaskAction::Start { task_id } => assert_eq!(task_id, "work-a1b2"),
                _ => panic!("Expected Start action"),
            },
            _ => panic!("Expected Task command"),
        }
    }

    #[test]
    fn parse_task_rejects_bad_id() {
        let result = Cli::try_parse_from(["trellis", "task", "start", "nodash"]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_dep_add() {
        let cli =
            Cli::try_parse_from(["trellis", "dep", "add", "work-a1b2", "work-c3d4"]).unwrap();
        match cli.command {
            Some(Commands::Dep(args)) => match args.action {
                DepAction::Add {
                    dependent,
                    blocking,
                    by,
                } => {
                    assert_eq!(dependent, "work-a1b2");
                    assert_eq!(blocking, "work-c3d4");
                    assert_eq!(by, "cli");
                }
                _ => panic!("Expected Add action"),
            },
            _ => panic!("Expected Dep command"),
        }
    }

    #[test]
    fn parse_dep_add_with_by() {
        let cli = Cli::try_parse_from([
            "trellis", "dep", "add", "work-a1b2", "work-c3d4", "--by", "alice",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Dep(args)) => match args.action {
                DepAction::Add { by, .. } => assert_eq!(by, "alice"),
                _ => panic!("Expected Add action"),
            },
            _ => panic!("Expected Dep command"),
        }
    }

    #[test]
    fn parse_dep_rm() {
        let cli = Cli::try_parse_from(["trellis", "dep", "rm", "dep-x9y8"]).unwrap();
        match cli.command {
            Some(Commands::Dep(args)) => match args.action {
                DepAction::Rm { dep_id } => assert_eq!(dep_id, "dep-x9y8"),
                _ => panic!("Expected Rm action"),
            },
            _ => panic!("Expected Dep command"),
        }
    }

    #[test]
    fn parse_dep_list_variants() {
        let cli = Cli::try_parse_from(["trellis", "dep", "list"]).unwrap();
        match cli.command {
            Some(Commands::Dep(args)) => match args.action {
                DepAction::List { task_id, reverse } => {
                    assert!(task_id.is_none());
                    assert!(!reverse);
                }
                _ => panic!("Expected List action"),
            },
            _ => panic!("Expected Dep command"),
        }

        let cli =
            Cli::try_parse_from(["trellis", "dep", "list", "work-a1b2", "--reverse"]).unwrap();
        match cli.command {
            Some(Commands::Dep(args)) => match args.action {
                DepAction::List { task_id, reverse } => {
                    assert_eq!(task_id, Some("work-a1b2".to_string()));
                    assert!(reverse);
                }
                _ => panic!("Expected List action"),
            },
            _ => panic!("Expected Dep command"),
        }
    }

    #[test]
    fn parse_dep_check() {
        let cli =
            Cli::try_parse_from(["trellis", "dep", "check", "work-a1b2", "work-c3d4"]).unwrap();
        match cli.command {
            Some(Commands::Dep(args)) => match args.action {
                DepAction::Check {
                    dependent,
                    blocking,
                } => {
                    assert_eq!(dependent, "work-a1b2");
                    assert_eq!(blocking, "work-c3d4");
                }
                _ => panic!("Expected Check action"),
            },
            _ => panic!("Expected Dep command"),
        }
    }
}
