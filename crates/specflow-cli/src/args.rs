use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::{SpecCommands, TaskCommands};

/// Spec-driven workflow orchestrator
///
/// Specflow moves units of feature work ("specs") through a fixed phase
/// sequence, gives each one an isolated git branch and worktree, tracks its
/// task dependency graph, and merges the branch back when the spec is
/// archived. It can be driven from the command line or, via `serve`, by an
/// agent over the Model Context Protocol.
#[derive(Parser)]
#[command(version, about, name = "specflow")]
pub struct Args {
    /// Repository root holding `.specflow/`. Defaults to the current
    /// directory
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Append transition events to this JSONL file, overriding the
    /// project configuration
    #[arg(long, global = true)]
    pub events: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
///
/// - `init`: write a default project configuration
/// - `spec`: spec lifecycle (create, advance, archive, ...)
/// - `task`: task graph and task status operations
/// - `reindex`: rebuild the active index from the spec records
/// - `serve`: start the MCP server on stdio
#[derive(Subcommand)]
pub enum Commands {
    /// Create `.specflow/` with a default configuration
    Init,
    /// Manage specs
    #[command(alias = "s")]
    Spec {
        #[command(subcommand)]
        command: SpecCommands,
    },
    /// Manage the tasks of a spec
    #[command(alias = "t")]
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Rebuild the active spec index from the records on disk
    Reindex,
    /// Start the MCP server
    Serve,
}
