//! Command-line argument wrappers and their handlers.
//!
//! Each subcommand has a clap `Args` struct that converts into the matching
//! core parameter type, so clap attributes never leak into the core:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Orchestrator
//! ```
//!
//! Specs can be named by id or by their (unique, active) name on the command
//! line. Arg structs therefore carry a raw `spec` key and the conversion
//! takes the resolved id.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use specflow_core::{
    display::{CreateResult, DeleteResult, PhaseResult, UpdateResult},
    params::*,
    ArtifactKind, MergeStrategy, Orchestrator,
};

use crate::renderer::TerminalRenderer;

// ============================================================================
// Spec arguments
// ============================================================================

/// Create a new spec with its own branch and worktree
#[derive(Args)]
pub struct CreateSpecArgs {
    /// Kebab-case name, unique among active specs
    pub name: String,
}

impl From<CreateSpecArgs> for CreateSpec {
    fn from(val: CreateSpecArgs) -> Self {
        CreateSpec { name: val.name }
    }
}

/// List specs
#[derive(Args)]
pub struct ListSpecsArgs {
    /// Show archived specs instead of active ones
    #[arg(long)]
    pub archived: bool,
}

impl From<ListSpecsArgs> for ListSpecs {
    fn from(val: ListSpecsArgs) -> Self {
        ListSpecs {
            archived: val.archived,
        }
    }
}

/// Show one spec with its tasks and phase history
#[derive(Args)]
pub struct ShowSpecArgs {
    #[arg(help = "Spec id or name")]
    pub spec: String,
}

/// Advance a spec to its next phase
#[derive(Args)]
pub struct AdvancePhaseArgs {
    #[arg(help = "Spec id or name")]
    pub spec: String,
    /// Bypass the phase gate; the transition is recorded as forced
    #[arg(long)]
    pub force: bool,
}

impl AdvancePhaseArgs {
    fn into_params(self, id: String) -> AdvancePhase {
        AdvancePhase {
            id,
            force: self.force,
        }
    }
}

/// Merge a reviewed spec and move it to the completed index
#[derive(Args)]
pub struct ArchiveSpecArgs {
    #[arg(help = "Spec id or name")]
    pub spec: String,
    /// Branch to merge into. Defaults to the configured main branch
    #[arg(long)]
    pub target: Option<String>,
    /// Merge strategy. Defaults to the configured strategy
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,
    /// Keep the spec branch after merging
    #[arg(long)]
    pub keep_branch: bool,
    /// Keep the spec worktree after merging
    #[arg(long)]
    pub keep_workspace: bool,
    /// Archive even when the spec is not reviewed
    #[arg(long)]
    pub force: bool,
}

impl ArchiveSpecArgs {
    fn into_params(self, id: String) -> ArchiveSpec {
        ArchiveSpec {
            id,
            target: self.target,
            strategy: self.strategy.map(Into::into),
            keep_branch: self.keep_branch,
            keep_workspace: self.keep_workspace,
            force: self.force,
        }
    }
}

/// Cancel a spec, releasing its branch and worktree
#[derive(Args)]
pub struct CancelSpecArgs {
    #[arg(help = "Spec id or name")]
    pub spec: String,
    /// Delete the record and artifacts instead of keeping a tombstone
    #[arg(long)]
    pub delete_artifacts: bool,
}

impl CancelSpecArgs {
    fn into_params(self, id: String) -> CancelSpec {
        CancelSpec {
            id,
            delete_artifacts: self.delete_artifacts,
        }
    }
}

/// Print where an artifact of a spec lives
#[derive(Args)]
pub struct ArtifactPathArgs {
    #[arg(help = "Spec id or name")]
    pub spec: String,
    #[arg(value_enum)]
    pub kind: ArtifactArg,
}

#[derive(Subcommand)]
pub enum SpecCommands {
    /// Create a new spec
    #[command(alias = "c")]
    Create(CreateSpecArgs),
    /// List specs
    #[command(aliases = ["l", "ls"])]
    List(ListSpecsArgs),
    /// Show details of a spec
    #[command(alias = "s")]
    Show(ShowSpecArgs),
    /// Advance a spec to its next phase
    #[command(alias = "a")]
    Advance(AdvancePhaseArgs),
    /// Merge and archive a reviewed spec
    Archive(ArchiveSpecArgs),
    /// Cancel a spec
    #[command(alias = "rm")]
    Cancel(CancelSpecArgs),
    /// Print the path of a spec artifact
    Path(ArtifactPathArgs),
}

// ============================================================================
// Task arguments
// ============================================================================

/// Install a spec's task collection from a JSON file
///
/// The file holds an array of `{"id", "name", "description"?,
/// "depends_on"?, "context_refs"?}` objects.
#[derive(Args)]
pub struct DefineTasksArgs {
    #[arg(help = "Spec id or name")]
    pub spec: String,
    /// JSON file with the task definitions
    #[arg(short, long)]
    pub file: PathBuf,
}

#[derive(Args)]
pub struct SpecArgs {
    #[arg(help = "Spec id or name")]
    pub spec: String,
}

#[derive(Args)]
pub struct TaskRefArgs {
    #[arg(help = "Spec id or name")]
    pub spec: String,
    /// Task id within the spec
    pub task_id: String,
}

impl TaskRefArgs {
    fn into_params(self, id: String) -> TaskRef {
        TaskRef {
            id,
            task_id: self.task_id,
        }
    }
}

#[derive(Args)]
pub struct CompleteTaskArgs {
    #[arg(help = "Spec id or name")]
    pub spec: String,
    /// Task id within the spec
    pub task_id: String,
    /// What was accomplished
    #[arg(short, long)]
    pub summary: String,
}

impl CompleteTaskArgs {
    fn into_params(self, id: String) -> CompleteTask {
        CompleteTask {
            id,
            task_id: self.task_id,
            summary: self.summary,
        }
    }
}

#[derive(Args)]
pub struct FailTaskArgs {
    #[arg(help = "Spec id or name")]
    pub spec: String,
    /// Task id within the spec
    pub task_id: String,
    /// What went wrong
    #[arg(short, long, default_value = "")]
    pub error: String,
}

impl FailTaskArgs {
    fn into_params(self, id: String) -> FailTask {
        FailTask {
            id,
            task_id: self.task_id,
            error: self.error,
        }
    }
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Define the task collection of a spec
    #[command(alias = "d")]
    Define(DefineTasksArgs),
    /// List tasks that can be started now
    #[command(alias = "r")]
    Ready(SpecArgs),
    /// List pending tasks waiting on dependencies
    #[command(alias = "b")]
    Blocked(SpecArgs),
    /// Start a ready task
    Start(TaskRefArgs),
    /// Complete an in-progress task
    #[command(alias = "done")]
    Complete(CompleteTaskArgs),
    /// Mark an in-progress task as failed
    Fail(FailTaskArgs),
    /// Skip a task; dependents treat it as satisfied
    Skip(TaskRefArgs),
    /// Move a failed task back to in progress
    Retry(TaskRefArgs),
}

// ============================================================================
// Value enums
// ============================================================================

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Only move the target forward; fail if histories diverged
    FfOnly,
    /// Always create a merge commit
    Merge,
    /// Squash the branch into a single commit
    Squash,
}

impl From<StrategyArg> for MergeStrategy {
    fn from(val: StrategyArg) -> Self {
        match val {
            StrategyArg::FfOnly => MergeStrategy::FastForwardOnly,
            StrategyArg::Merge => MergeStrategy::Merge,
            StrategyArg::Squash => MergeStrategy::Squash,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum ArtifactArg {
    Brief,
    Spec,
    Plan,
    Tasks,
}

impl From<ArtifactArg> for ArtifactKind {
    fn from(val: ArtifactArg) -> Self {
        match val {
            ArtifactArg::Brief => ArtifactKind::Brief,
            ArtifactArg::Spec => ArtifactKind::Specification,
            ArtifactArg::Plan => ArtifactKind::Plan,
            ArtifactArg::Tasks => ArtifactKind::Tasks,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Runs one command against an orchestrator and renders the result.
pub struct Cli {
    orchestrator: Orchestrator,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(orchestrator: Orchestrator, renderer: TerminalRenderer) -> Self {
        Self {
            orchestrator,
            renderer,
        }
    }

    async fn resolve(&self, key: &str) -> Result<String> {
        self.orchestrator
            .resolve_spec(key)
            .await
            .with_context(|| format!("Unknown spec '{key}'"))
    }

    pub async fn list_specs(&self, params: &ListSpecs) -> Result<()> {
        let specs = self
            .orchestrator
            .list_specs(params)
            .await
            .context("Failed to list specs")?;
        self.renderer.render(&specs.to_string())
    }

    pub async fn rebuild_index(&self) -> Result<()> {
        let specs = self
            .orchestrator
            .rebuild_index()
            .await
            .context("Failed to rebuild index")?;
        self.renderer.render(&specs.to_string())
    }

    pub async fn handle_spec_command(&self, command: SpecCommands) -> Result<()> {
        match command {
            SpecCommands::Create(args) => {
                let spec = self
                    .orchestrator
                    .create_spec(&args.into())
                    .await
                    .context("Failed to create spec")?;
                self.renderer.render(&CreateResult::new(spec).to_string())
            }
            SpecCommands::List(args) => self.list_specs(&args.into()).await,
            SpecCommands::Show(args) => {
                let id = self.resolve(&args.spec).await?;
                let spec = self
                    .orchestrator
                    .show_spec(&SpecId { id })
                    .await
                    .context("Failed to load spec")?;
                self.renderer.render(&spec.to_string())
            }
            SpecCommands::Advance(args) => {
                let id = self.resolve(&args.spec).await?;
                let outcome = self
                    .orchestrator
                    .advance_phase(&args.into_params(id.clone()))
                    .await
                    .context("Failed to advance spec")?;
                let result = PhaseResult {
                    id: &id,
                    outcome: &outcome,
                };
                self.renderer.render(&result.to_string())
            }
            SpecCommands::Archive(args) => {
                let id = self.resolve(&args.spec).await?;
                let outcome = self
                    .orchestrator
                    .archive_spec(&args.into_params(id))
                    .await
                    .context("Failed to archive spec")?;
                self.renderer.render(&outcome.to_string())
            }
            SpecCommands::Cancel(args) => {
                let id = self.resolve(&args.spec).await?;
                let spec = self
                    .orchestrator
                    .cancel_spec(&args.into_params(id))
                    .await
                    .context("Failed to cancel spec")?;
                self.renderer.render(&DeleteResult::new(spec).to_string())
            }
            SpecCommands::Path(args) => {
                let id = self.resolve(&args.spec).await?;
                let path = self
                    .orchestrator
                    .artifact_path(&ArtifactRef {
                        id,
                        kind: args.kind.into(),
                    })
                    .await
                    .context("Failed to locate artifact")?;
                println!("{}", path.display());
                Ok(())
            }
        }
    }

    pub async fn handle_task_command(&self, command: TaskCommands) -> Result<()> {
        match command {
            TaskCommands::Define(args) => {
                let id = self.resolve(&args.spec).await?;
                let content = fs::read_to_string(&args.file)
                    .with_context(|| format!("Failed to read {}", args.file.display()))?;
                let tasks: Vec<TaskDefinition> = serde_json::from_str(&content)
                    .with_context(|| format!("Invalid task definitions in {}", args.file.display()))?;
                let count = tasks.len();
                let spec = self
                    .orchestrator
                    .define_tasks(&DefineTasks { id, tasks })
                    .await
                    .context("Failed to define tasks")?;
                let result =
                    UpdateResult::with_changes(spec, vec![format!("Defined {count} tasks")]);
                self.renderer.render(&result.to_string())
            }
            TaskCommands::Ready(args) => {
                let id = self.resolve(&args.spec).await?;
                let tasks = self
                    .orchestrator
                    .ready_tasks(&SpecId { id })
                    .await
                    .context("Failed to find ready tasks")?;
                self.renderer.render(&tasks.to_string())
            }
            TaskCommands::Blocked(args) => {
                let id = self.resolve(&args.spec).await?;
                let blocked = self
                    .orchestrator
                    .blocked_tasks(&SpecId { id })
                    .await
                    .context("Failed to find blocked tasks")?;
                self.renderer.render(&blocked.to_string())
            }
            TaskCommands::Start(args) => {
                let id = self.resolve(&args.spec).await?;
                let task = self
                    .orchestrator
                    .start_task(&args.into_params(id))
                    .await
                    .context("Failed to start task")?;
                self.renderer.render(&UpdateResult::new(task).to_string())
            }
            TaskCommands::Complete(args) => {
                let id = self.resolve(&args.spec).await?;
                let task = self
                    .orchestrator
                    .complete_task(&args.into_params(id))
                    .await
                    .context("Failed to complete task")?;
                self.renderer.render(&UpdateResult::new(task).to_string())
            }
            TaskCommands::Fail(args) => {
                let id = self.resolve(&args.spec).await?;
                let task = self
                    .orchestrator
                    .fail_task(&args.into_params(id))
                    .await
                    .context("Failed to record task failure")?;
                self.renderer.render(&UpdateResult::new(task).to_string())
            }
            TaskCommands::Skip(args) => {
                let id = self.resolve(&args.spec).await?;
                let task = self
                    .orchestrator
                    .skip_task(&args.into_params(id))
                    .await
                    .context("Failed to skip task")?;
                self.renderer.render(&UpdateResult::new(task).to_string())
            }
            TaskCommands::Retry(args) => {
                let id = self.resolve(&args.spec).await?;
                let task = self
                    .orchestrator
                    .retry_task(&args.into_params(id))
                    .await
                    .context("Failed to retry task")?;
                self.renderer.render(&UpdateResult::new(task).to_string())
            }
        }
    }
}
