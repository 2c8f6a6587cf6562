//! Core library for the Specflow workflow orchestrator.
//!
//! A *spec* is one unit of feature work that moves through a fixed phase
//! sequence (`new → defined → planned → decomposed → implementing →
//! reviewed → archived`). Each spec owns a git branch and a worktree, and
//! once decomposed it carries a dependency graph of tasks. This crate holds
//! the rules (phase gates, task readiness, status transitions), the
//! persistent per-spec state and the branch/worktree lifecycle.
//!
//! # Layers
//!
//! - **Models** ([`models`]): `Spec`, `Task` and their status enums
//! - **Rules** ([`phase`], [`tasks`]): pure functions over a `Spec`
//! - **State** ([`store`]): one atomically replaced JSON record per spec,
//!   plus the active index
//! - **Workspace** ([`workspace`]): branch and worktree management through
//!   a [`workspace::VcsBackend`]
//! - **Engine** ([`engine`]): synchronous operations that load, apply,
//!   persist and emit under a per-spec lock
//! - **Orchestrator** ([`orchestrator`]): async facade used by the CLI and
//!   the MCP server
//! - **Display** ([`display`]): markdown formatting of models and results
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use specflow_core::{
//!     params::{AdvancePhase, CreateSpec, ListSpecs},
//!     OrchestratorBuilder,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = OrchestratorBuilder::new()
//!     .with_root("/path/to/repo")
//!     .build()
//!     .await?;
//!
//! let spec = orchestrator
//!     .create_spec(&CreateSpec { name: "login-flow".to_string() })
//!     .await?;
//! println!("Created spec: {}", spec);
//!
//! orchestrator
//!     .advance_phase(&AdvancePhase { id: spec.id.clone(), force: false })
//!     .await?;
//!
//! for summary in orchestrator.list_specs(&ListSpecs::default()).await? {
//!     println!("{}: {}", summary.name, summary.phase);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod events;
pub mod models;
pub mod orchestrator;
pub mod params;
pub mod phase;
pub mod store;
pub mod tasks;
pub mod workspace;

// Re-export commonly used types
pub use config::ProjectConfig;
pub use display::{
    BlockedTasks, CreateResult, DeleteResult, OperationStatus, PhaseResult, SpecSummaries, Tasks,
    UpdateResult,
};
pub use engine::{ArchiveOptions, ArchiveOutcome, Engine};
pub use error::{ErrorKind, OrchestratorError, Result};
pub use events::{EventSink, TransitionEvent};
pub use models::{ArtifactKind, Phase, Spec, SpecSummary, Task, TaskCounts, TaskStatus};
pub use orchestrator::{Orchestrator, OrchestratorBuilder};
pub use phase::{AdvanceOutcome, GateFailure};
pub use store::{Layout, SpecStore};
pub use workspace::{GitCli, MergeReport, MergeStrategy};
