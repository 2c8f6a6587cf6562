//! Parameter structures for orchestrator operations.
//!
//! These structures are shared by every interface (CLI, MCP) and carry no
//! framework-specific derives beyond serde. JSON schema generation is behind
//! the `schema` feature so that only the MCP server pays for it.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   CLI Args      │    │   MCP Params    │    │  Core Params    │
//! │  (clap derives) │───▶│ (serde derives) │───▶│ (minimal deps)  │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! Interface layers wrap these types and convert with `.into()`:
//!
//! ```ignore
//! #[derive(Args)]
//! pub struct CompleteArgs {
//!     pub spec: String,
//!     pub task_id: String,
//!     #[arg(short, long)]
//!     pub summary: String,
//! }
//!
//! impl From<CompleteArgs> for CompleteTask { ... }
//! ```
//!
//! Every `id` field names a spec by its 8-character id; interfaces resolve
//! names to ids before building these structures.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    models::{ArtifactKind, Task},
    workspace::MergeStrategy,
};

/// Parameters for operations requiring just a spec id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct SpecId {
    /// The id of the spec to operate on
    pub id: String,
}

/// Parameters for creating a new spec.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreateSpec {
    /// Kebab-case name, unique among active specs
    pub name: String,
}

/// Parameters for listing specs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ListSpecs {
    /// Whether to show archived specs instead of active ones
    #[serde(default)]
    pub archived: bool,
}

/// Parameters for advancing a spec to its next phase.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct AdvancePhase {
    /// The id of the spec
    pub id: String,
    /// Bypass the phase gate (recorded as a forced transition)
    #[serde(default)]
    pub force: bool,
}

/// One task in a task definition set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct TaskDefinition {
    /// Identifier, unique within the spec (e.g. "T1")
    pub id: String,
    /// Short title
    pub name: String,
    /// Detailed description of the work
    #[serde(default)]
    pub description: Option<String>,
    /// Ids of tasks that must finish first
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// File path patterns relevant to the task
    #[serde(default)]
    pub context_refs: Vec<String>,
}

impl From<TaskDefinition> for Task {
    fn from(def: TaskDefinition) -> Self {
        let mut task = Task::new(def.id, def.name).with_depends_on(def.depends_on);
        task.description = def.description.unwrap_or_default();
        task.context_refs = def.context_refs;
        task
    }
}

/// Parameters for installing a spec's task collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct DefineTasks {
    /// The id of the spec
    pub id: String,
    /// Complete task set; replaces any existing tasks
    pub tasks: Vec<TaskDefinition>,
}

/// Parameters addressing one task of a spec.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct TaskRef {
    /// The id of the spec
    pub id: String,
    /// The id of the task within the spec
    pub task_id: String,
}

/// Parameters for completing a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CompleteTask {
    /// The id of the spec
    pub id: String,
    /// The id of the task within the spec
    pub task_id: String,
    /// What was accomplished (required, non-empty)
    pub summary: String,
}

/// Parameters for failing a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct FailTask {
    /// The id of the spec
    pub id: String,
    /// The id of the task within the spec
    pub task_id: String,
    /// Note describing the failure
    #[serde(default)]
    pub error: String,
}

/// Parameters for archiving a spec.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ArchiveSpec {
    /// The id of the spec
    pub id: String,
    /// Branch to merge into (defaults to the configured main branch)
    #[serde(default)]
    pub target: Option<String>,
    /// Merge strategy (defaults to the configured strategy)
    #[serde(default)]
    pub strategy: Option<MergeStrategy>,
    /// Keep the spec branch after merging
    #[serde(default)]
    pub keep_branch: bool,
    /// Keep the spec workspace after merging
    #[serde(default)]
    pub keep_workspace: bool,
    /// Archive even if the spec is not reviewed
    #[serde(default)]
    pub force: bool,
}

/// Parameters for cancelling a spec.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CancelSpec {
    /// The id of the spec
    pub id: String,
    /// Delete the record and artifacts instead of keeping a tombstone
    #[serde(default)]
    pub delete_artifacts: bool,
}

/// Parameters for locating an artifact file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ArtifactRef {
    /// The id of the spec
    pub id: String,
    /// Which artifact
    pub kind: ArtifactKind,
}
