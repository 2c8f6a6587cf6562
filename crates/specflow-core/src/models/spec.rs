//! Spec model definition and related functionality.

use std::path::PathBuf;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{Phase, Task, TaskCounts};

/// A recorded phase transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhaseTransition {
    /// Phase before the transition
    pub from: Phase,
    /// Phase after the transition
    pub to: Phase,
    /// When the transition happened (UTC)
    pub at: Timestamp,
    /// Whether a validation gate was bypassed
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub forced: bool,
}

/// A unit of feature work progressing through the phase sequence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Spec {
    /// Opaque 8-character hex identifier
    pub id: String,

    /// Kebab-case slug, unique among active specs
    pub name: String,

    /// Current lifecycle phase
    pub phase: Phase,

    /// Timestamp when the spec was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the spec record was last saved (UTC)
    pub updated_at: Timestamp,

    /// Isolated version-control branch
    pub branch: String,

    /// Isolated working copy checked out to `branch`
    pub workspace: PathBuf,

    /// Tasks, unique by id
    #[serde(default)]
    pub tasks: Vec<Task>,

    /// Every phase transition, oldest first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<PhaseTransition>,

    /// Set when the spec was cancelled and tombstoned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<Timestamp>,
}

impl Spec {
    /// Creates a spec in the initial phase.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        branch: impl Into<String>,
        workspace: impl Into<PathBuf>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: id.into(),
            name: name.into(),
            phase: Phase::New,
            created_at: now,
            updated_at: now,
            branch: branch.into(),
            workspace: workspace.into(),
            tasks: Vec::new(),
            history: Vec::new(),
            cancelled_at: None,
        }
    }

    /// Looks up a task by id.
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Looks up a task by id for mutation.
    pub fn task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == id)
    }

    /// Task counts by status.
    pub fn task_counts(&self) -> TaskCounts {
        TaskCounts::from_tasks(&self.tasks)
    }

    /// Whether the spec reached its terminal phase.
    pub fn is_archived(&self) -> bool {
        self.phase.is_terminal()
    }
}
