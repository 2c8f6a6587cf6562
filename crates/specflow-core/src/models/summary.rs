//! Spec summary types and functionality.

use std::path::PathBuf;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{Phase, Spec, Task, TaskStatus};

/// Number of tasks in each status.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskCounts {
    pub total: u32,
    pub pending: u32,
    pub in_progress: u32,
    pub completed: u32,
    pub skipped: u32,
    pub failed: u32,
}

impl TaskCounts {
    /// Count tasks by status.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        tasks.iter().fold(Self::default(), |mut counts, task| {
            counts.total += 1;
            match task.status {
                TaskStatus::Pending => counts.pending += 1,
                TaskStatus::InProgress => counts.in_progress += 1,
                TaskStatus::Completed => counts.completed += 1,
                TaskStatus::Skipped => counts.skipped += 1,
                TaskStatus::Failed => counts.failed += 1,
            }
            counts
        })
    }

    /// Tasks that need no further work.
    pub fn finished(&self) -> u32 {
        self.completed + self.skipped
    }

    /// Completion percentage, counting skipped tasks as done.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.finished()) / f64::from(self.total) * 100.0
        }
    }

    /// Whether there is at least one task and all of them are finished.
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.finished() == self.total
    }
}

/// Lightweight projection of a spec kept in the active index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpecSummary {
    /// Spec ID
    pub id: String,
    /// Kebab-case name
    pub name: String,
    /// Current phase
    pub phase: Phase,
    /// Isolated branch
    pub branch: String,
    /// Isolated working copy
    pub workspace: PathBuf,
    /// Creation timestamp
    pub created_at: Timestamp,
    /// Last update timestamp
    pub updated_at: Timestamp,
    /// Task counts by status
    pub tasks: TaskCounts,
}

impl From<&Spec> for SpecSummary {
    fn from(spec: &Spec) -> Self {
        Self {
            id: spec.id.clone(),
            name: spec.name.clone(),
            phase: spec.phase,
            branch: spec.branch.clone(),
            workspace: spec.workspace.clone(),
            created_at: spec.created_at,
            updated_at: spec.updated_at,
            tasks: spec.task_counts(),
        }
    }
}
