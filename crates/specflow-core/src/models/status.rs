//! Phase and status enumerations for specs and tasks.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Lifecycle phase of a spec, in fixed forward order.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Freshly created, nothing written yet
    #[default]
    New,

    /// Feature intent captured
    Defined,

    /// Specification accepted, implementation plan in progress
    Planned,

    /// Plan accepted, work decomposed into tasks
    Decomposed,

    /// Tasks are being executed
    Implementing,

    /// All tasks finished, awaiting merge
    Reviewed,

    /// Merged back into the mainline; terminal
    Archived,
}

impl Phase {
    /// Every phase in forward order.
    pub const ALL: [Phase; 7] = [
        Phase::New,
        Phase::Defined,
        Phase::Planned,
        Phase::Decomposed,
        Phase::Implementing,
        Phase::Reviewed,
        Phase::Archived,
    ];

    /// Position of the phase in the forward ordering.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The phase that follows this one, or `None` at the terminal phase.
    pub fn next(self) -> Option<Phase> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// Whether no further transition is permitted.
    pub fn is_terminal(self) -> bool {
        self == Phase::Archived
    }

    /// Stable string representation used in records and events.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::New => "new",
            Phase::Defined => "defined",
            Phase::Planned => "planned",
            Phase::Decomposed => "decomposed",
            Phase::Implementing => "implementing",
            Phase::Reviewed => "reviewed",
            Phase::Archived => "archived",
        }
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|phase| phase.as_str() == s.to_lowercase())
            .ok_or_else(|| format!("Invalid phase: {s}"))
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-safe enumeration of task statuses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task has not been started
    #[default]
    Pending,

    /// Task is being worked on
    InProgress,

    /// Task finished successfully (carries a summary)
    Completed,

    /// Task was deliberately skipped
    Skipped,

    /// Task attempt failed; may be retried
    Failed,
}

impl TaskStatus {
    /// Stable string representation used in records and events.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Skipped => "skipped",
            TaskStatus::Failed => "failed",
        }
    }

    /// Whether a task in this status unblocks tasks that depend on it.
    ///
    /// Skipped dependencies count as satisfied so that skipping a task never
    /// strands its descendants.
    pub fn satisfies_dependents(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Skipped)
    }

    /// Whether the task needs no further work before review.
    pub fn is_finished(&self) -> bool {
        self.satisfies_dependents()
    }

    /// Get status with consistent icon formatting for display.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use specflow_core::models::TaskStatus;
    ///
    /// assert_eq!(TaskStatus::Completed.with_icon(), "✓ Completed");
    /// assert_eq!(TaskStatus::Pending.with_icon(), "○ Pending");
    /// ```
    pub fn with_icon(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "○ Pending",
            TaskStatus::InProgress => "➤ In Progress",
            TaskStatus::Completed => "✓ Completed",
            TaskStatus::Skipped => "↷ Skipped",
            TaskStatus::Failed => "✗ Failed",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" | "inprogress" | "in-progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "skipped" => Ok(TaskStatus::Skipped),
            "failed" => Ok(TaskStatus::Failed),
            _ => Err(format!("Invalid task status: {s}")),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
