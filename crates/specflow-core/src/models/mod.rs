//! Data models for specs and tasks.
//!
//! A [`Spec`] is one unit of feature work. It advances through the
//! [`Phase`] ordering and, once decomposed, owns a collection of [`Task`]s
//! whose `depends_on` relation forms a DAG. [`SpecSummary`] is the
//! projection kept in the active index.
//!
//! Display implementations for these models live in
//! [`crate::display::models`].
//!
//! # Examples
//!
//! ```rust
//! use specflow_core::models::{Phase, Spec, Task, TaskStatus};
//!
//! let mut spec = Spec::new("0a1b2c3d", "login-flow", "spec/0a1b2c3d-login-flow", "worktrees/spec-0a1b2c3d-login-flow");
//! spec.tasks.push(Task::new("T1", "Add route"));
//! spec.tasks.push(Task::new("T2", "Add form").with_depends_on(["T1"]));
//!
//! assert_eq!(spec.phase, Phase::New);
//! assert_eq!(spec.phase.next(), Some(Phase::Defined));
//! assert_eq!(spec.task_counts().pending, 2);
//! assert_eq!(spec.task("T2").map(|t| t.status), Some(TaskStatus::Pending));
//! ```

pub mod artifact;
pub mod spec;
pub mod status;
pub mod summary;
pub mod task;

#[cfg(test)]
mod tests;

pub use artifact::ArtifactKind;
pub use spec::{PhaseTransition, Spec};
pub use status::{Phase, TaskStatus};
pub use summary::{SpecSummary, TaskCounts};
pub use task::Task;
