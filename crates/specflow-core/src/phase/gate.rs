//! Validation gates guarding each phase transition.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::artifacts::ArtifactProbe;
use crate::models::{ArtifactKind, Phase, Spec, TaskStatus};

/// A task that keeps the implementing → reviewed gate closed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnfinishedTask {
    pub id: String,
    pub status: TaskStatus,
}

/// The unmet condition of a phase gate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "gate", rename_all = "snake_case")]
pub enum GateFailure {
    /// No specification artifact for defined → planned
    SpecificationMissing,
    /// No plan artifact for planned → decomposed
    PlanMissing,
    /// Neither task entities nor a tasks artifact for decomposed → implementing
    NoTasks,
    /// Tasks not completed or skipped for implementing → reviewed
    UnfinishedTasks { tasks: Vec<UnfinishedTask> },
    /// Archive attempted before review
    NotReviewed { actual: Phase },
}

impl fmt::Display for GateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateFailure::SpecificationMissing => f.write_str("specification missing"),
            GateFailure::PlanMissing => f.write_str("plan missing"),
            GateFailure::NoTasks => f.write_str("no tasks defined"),
            GateFailure::UnfinishedTasks { tasks } => {
                f.write_str("unfinished tasks: ")?;
                for (i, task) in tasks.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} ({})", task.id, task.status)?;
                }
                Ok(())
            }
            GateFailure::NotReviewed { actual } => {
                write!(f, "spec is {actual}, archive requires reviewed")
            }
        }
    }
}

/// Evaluates the gate guarding `spec.phase → to`.
///
/// Returns `None` when the gate passes. Only the forward edge from the
/// current phase is meaningful; any other target yields `None`.
pub fn check(spec: &Spec, to: Phase, probe: &dyn ArtifactProbe) -> Option<GateFailure> {
    match (spec.phase, to) {
        (Phase::Defined, Phase::Planned) => (!probe.exists(&spec.id, ArtifactKind::Specification))
            .then_some(GateFailure::SpecificationMissing),
        (Phase::Planned, Phase::Decomposed) => {
            (!probe.exists(&spec.id, ArtifactKind::Plan)).then_some(GateFailure::PlanMissing)
        }
        (Phase::Decomposed, Phase::Implementing) => {
            let populated =
                !spec.tasks.is_empty() || probe.exists(&spec.id, ArtifactKind::Tasks);
            (!populated).then_some(GateFailure::NoTasks)
        }
        (Phase::Implementing, Phase::Reviewed) => {
            let tasks: Vec<UnfinishedTask> = spec
                .tasks
                .iter()
                .filter(|task| !task.status.is_finished())
                .map(|task| UnfinishedTask {
                    id: task.id.clone(),
                    status: task.status,
                })
                .collect();
            (!tasks.is_empty()).then_some(GateFailure::UnfinishedTasks { tasks })
        }
        (actual, Phase::Archived) if actual != Phase::Reviewed => {
            Some(GateFailure::NotReviewed { actual })
        }
        _ => None,
    }
}
