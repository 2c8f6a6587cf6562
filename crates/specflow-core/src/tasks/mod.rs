//! Task dependency resolution.
//!
//! - [`graph`]: structural validation of a task collection
//! - [`ready`]: ready-set and blocked-task computation
//! - [`transitions`]: the only legal way to change a task's status

pub mod graph;
pub mod ready;
pub mod transitions;

pub use graph::{validate_acyclic, validate_collection};
pub use ready::{blocked_report, find_ready, unsatisfied_dependencies, BlockedTask};
pub use transitions::StatusChange;

use crate::{
    error::{OrchestratorError, Result},
    models::{Phase, Spec, Task, TaskStatus},
};

/// Replaces the whole task collection of `spec`.
///
/// Allowed at `decomposed` or `implementing` as long as no existing task has
/// left `pending`. The new collection is validated before it is installed;
/// on error `spec` is unchanged.
pub fn replace_tasks(spec: &mut Spec, tasks: Vec<Task>) -> Result<()> {
    match spec.phase {
        Phase::Decomposed | Phase::Implementing => {}
        Phase::Archived => {
            return Err(OrchestratorError::TerminalPhase {
                id: spec.id.clone(),
            })
        }
        actual => {
            return Err(OrchestratorError::WrongPhase {
                id: spec.id.clone(),
                expected: "decomposed or implementing".to_string(),
                actual,
            })
        }
    }

    if let Some(started) = spec
        .tasks
        .iter()
        .find(|task| task.status != TaskStatus::Pending)
    {
        return Err(OrchestratorError::TasksAlreadyStarted {
            id: spec.id.clone(),
            task: started.id.clone(),
            status: started.status,
        });
    }

    validate_collection(&tasks)?;

    spec.tasks = tasks
        .into_iter()
        .map(|mut task| {
            task.status = TaskStatus::Pending;
            task.summary = None;
            task.last_error = None;
            task.started_at = None;
            task.completed_at = None;
            task
        })
        .collect();
    Ok(())
}
