//! Task status transitions.
//!
//! Every status change goes through one of the functions below; callers
//! never assign `Task::status` directly. Each function mutates the spec in
//! memory only and leaves persistence to the caller.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::ready::unsatisfied_dependencies;
use crate::{
    error::{OrchestratorError, Result},
    models::{Phase, Spec, Task, TaskStatus},
};

/// A status change applied to one task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusChange {
    pub task_id: String,
    pub from: TaskStatus,
    pub to: TaskStatus,
}

fn require_implementing(spec: &Spec) -> Result<()> {
    match spec.phase {
        Phase::Implementing => Ok(()),
        Phase::Archived => Err(OrchestratorError::TerminalPhase {
            id: spec.id.clone(),
        }),
        actual => Err(OrchestratorError::WrongPhase {
            id: spec.id.clone(),
            expected: Phase::Implementing.to_string(),
            actual,
        }),
    }
}

fn task_index(spec: &Spec, task_id: &str) -> Result<usize> {
    spec.tasks
        .iter()
        .position(|task| task.id == task_id)
        .ok_or_else(|| OrchestratorError::TaskNotFound {
            spec: spec.id.clone(),
            task: task_id.to_string(),
        })
}

fn invalid(task: &Task, to: TaskStatus) -> OrchestratorError {
    OrchestratorError::InvalidTransition {
        task: task.id.clone(),
        from: task.status,
        to,
    }
}

fn apply(task: &mut Task, to: TaskStatus) -> StatusChange {
    let change = StatusChange {
        task_id: task.id.clone(),
        from: task.status,
        to,
    };
    task.status = to;
    change
}

/// `pending → in_progress`, only for a task in the ready set.
pub fn start(spec: &mut Spec, task_id: &str) -> Result<StatusChange> {
    require_implementing(spec)?;
    let index = task_index(spec, task_id)?;

    let task = &spec.tasks[index];
    if task.status != TaskStatus::Pending {
        return Err(invalid(task, TaskStatus::InProgress));
    }
    let waiting_on = unsatisfied_dependencies(task, &spec.tasks);
    if !waiting_on.is_empty() {
        return Err(OrchestratorError::NotReady {
            task: task.id.clone(),
            waiting_on: waiting_on.into_iter().map(String::from).collect(),
        });
    }

    let task = &mut spec.tasks[index];
    task.started_at = Some(Timestamp::now());
    Ok(apply(task, TaskStatus::InProgress))
}

/// `in_progress → completed`, storing the trimmed summary.
pub fn complete(spec: &mut Spec, task_id: &str, summary: &str) -> Result<StatusChange> {
    require_implementing(spec)?;
    let index = task_index(spec, task_id)?;

    let task = &mut spec.tasks[index];
    if task.status != TaskStatus::InProgress {
        return Err(invalid(task, TaskStatus::Completed));
    }
    let summary = summary.trim();
    if summary.is_empty() {
        return Err(OrchestratorError::EmptySummary {
            task: task.id.clone(),
        });
    }

    task.summary = Some(summary.to_string());
    task.completed_at = Some(Timestamp::now());
    Ok(apply(task, TaskStatus::Completed))
}

/// `in_progress → failed`, recording the failure note.
pub fn fail(spec: &mut Spec, task_id: &str, error: &str) -> Result<StatusChange> {
    require_implementing(spec)?;
    let index = task_index(spec, task_id)?;

    let task = &mut spec.tasks[index];
    if task.status != TaskStatus::InProgress {
        return Err(invalid(task, TaskStatus::Failed));
    }

    let note = error.trim();
    task.last_error = (!note.is_empty()).then(|| note.to_string());
    Ok(apply(task, TaskStatus::Failed))
}

/// `pending → skipped` or `in_progress → skipped`.
pub fn skip(spec: &mut Spec, task_id: &str) -> Result<StatusChange> {
    require_implementing(spec)?;
    let index = task_index(spec, task_id)?;

    let task = &mut spec.tasks[index];
    if !matches!(task.status, TaskStatus::Pending | TaskStatus::InProgress) {
        return Err(invalid(task, TaskStatus::Skipped));
    }
    Ok(apply(task, TaskStatus::Skipped))
}

/// `failed → in_progress`.
pub fn retry(spec: &mut Spec, task_id: &str) -> Result<StatusChange> {
    require_implementing(spec)?;
    let index = task_index(spec, task_id)?;

    let task = &mut spec.tasks[index];
    if task.status != TaskStatus::Failed {
        return Err(invalid(task, TaskStatus::InProgress));
    }
    task.started_at = Some(Timestamp::now());
    Ok(apply(task, TaskStatus::InProgress))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn implementing_spec(tasks: Vec<Task>) -> Spec {
        let mut spec = Spec::new("0a1b2c3d", "s2", "spec/0a1b2c3d-s2", "/tmp/ws");
        spec.phase = Phase::Implementing;
        spec.tasks = tasks;
        spec
    }

    fn two_tasks() -> Vec<Task> {
        vec![
            Task::new("T1", "First"),
            Task::new("T2", "Second").with_depends_on(["T1"]),
        ]
    }

    #[test]
    fn test_start_complete_unblocks_dependent() {
        let mut spec = implementing_spec(two_tasks());

        let change = start(&mut spec, "T1").unwrap();
        assert_eq!(change.from, TaskStatus::Pending);
        assert_eq!(change.to, TaskStatus::InProgress);
        assert!(spec.task("T1").unwrap().started_at.is_some());

        complete(&mut spec, "T1", "  done  ").unwrap();
        let t1 = spec.task("T1").unwrap();
        assert_eq!(t1.status, TaskStatus::Completed);
        assert_eq!(t1.summary.as_deref(), Some("done"));
        assert!(t1.completed_at.is_some());

        start(&mut spec, "T2").unwrap();
    }

    #[test]
    fn test_start_blocked_task_reports_dependencies() {
        let mut spec = implementing_spec(two_tasks());
        let err = start(&mut spec, "T2").unwrap_err();
        match err {
            OrchestratorError::NotReady { task, waiting_on } => {
                assert_eq!(task, "T2");
                assert_eq!(waiting_on, vec!["T1".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(spec.task("T2").unwrap().status, TaskStatus::Pending);
    }

    #[test]
    fn test_complete_requires_summary() {
        let mut spec = implementing_spec(two_tasks());
        start(&mut spec, "T1").unwrap();
        let err = complete(&mut spec, "T1", "   ").unwrap_err();
        assert!(matches!(err, OrchestratorError::EmptySummary { .. }));
        let t1 = spec.task("T1").unwrap();
        assert_eq!(t1.status, TaskStatus::InProgress);
        assert!(t1.summary.is_none());
    }

    #[test]
    fn test_fail_then_retry() {
        let mut spec = implementing_spec(two_tasks());
        start(&mut spec, "T1").unwrap();
        fail(&mut spec, "T1", "tests red").unwrap();
        assert_eq!(spec.task("T1").unwrap().last_error.as_deref(), Some("tests red"));

        let err = start(&mut spec, "T1").unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidTransition { .. }));

        let change = retry(&mut spec, "T1").unwrap();
        assert_eq!(change.from, TaskStatus::Failed);
        assert_eq!(change.to, TaskStatus::InProgress);
    }

    #[test]
    fn test_skip_from_pending_and_in_progress() {
        let mut spec = implementing_spec(two_tasks());
        skip(&mut spec, "T1").unwrap();
        start(&mut spec, "T2").unwrap();
        skip(&mut spec, "T2").unwrap();
        assert_eq!(spec.task_counts().skipped, 2);

        let err = skip(&mut spec, "T2").unwrap_err();
        assert!(matches!(
            err,
            OrchestratorError::InvalidTransition {
                from: TaskStatus::Skipped,
                ..
            }
        ));
    }

    #[test]
    fn test_illegal_transitions_rejected() {
        let mut spec = implementing_spec(two_tasks());
        assert!(matches!(
            complete(&mut spec, "T1", "x").unwrap_err(),
            OrchestratorError::InvalidTransition { .. }
        ));
        assert!(matches!(
            fail(&mut spec, "T1", "x").unwrap_err(),
            OrchestratorError::InvalidTransition { .. }
        ));
        assert!(matches!(
            retry(&mut spec, "T1").unwrap_err(),
            OrchestratorError::InvalidTransition { .. }
        ));

        start(&mut spec, "T1").unwrap();
        complete(&mut spec, "T1", "done").unwrap();
        assert!(matches!(
            skip(&mut spec, "T1").unwrap_err(),
            OrchestratorError::InvalidTransition { .. }
        ));
    }

    #[test]
    fn test_requires_implementing_phase() {
        let mut spec = implementing_spec(two_tasks());
        spec.phase = Phase::Decomposed;
        assert!(matches!(
            start(&mut spec, "T1").unwrap_err(),
            OrchestratorError::WrongPhase { .. }
        ));

        spec.phase = Phase::Archived;
        assert!(matches!(
            start(&mut spec, "T1").unwrap_err(),
            OrchestratorError::TerminalPhase { .. }
        ));
    }

    #[test]
    fn test_unknown_task() {
        let mut spec = implementing_spec(two_tasks());
        assert!(matches!(
            start(&mut spec, "T9").unwrap_err(),
            OrchestratorError::TaskNotFound { .. }
        ));
    }
}
