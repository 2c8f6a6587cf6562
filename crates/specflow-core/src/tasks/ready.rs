//! Ready-set computation and blocked-task diagnostics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{Task, TaskStatus};

/// A pending task that cannot start yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockedTask {
    /// Id of the blocked task
    pub task_id: String,
    /// Name of the blocked task
    pub name: String,
    /// Dependencies that have not finished yet
    pub waiting_on: Vec<String>,
}

fn status_by_id(tasks: &[Task]) -> HashMap<&str, TaskStatus> {
    tasks
        .iter()
        .map(|task| (task.id.as_str(), task.status))
        .collect()
}

fn unsatisfied<'t>(task: &'t Task, statuses: &HashMap<&str, TaskStatus>) -> Vec<&'t str> {
    task.depends_on
        .iter()
        .filter(|dep| {
            !statuses
                .get(dep.as_str())
                .is_some_and(TaskStatus::satisfies_dependents)
        })
        .map(String::as_str)
        .collect()
}

/// Dependencies of `task` that do not yet satisfy it.
pub fn unsatisfied_dependencies<'t>(task: &'t Task, tasks: &[Task]) -> Vec<&'t str> {
    unsatisfied(task, &status_by_id(tasks))
}

/// Every pending task whose dependencies are all satisfied, in ascending id
/// order.
pub fn find_ready(tasks: &[Task]) -> Vec<&Task> {
    let statuses = status_by_id(tasks);
    let mut ready: Vec<&Task> = tasks
        .iter()
        .filter(|task| task.status == TaskStatus::Pending)
        .filter(|task| unsatisfied(task, &statuses).is_empty())
        .collect();
    ready.sort_by(|a, b| a.id.cmp(&b.id));
    ready
}

/// Every pending task that is not ready, with the dependencies it waits on,
/// in ascending id order.
pub fn blocked_report(tasks: &[Task]) -> Vec<BlockedTask> {
    let statuses = status_by_id(tasks);
    let mut blocked: Vec<BlockedTask> = tasks
        .iter()
        .filter(|task| task.status == TaskStatus::Pending)
        .filter_map(|task| {
            let waiting_on = unsatisfied(task, &statuses);
            (!waiting_on.is_empty()).then(|| BlockedTask {
                task_id: task.id.clone(),
                name: task.name.clone(),
                waiting_on: waiting_on.into_iter().map(String::from).collect(),
            })
        })
        .collect();
    blocked.sort_by(|a, b| a.task_id.cmp(&b.task_id));
    blocked
}
