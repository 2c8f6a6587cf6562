//! Structural checks over a task collection's dependency graph.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::{
    error::{OrchestratorError, Result},
    models::Task,
};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    Active,
    Done,
}

/// Fails with [`OrchestratorError::CyclicDependency`] if `depends_on` forms a
/// cycle, naming one offending cycle as a closed path (`T1 -> T2 -> T1`).
///
/// Traversal starts from tasks in ascending id order so the reported cycle is
/// deterministic. Dependencies on unknown ids are ignored here; see
/// [`validate_collection`].
pub fn validate_acyclic(tasks: &[Task]) -> Result<()> {
    let graph: BTreeMap<&str, &[String]> = tasks
        .iter()
        .map(|task| (task.id.as_str(), task.depends_on.as_slice()))
        .collect();

    let mut state = HashMap::new();
    let mut path = Vec::new();
    for &root in graph.keys() {
        if let Some(cycle) = visit(root, &graph, &mut state, &mut path) {
            return Err(OrchestratorError::CyclicDependency { cycle });
        }
    }
    Ok(())
}

fn visit<'a>(
    node: &'a str,
    graph: &BTreeMap<&'a str, &'a [String]>,
    state: &mut HashMap<&'a str, Visit>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    match state.get(node) {
        Some(Visit::Done) => return None,
        Some(Visit::Active) => {
            let start = path.iter().position(|n| *n == node)?;
            let mut cycle: Vec<String> = path[start..].iter().map(|n| (*n).to_string()).collect();
            cycle.push(node.to_string());
            return Some(cycle);
        }
        None => {}
    }

    state.insert(node, Visit::Active);
    path.push(node);

    let deps: &'a [String] = graph.get(node).copied().unwrap_or(&[]);
    for dep in deps {
        if !graph.contains_key(dep.as_str()) {
            continue;
        }
        if let Some(cycle) = visit(dep.as_str(), graph, state, path) {
            return Some(cycle);
        }
    }

    path.pop();
    state.insert(node, Visit::Done);
    None
}

/// Full structural validation of a task collection: non-empty unique ids,
/// dependencies that resolve inside the collection, and an acyclic graph.
pub fn validate_collection(tasks: &[Task]) -> Result<()> {
    let mut ids = HashSet::new();
    for task in tasks {
        if task.id.trim().is_empty() {
            return Err(OrchestratorError::invalid_input("id").with_reason("task id cannot be empty"));
        }
        if !ids.insert(task.id.as_str()) {
            return Err(OrchestratorError::DuplicateTaskId {
                id: task.id.clone(),
            });
        }
    }

    for task in tasks {
        if let Some(dependency) = task.depends_on.iter().find(|dep| !ids.contains(dep.as_str())) {
            return Err(OrchestratorError::UnknownDependency {
                task: task.id.clone(),
                dependency: dependency.clone(),
            });
        }
    }

    validate_acyclic(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, deps: &[&str]) -> Task {
        Task::new(id, format!("Task {id}")).with_depends_on(deps.iter().copied())
    }

    fn cycle_of(tasks: &[Task]) -> Vec<String> {
        match validate_acyclic(tasks) {
            Err(OrchestratorError::CyclicDependency { cycle }) => cycle,
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_accepts_dag() {
        let tasks = vec![
            task("T1", &[]),
            task("T2", &["T1"]),
            task("T3", &["T1"]),
            task("T4", &["T2", "T3"]),
        ];
        assert!(validate_acyclic(&tasks).is_ok());
        assert!(validate_collection(&tasks).is_ok());
    }

    #[test]
    fn test_accepts_empty_collection() {
        assert!(validate_collection(&[]).is_ok());
    }

    #[test]
    fn test_rejects_self_dependency() {
        let tasks = vec![task("T1", &["T1"])];
        assert_eq!(cycle_of(&tasks), vec!["T1", "T1"]);
    }

    #[test]
    fn test_rejects_two_node_cycle() {
        let tasks = vec![task("T1", &["T2"]), task("T2", &["T1"])];
        assert_eq!(cycle_of(&tasks), vec!["T1", "T2", "T1"]);
    }

    #[test]
    fn test_names_only_the_cycle_not_the_approach() {
        let tasks = vec![
            task("A", &["B"]),
            task("B", &["C"]),
            task("C", &["D"]),
            task("D", &["B"]),
        ];
        assert_eq!(cycle_of(&tasks), vec!["B", "C", "D", "B"]);
    }

    #[test]
    fn test_rejects_unknown_dependency() {
        let tasks = vec![task("T1", &[]), task("T2", &["T9"])];
        match validate_collection(&tasks) {
            Err(OrchestratorError::UnknownDependency { task, dependency }) => {
                assert_eq!(task, "T2");
                assert_eq!(dependency, "T9");
            }
            other => panic!("expected unknown dependency, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let tasks = vec![task("T1", &[]), task("T1", &[])];
        assert!(matches!(
            validate_collection(&tasks),
            Err(OrchestratorError::DuplicateTaskId { .. })
        ));
    }
}
