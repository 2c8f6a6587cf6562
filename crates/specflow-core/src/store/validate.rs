//! Structural validation of persisted spec records.

use crate::{
    error::{OrchestratorError, Result},
    models::{Spec, TaskStatus},
    tasks,
    workspace::naming,
};

/// Parses and validates the record stored under `id`.
///
/// Every failure is reported as [`OrchestratorError::CorruptState`]; nothing
/// is repaired.
pub fn parse_record(id: &str, bytes: &[u8]) -> Result<Spec> {
    let spec: Spec =
        serde_json::from_slice(bytes).map_err(|e| OrchestratorError::corrupt(id, e))?;
    check_record(id, &spec)?;
    Ok(spec)
}

/// Validates an in-memory record against the invariants a stored record must
/// satisfy.
pub fn check_record(id: &str, spec: &Spec) -> Result<()> {
    if spec.id != id {
        return Err(OrchestratorError::corrupt(
            id,
            format!("record carries id {}", spec.id),
        ));
    }
    naming::validate_spec_name(&spec.name).map_err(|e| OrchestratorError::corrupt(id, e))?;

    tasks::validate_collection(&spec.tasks).map_err(|e| OrchestratorError::corrupt(id, e))?;

    for task in &spec.tasks {
        let completed = task.status == TaskStatus::Completed;
        if completed != task.summary.is_some() {
            let reason = if completed {
                format!("task {} is completed without a summary", task.id)
            } else {
                format!("task {} is {} but carries a summary", task.id, task.status)
            };
            return Err(OrchestratorError::corrupt(id, reason));
        }
    }

    if let Some(window) = spec
        .history
        .windows(2)
        .find(|pair| pair[1].from != pair[0].to)
    {
        return Err(OrchestratorError::corrupt(
            id,
            format!(
                "phase history is discontinuous at {} -> {}",
                window[0].to, window[1].from
            ),
        ));
    }
    if let Some(last) = spec.history.last() {
        if last.to != spec.phase {
            return Err(OrchestratorError::corrupt(
                id,
                format!("phase {} does not match history ({})", spec.phase, last.to),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Phase, Task};

    const ID: &str = "0a1b2c3d";

    fn record() -> Spec {
        Spec::new(ID, "login", "spec/0a1b2c3d-login", "/repo/worktrees/x")
    }

    fn corrupt_reason(result: Result<Spec>) -> String {
        match result {
            Err(OrchestratorError::CorruptState { reason, .. }) => reason,
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("record accepted"),
        }
    }

    #[test]
    fn test_valid_record() {
        let json = serde_json::to_vec(&record()).unwrap();
        assert_eq!(parse_record(ID, &json).unwrap().name, "login");
    }

    #[test]
    fn test_unknown_phase_is_corrupt() {
        let json = serde_json::to_string(&record())
            .unwrap()
            .replace("\"new\"", "\"shipping\"");
        let reason = corrupt_reason(parse_record(ID, json.as_bytes()));
        assert!(reason.contains("shipping"), "{reason}");
    }

    #[test]
    fn test_missing_field_is_corrupt() {
        let reason = corrupt_reason(parse_record(ID, br#"{"id":"0a1b2c3d"}"#));
        assert!(reason.contains("missing field"), "{reason}");
    }

    #[test]
    fn test_truncated_record_is_corrupt() {
        let json = serde_json::to_vec(&record()).unwrap();
        let half = &json[..json.len() / 2];
        corrupt_reason(parse_record(ID, half));
    }

    #[test]
    fn test_id_mismatch_is_corrupt() {
        let json = serde_json::to_vec(&record()).unwrap();
        let reason = corrupt_reason(parse_record("ffffffff", &json));
        assert!(reason.contains("0a1b2c3d"));
    }

    #[test]
    fn test_unknown_dependency_is_corrupt() {
        let mut spec = record();
        spec.tasks.push(Task::new("T1", "x").with_depends_on(["T7"]));
        let json = serde_json::to_vec(&spec).unwrap();
        let reason = corrupt_reason(parse_record(ID, &json));
        assert!(reason.contains("T7"));
    }

    #[test]
    fn test_summary_outside_completed_is_corrupt() {
        let mut spec = record();
        let mut task = Task::new("T1", "x");
        task.summary = Some("premature".to_string());
        spec.tasks.push(task);
        let json = serde_json::to_vec(&spec).unwrap();
        let reason = corrupt_reason(parse_record(ID, &json));
        assert!(reason.contains("carries a summary"));
    }

    #[test]
    fn test_history_must_match_phase() {
        let mut spec = record();
        crate::phase::record_transition(&mut spec, Phase::Defined, false);
        spec.phase = Phase::Planned;
        let json = serde_json::to_vec(&spec).unwrap();
        corrupt_reason(parse_record(ID, &json));
    }
}
