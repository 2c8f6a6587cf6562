#[cfg(test)]
mod model_tests {
    use jiff::Timestamp;

    use crate::models::{Phase, Spec, SpecSummary, Task, TaskCounts, TaskStatus};

    fn create_test_spec() -> Spec {
        let mut spec = Spec::new(
            "0a1b2c3d",
            "login-flow",
            "spec/0a1b2c3d-login-flow",
            "/repo/worktrees/spec-0a1b2c3d-login-flow",
        );
        spec.created_at = Timestamp::from_second(1640995200).unwrap(); // 2022-01-01 00:00:00 UTC
        spec.updated_at = Timestamp::from_second(1641081600).unwrap(); // 2022-01-02 00:00:00 UTC
        spec
    }

    fn task_with_status(id: &str, status: TaskStatus) -> Task {
        let mut task = Task::new(id, format!("Task {id}"));
        task.status = status;
        if status == TaskStatus::Completed {
            task.summary = Some("done".to_string());
        }
        task
    }

    #[test]
    fn test_phase_order_is_forward_only() {
        let mut phase = Phase::New;
        let mut seen = vec![phase];
        while let Some(next) = phase.next() {
            assert!(next > phase);
            assert_eq!(next.index(), phase.index() + 1);
            phase = next;
            seen.push(phase);
        }
        assert_eq!(seen, Phase::ALL.to_vec());
        assert!(phase.is_terminal());
        assert_eq!(Phase::Archived.next(), None);
    }

    #[test]
    fn test_phase_from_str_roundtrips_labels() {
        for phase in Phase::ALL {
            assert_eq!(phase.as_str().parse::<Phase>(), Ok(phase));
        }
        assert_eq!("IMPLEMENTING".parse::<Phase>(), Ok(Phase::Implementing));
        assert!("shipping".parse::<Phase>().is_err());
    }

    #[test]
    fn test_task_status_from_str_aliases() {
        assert_eq!("in_progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert_eq!("in-progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert_eq!("inprogress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert!("done".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_skipped_satisfies_dependents() {
        assert!(TaskStatus::Completed.satisfies_dependents());
        assert!(TaskStatus::Skipped.satisfies_dependents());
        assert!(!TaskStatus::Pending.satisfies_dependents());
        assert!(!TaskStatus::InProgress.satisfies_dependents());
        assert!(!TaskStatus::Failed.satisfies_dependents());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let json = serde_json::to_string(&Phase::Decomposed).unwrap();
        assert_eq!(json, "\"decomposed\"");
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result = serde_json::from_str::<TaskStatus>("\"blocked\"");
        assert!(result.is_err());
        let result = serde_json::from_str::<Phase>("\"shipping\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_task_counts_and_progress() {
        let tasks = vec![
            task_with_status("T1", TaskStatus::Completed),
            task_with_status("T2", TaskStatus::Skipped),
            task_with_status("T3", TaskStatus::InProgress),
            task_with_status("T4", TaskStatus::Failed),
        ];
        let counts = TaskCounts::from_tasks(&tasks);
        assert_eq!(counts.total, 4);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.skipped, 1);
        assert_eq!(counts.in_progress, 1);
        assert_eq!(counts.failed, 1);
        assert_eq!(counts.finished(), 2);
        assert!((counts.percentage() - 50.0).abs() < f64::EPSILON);
        assert!(!counts.is_complete());

        assert!(!TaskCounts::default().is_complete());
        assert_eq!(TaskCounts::default().percentage(), 0.0);
    }

    #[test]
    fn test_summary_from_spec() {
        let mut spec = create_test_spec();
        spec.phase = Phase::Implementing;
        spec.tasks = vec![
            task_with_status("T1", TaskStatus::Completed),
            task_with_status("T2", TaskStatus::Pending),
        ];

        let summary = SpecSummary::from(&spec);
        assert_eq!(summary.id, "0a1b2c3d");
        assert_eq!(summary.name, "login-flow");
        assert_eq!(summary.phase, Phase::Implementing);
        assert_eq!(summary.tasks.total, 2);
        assert_eq!(summary.tasks.completed, 1);
        assert_eq!(summary.branch, "spec/0a1b2c3d-login-flow");
    }

    #[test]
    fn test_spec_record_round_trip_omits_empty_fields() {
        let mut spec = create_test_spec();
        spec.tasks.push(Task::new("T1", "Add route").with_depends_on(Vec::<String>::new()));

        let json = serde_json::to_string_pretty(&spec).unwrap();
        assert!(!json.contains("depends_on"));
        assert!(!json.contains("summary"));
        assert!(!json.contains("history"));
        assert!(!json.contains("cancelled_at"));

        let parsed: Spec = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, spec);
    }

    #[test]
    fn test_task_lookup() {
        let mut spec = create_test_spec();
        spec.tasks.push(Task::new("T1", "First"));
        spec.tasks.push(Task::new("T2", "Second").with_depends_on(["T1"]));

        assert_eq!(spec.task("T2").unwrap().depends_on, vec!["T1".to_string()]);
        assert!(spec.task("T3").is_none());

        spec.task_mut("T1").unwrap().status = TaskStatus::InProgress;
        assert_eq!(spec.task("T1").unwrap().status, TaskStatus::InProgress);
    }
}
