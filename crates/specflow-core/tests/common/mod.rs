#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use specflow_core::{
    params::{AdvancePhase, ArtifactRef, CompleteTask, CreateSpec, DefineTasks, TaskDefinition, TaskRef},
    ArtifactKind, Orchestrator, OrchestratorBuilder, Phase,
};
use tempfile::TempDir;

/// A throwaway git repository with one commit on `main`.
pub struct TestRepo {
    pub dir: TempDir,
}

impl TestRepo {
    /// Returns `None` when no git 2.38+ is installed so callers can skip.
    pub fn new() -> Option<Self> {
        if !git_supports_merge_tree() {
            eprintln!("skipping: git >= 2.38 is required");
            return None;
        }
        let dir = TempDir::new().expect("Failed to create temp dir");
        let repo = Self { dir };
        repo.git(&["init", "--quiet", "--initial-branch=main"]);
        repo.git(&["config", "user.email", "dev@example.com"]);
        repo.git(&["config", "user.name", "Dev"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        fs::write(repo.root().join(".gitignore"), ".specflow/\nworktrees/\n")
            .expect("Failed to write .gitignore");
        repo.commit_file(repo.root(), "README.md", "# demo\n", "initial commit");
        Some(repo)
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn git(&self, args: &[&str]) -> String {
        git_in(self.root(), args)
    }

    /// Writes `file` under `dir`, stages everything and commits.
    pub fn commit_file(&self, dir: &Path, file: &str, content: &str, message: &str) {
        fs::write(dir.join(file), content).expect("Failed to write file");
        git_in(dir, &["add", "-A"]);
        git_in(dir, &["commit", "--quiet", "-m", message]);
    }

    pub fn tip(&self, branch: &str) -> String {
        self.git(&["rev-parse", branch])
    }

    pub async fn orchestrator(&self) -> Orchestrator {
        OrchestratorBuilder::new()
            .with_root(self.root())
            .build()
            .await
            .expect("Failed to create orchestrator")
    }
}

pub fn git_in(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn git_supports_merge_tree() -> bool {
    let Ok(output) = Command::new("git").arg("--version").output() else {
        return false;
    };
    let version = String::from_utf8_lossy(&output.stdout);
    let mut parts = version
        .trim()
        .trim_start_matches("git version ")
        .split('.')
        .map(|part| part.parse::<u32>().unwrap_or(0));
    let major = parts.next().unwrap_or(0);
    let minor = parts.next().unwrap_or(0);
    (major, minor) >= (2, 38)
}

/// Creates a spec and drives it to `reviewed` with one completed task.
pub async fn reviewed_spec(orchestrator: &Orchestrator, name: &str) -> (String, PathBuf) {
    let spec = orchestrator
        .create_spec(&CreateSpec {
            name: name.to_string(),
        })
        .await
        .expect("Failed to create spec");
    let id = spec.id.clone();

    let advance = |force| AdvancePhase {
        id: id.clone(),
        force,
    };
    orchestrator.advance_phase(&advance(false)).await.unwrap();
    for kind in [ArtifactKind::Specification, ArtifactKind::Plan] {
        let path = orchestrator
            .artifact_path(&ArtifactRef {
                id: id.clone(),
                kind,
            })
            .await
            .unwrap();
        fs::write(path, "# artifact\n").unwrap();
        orchestrator.advance_phase(&advance(false)).await.unwrap();
    }
    orchestrator
        .define_tasks(&DefineTasks {
            id: id.clone(),
            tasks: vec![TaskDefinition {
                id: "T1".to_string(),
                name: "Implement".to_string(),
                ..Default::default()
            }],
        })
        .await
        .unwrap();
    orchestrator.advance_phase(&advance(false)).await.unwrap();

    let task = TaskRef {
        id: id.clone(),
        task_id: "T1".to_string(),
    };
    orchestrator.start_task(&task).await.unwrap();
    orchestrator
        .complete_task(&CompleteTask {
            id: id.clone(),
            task_id: "T1".to_string(),
            summary: "implemented".to_string(),
        })
        .await
        .unwrap();
    let outcome = orchestrator.advance_phase(&advance(false)).await.unwrap();
    assert_eq!(outcome.to, Phase::Reviewed);

    (id, spec.workspace)
}
