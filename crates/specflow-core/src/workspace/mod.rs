//! Isolated workspace lifecycle.
//!
//! Every spec owns one branch and one working copy checked out to it. The
//! [`WorkspaceManager`] creates both all-or-nothing, merges the branch back
//! after a side-effect-free rehearsal, and tears both down idempotently.
//! Version-control work goes through the [`VcsBackend`] seam; [`GitCli`] is
//! the production backend.

pub mod git;
pub mod naming;
pub mod vcs;

#[cfg(test)]
pub(crate) mod fake;

use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Serialize};

pub use git::GitCli;
pub use vcs::{MergeStrategy, TrialMerge, VcsBackend};

use crate::{
    error::{OrchestratorError, Result},
    models::Spec,
};

/// What a successful merge did to the target branch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MergeReport {
    pub branch: String,
    pub target: String,
    pub strategy: MergeStrategy,
    /// Target tip before the merge
    pub before: String,
    /// Target tip after the merge
    pub after: String,
}

/// Creates, merges and removes per-spec branches and working copies.
#[derive(Clone)]
pub struct WorkspaceManager {
    vcs: Arc<dyn VcsBackend>,
}

impl std::fmt::Debug for WorkspaceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceManager").finish_non_exhaustive()
    }
}

impl WorkspaceManager {
    pub fn new(vcs: Arc<dyn VcsBackend>) -> Self {
        Self { vcs }
    }

    pub fn vcs(&self) -> &dyn VcsBackend {
        self.vcs.as_ref()
    }

    /// Allocates the spec's branch off `base` and checks it out into the
    /// spec's workspace.
    ///
    /// Collisions are detected before anything is created. If the working
    /// copy cannot be created the new branch is removed again.
    pub fn create(&self, spec: &Spec, base: &str) -> Result<()> {
        if self.vcs.branch_exists(&spec.branch)? {
            return Err(OrchestratorError::BranchExists {
                branch: spec.branch.clone(),
            });
        }
        if spec.workspace.exists() {
            return Err(OrchestratorError::WorkspaceExists {
                path: spec.workspace.clone(),
            });
        }

        self.vcs.create_branch(&spec.branch, base)?;
        if let Err(e) = self.vcs.add_workspace(&spec.workspace, &spec.branch) {
            warn!(
                "Workspace creation for {} failed, removing branch {}",
                spec.id, spec.branch
            );
            if let Err(rollback) = self.vcs.delete_branch(&spec.branch) {
                warn!("Could not remove branch {}: {rollback}", spec.branch);
            }
            return Err(e);
        }

        info!(
            "Created branch {} and workspace {}",
            spec.branch,
            spec.workspace.display()
        );
        Ok(())
    }

    /// Merges the spec branch into `target`.
    ///
    /// Fails without touching `target` when the workspace is dirty, when the
    /// rehearsal reports conflicts, or when a fast-forward is impossible.
    pub fn merge(&self, spec: &Spec, target: &str, strategy: MergeStrategy) -> Result<MergeReport> {
        if spec.workspace.exists() && self.vcs.has_uncommitted_changes(&spec.workspace)? {
            return Err(OrchestratorError::DirtyWorkspace {
                path: spec.workspace.clone(),
            });
        }
        if !self.vcs.branch_exists(&spec.branch)? {
            return Err(OrchestratorError::vcs(
                "merge",
                format!("branch '{}' does not exist", spec.branch),
            ));
        }

        match self.vcs.trial_merge(target, &spec.branch, strategy)? {
            TrialMerge::Clean => {}
            TrialMerge::Conflicts(paths) => {
                return Err(OrchestratorError::MergeConflict {
                    branch: spec.branch.clone(),
                    target: target.to_string(),
                    paths,
                })
            }
            TrialMerge::NotFastForward => {
                return Err(OrchestratorError::NotFastForward {
                    branch: spec.branch.clone(),
                    target: target.to_string(),
                })
            }
        }

        let before = self.vcs.branch_tip(target)?;
        let message = format!("Merge spec {} ({})", spec.name, spec.id);
        self.vcs.merge(target, &spec.branch, strategy, &message)?;
        let after = self.vcs.branch_tip(target)?;

        info!(
            "Merged {} into {target} using {strategy} ({before:.8} -> {after:.8})",
            spec.branch
        );
        Ok(MergeReport {
            branch: spec.branch.clone(),
            target: target.to_string(),
            strategy,
            before,
            after,
        })
    }

    /// Removes the workspace and branch unless asked to keep them.
    ///
    /// Calling this again after a successful teardown is a no-op.
    pub fn teardown(&self, spec: &Spec, keep_branch: bool, keep_workspace: bool) -> Result<()> {
        if !keep_workspace {
            self.vcs.remove_workspace(&spec.workspace)?;
        }
        if !keep_branch {
            self.vcs.delete_branch(&spec.branch)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::{fake::FakeVcs, *};

    fn setup() -> (WorkspaceManager, Arc<FakeVcs>, Spec, TempDir) {
        let dir = TempDir::new().unwrap();
        let vcs = Arc::new(FakeVcs::new());
        let manager = WorkspaceManager::new(vcs.clone());
        let spec = Spec::new(
            "0a1b2c3d",
            "login",
            "spec/0a1b2c3d-login",
            dir.path().join("worktrees/spec-0a1b2c3d-login"),
        );
        (manager, vcs, spec, dir)
    }

    #[test]
    fn test_create_allocates_branch_and_workspace() {
        let (manager, vcs, spec, _dir) = setup();
        manager.create(&spec, "main").unwrap();
        assert!(vcs.branch_exists(&spec.branch).unwrap());
        assert!(spec.workspace.is_dir());
    }

    #[test]
    fn test_create_detects_collisions_before_mutation() {
        let (manager, vcs, spec, _dir) = setup();
        vcs.create_branch(&spec.branch, "main").unwrap();
        let err = manager.create(&spec, "main").unwrap_err();
        assert!(matches!(err, OrchestratorError::BranchExists { .. }));
        assert!(!spec.workspace.exists());

        vcs.delete_branch(&spec.branch).unwrap();
        std::fs::create_dir_all(&spec.workspace).unwrap();
        let err = manager.create(&spec, "main").unwrap_err();
        assert!(matches!(err, OrchestratorError::WorkspaceExists { .. }));
        assert!(!vcs.branch_exists(&spec.branch).unwrap());
    }

    #[test]
    fn test_create_rolls_back_branch() {
        let (manager, vcs, spec, _dir) = setup();
        vcs.state().fail_add_workspace = true;
        assert!(manager.create(&spec, "main").is_err());
        assert!(!vcs.branch_exists(&spec.branch).unwrap());
    }

    #[test]
    fn test_merge_refuses_dirty_workspace() {
        let (manager, vcs, spec, _dir) = setup();
        manager.create(&spec, "main").unwrap();
        vcs.state().dirty.insert(spec.workspace.clone());

        let err = manager.merge(&spec, "main", MergeStrategy::Merge).unwrap_err();
        assert!(matches!(err, OrchestratorError::DirtyWorkspace { .. }));
        assert!(vcs.state().merges.is_empty());
    }

    #[test]
    fn test_merge_conflict_leaves_target() {
        let (manager, vcs, spec, _dir) = setup();
        manager.create(&spec, "main").unwrap();
        vcs.state()
            .conflicts
            .insert(spec.branch.clone(), vec!["src/app.rs".to_string()]);
        let before = vcs.branch_tip("main").unwrap();

        let err = manager.merge(&spec, "main", MergeStrategy::Merge).unwrap_err();
        match err {
            OrchestratorError::MergeConflict { paths, .. } => {
                assert_eq!(paths, vec!["src/app.rs".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(vcs.branch_tip("main").unwrap(), before);

        vcs.state().conflicts.clear();
        let report = manager.merge(&spec, "main", MergeStrategy::Merge).unwrap();
        assert_ne!(report.before, report.after);
    }

    #[test]
    fn test_fast_forward_only_divergence() {
        let (manager, vcs, spec, _dir) = setup();
        manager.create(&spec, "main").unwrap();
        vcs.state().diverged.insert(spec.branch.clone());

        let err = manager
            .merge(&spec, "main", MergeStrategy::FastForwardOnly)
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::NotFastForward { .. }));
        manager.merge(&spec, "main", MergeStrategy::Squash).unwrap();
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let (manager, vcs, spec, _dir) = setup();
        manager.create(&spec, "main").unwrap();

        manager.teardown(&spec, false, false).unwrap();
        manager.teardown(&spec, false, false).unwrap();
        assert!(!vcs.branch_exists(&spec.branch).unwrap());
        assert!(!spec.workspace.exists());
    }

    #[test]
    fn test_teardown_keeps_requested_resources() {
        let (manager, vcs, spec, _dir) = setup();
        manager.create(&spec, "main").unwrap();
        manager.teardown(&spec, true, false).unwrap();
        assert!(vcs.branch_exists(&spec.branch).unwrap());
        assert!(!spec.workspace.exists());
    }
}
