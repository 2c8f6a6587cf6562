//! In-memory `VcsBackend` for deterministic tests.

use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use super::vcs::{MergeStrategy, TrialMerge, VcsBackend};
use crate::error::{OrchestratorError, Result};

#[derive(Debug, Default)]
pub struct FakeState {
    /// branch → tip counter
    pub branches: HashMap<String, u32>,
    pub workspaces: HashSet<PathBuf>,
    pub dirty: HashSet<PathBuf>,
    /// branch → conflicting paths
    pub conflicts: HashMap<String, Vec<String>>,
    pub diverged: HashSet<String>,
    pub fail_add_workspace: bool,
    pub merges: Vec<(String, String, MergeStrategy)>,
}

/// Tracks branches and workspaces in memory; workspace directories are
/// created on disk so existence checks behave like a real backend.
#[derive(Debug)]
pub struct FakeVcs {
    state: Mutex<FakeState>,
}

impl FakeVcs {
    pub fn new() -> Self {
        let mut state = FakeState::default();
        state.branches.insert("main".to_string(), 1);
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }
}

impl VcsBackend for FakeVcs {
    fn branch_exists(&self, branch: &str) -> Result<bool> {
        Ok(self.state().branches.contains_key(branch))
    }

    fn create_branch(&self, branch: &str, base: &str) -> Result<()> {
        let mut state = self.state();
        let tip = *state
            .branches
            .get(base)
            .ok_or_else(|| OrchestratorError::vcs("git branch", format!("unknown base {base}")))?;
        state.branches.insert(branch.to_string(), tip);
        Ok(())
    }

    fn delete_branch(&self, branch: &str) -> Result<()> {
        self.state().branches.remove(branch);
        Ok(())
    }

    fn add_workspace(&self, path: &Path, branch: &str) -> Result<()> {
        let mut state = self.state();
        if state.fail_add_workspace {
            return Err(OrchestratorError::vcs("git worktree", "injected failure"));
        }
        if !state.branches.contains_key(branch) {
            return Err(OrchestratorError::vcs("git worktree", "unknown branch"));
        }
        fs::create_dir_all(path).map_err(|e| OrchestratorError::vcs("git worktree", e.to_string()))?;
        state.workspaces.insert(path.to_path_buf());
        Ok(())
    }

    fn remove_workspace(&self, path: &Path) -> Result<()> {
        let mut state = self.state();
        if path.exists() {
            fs::remove_dir_all(path)
                .map_err(|e| OrchestratorError::vcs("git worktree", e.to_string()))?;
        }
        state.workspaces.remove(path);
        state.dirty.remove(path);
        Ok(())
    }

    fn has_uncommitted_changes(&self, path: &Path) -> Result<bool> {
        Ok(self.state().dirty.contains(path))
    }

    fn trial_merge(
        &self,
        _target: &str,
        branch: &str,
        strategy: MergeStrategy,
    ) -> Result<TrialMerge> {
        let state = self.state();
        if let Some(paths) = state.conflicts.get(branch) {
            return Ok(TrialMerge::Conflicts(paths.clone()));
        }
        if strategy == MergeStrategy::FastForwardOnly && state.diverged.contains(branch) {
            return Ok(TrialMerge::NotFastForward);
        }
        Ok(TrialMerge::Clean)
    }

    fn merge(
        &self,
        target: &str,
        branch: &str,
        strategy: MergeStrategy,
        _message: &str,
    ) -> Result<()> {
        let mut state = self.state();
        let tip = state
            .branches
            .get_mut(target)
            .ok_or_else(|| OrchestratorError::vcs("git merge", "unknown target"))?;
        *tip += 1;
        state
            .merges
            .push((target.to_string(), branch.to_string(), strategy));
        Ok(())
    }

    fn branch_tip(&self, branch: &str) -> Result<String> {
        self.state()
            .branches
            .get(branch)
            .map(|tip| format!("{tip:040}"))
            .ok_or_else(|| OrchestratorError::vcs("git rev-parse", "unknown branch"))
    }
}
