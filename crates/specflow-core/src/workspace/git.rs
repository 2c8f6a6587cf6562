//! `VcsBackend` backed by the `git` command-line tool.

use std::{
    path::{Path, PathBuf},
    process::{Command, Output},
};

use log::{debug, warn};

use super::vcs::{MergeStrategy, TrialMerge, VcsBackend};
use crate::error::{OrchestratorError, Result};

/// Shells out to `git` in the main working tree of a repository.
///
/// Trial merges use `git merge-tree --write-tree`, which needs git 2.38 or
/// newer.
#[derive(Debug, Clone)]
pub struct GitCli {
    repo_root: PathBuf,
}

impl GitCli {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
        }
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    fn output_in(&self, dir: &Path, args: &[&str]) -> Result<Output> {
        debug!("git {}", args.join(" "));
        Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .map_err(|e| OrchestratorError::vcs(operation(args), format!("failed to run git: {e}")))
    }

    fn output(&self, args: &[&str]) -> Result<Output> {
        self.output_in(&self.repo_root, args)
    }

    /// Runs git and fails unless it exits successfully; returns trimmed stdout.
    fn run(&self, args: &[&str]) -> Result<String> {
        let output = self.output(args)?;
        check(args, &output)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn current_branch(&self) -> Result<Option<String>> {
        let output = self.output(&["symbolic-ref", "--quiet", "--short", "HEAD"])?;
        Ok(output
            .status
            .success()
            .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string()))
    }

    fn abort_merge(&self, strategy: MergeStrategy) {
        let args: &[&str] = match strategy {
            MergeStrategy::Squash => &["reset", "--merge"],
            _ => &["merge", "--abort"],
        };
        if let Err(e) = self.output(args) {
            warn!("Could not abort merge: {e}");
        }
    }

    fn merge_checked_out(
        &self,
        branch: &str,
        strategy: MergeStrategy,
        message: &str,
    ) -> Result<()> {
        match strategy {
            MergeStrategy::FastForwardOnly => {
                self.run(&["merge", "--ff-only", branch])?;
            }
            MergeStrategy::Merge => {
                self.run(&["merge", "--no-ff", "--no-edit", "-m", message, branch])?;
            }
            MergeStrategy::Squash => {
                self.run(&["merge", "--squash", branch])?;
                let staged = self.output(&["diff", "--cached", "--quiet"])?;
                if !staged.status.success() {
                    self.run(&["commit", "--no-edit", "-m", message])?;
                }
            }
        }
        Ok(())
    }
}

fn operation(args: &[&str]) -> String {
    args.first().map_or_else(String::new, |op| format!("git {op}"))
}

fn check(args: &[&str], output: &Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(OrchestratorError::vcs(
        operation(args),
        format!("git {} failed: {}", args.join(" "), stderr.trim()),
    ))
}

fn path_arg(path: &Path) -> Result<&str> {
    path.to_str().ok_or_else(|| {
        OrchestratorError::invalid_input("workspace")
            .with_reason(format!("path is not valid UTF-8: {}", path.display()))
    })
}

impl VcsBackend for GitCli {
    fn branch_exists(&self, branch: &str) -> Result<bool> {
        let reference = format!("refs/heads/{branch}");
        let output = self.output(&["rev-parse", "--verify", "--quiet", reference.as_str()])?;
        Ok(output.status.success())
    }

    fn create_branch(&self, branch: &str, base: &str) -> Result<()> {
        self.run(&["branch", branch, base]).map(drop)
    }

    fn delete_branch(&self, branch: &str) -> Result<()> {
        if !self.branch_exists(branch)? {
            return Ok(());
        }
        self.run(&["branch", "-D", branch]).map(drop)
    }

    fn add_workspace(&self, path: &Path, branch: &str) -> Result<()> {
        self.run(&["worktree", "add", path_arg(path)?, branch])
            .map(drop)
    }

    fn remove_workspace(&self, path: &Path) -> Result<()> {
        if path.exists() {
            self.run(&["worktree", "remove", "--force", path_arg(path)?])?;
        }
        self.run(&["worktree", "prune"]).map(drop)
    }

    fn has_uncommitted_changes(&self, path: &Path) -> Result<bool> {
        let args = ["status", "--porcelain"];
        let output = self.output_in(path, &args)?;
        check(&args, &output)?;
        Ok(!output.stdout.iter().all(u8::is_ascii_whitespace))
    }

    fn trial_merge(
        &self,
        target: &str,
        branch: &str,
        strategy: MergeStrategy,
    ) -> Result<TrialMerge> {
        if strategy == MergeStrategy::FastForwardOnly {
            let output = self.output(&["merge-base", "--is-ancestor", target, branch])?;
            return match output.status.code() {
                Some(0) => Ok(TrialMerge::Clean),
                Some(1) => Ok(TrialMerge::NotFastForward),
                _ => check(&["merge-base"], &output).map(|()| TrialMerge::NotFastForward),
            };
        }

        let args = [
            "merge-tree",
            "--write-tree",
            "--name-only",
            "--no-messages",
            target,
            branch,
        ];
        let output = self.output(&args)?;
        match output.status.code() {
            Some(0) => Ok(TrialMerge::Clean),
            Some(1) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                // First line is the tree id; conflicted paths follow.
                let mut paths: Vec<String> = stdout
                    .lines()
                    .skip(1)
                    .map(str::trim)
                    .take_while(|line| !line.is_empty())
                    .map(String::from)
                    .collect();
                paths.dedup();
                Ok(TrialMerge::Conflicts(paths))
            }
            _ => check(&args, &output).map(|()| TrialMerge::Clean),
        }
    }

    fn merge(
        &self,
        target: &str,
        branch: &str,
        strategy: MergeStrategy,
        message: &str,
    ) -> Result<()> {
        let original = self.current_branch()?;
        let switched = original.as_deref() != Some(target);
        if switched {
            self.run(&["checkout", "--quiet", target])?;
        }

        let result = self.merge_checked_out(branch, strategy, message);
        if result.is_err() {
            self.abort_merge(strategy);
        }

        if switched {
            if let Some(original) = original {
                if let Err(e) = self.run(&["checkout", "--quiet", original.as_str()]) {
                    warn!("Could not return to branch {original}: {e}");
                }
            }
        }
        result
    }

    fn branch_tip(&self, branch: &str) -> Result<String> {
        let reference = format!("refs/heads/{branch}");
        self.run(&["rev-parse", "--verify", reference.as_str()])
    }
}
