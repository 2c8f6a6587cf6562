//! Version-control backend seam.

use std::{fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// How a spec branch is merged back into its target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum MergeStrategy {
    /// Move the target ref forward; fail if histories diverged
    FastForwardOnly,
    /// Always create a merge commit
    #[default]
    Merge,
    /// Collapse the branch into a single commit on the target
    Squash,
}

impl MergeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStrategy::FastForwardOnly => "fast-forward-only",
            MergeStrategy::Merge => "merge",
            MergeStrategy::Squash => "squash",
        }
    }
}

impl FromStr for MergeStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fast-forward-only" | "ff-only" | "ff" => Ok(MergeStrategy::FastForwardOnly),
            "merge" | "regular-merge" | "no-ff" => Ok(MergeStrategy::Merge),
            "squash" => Ok(MergeStrategy::Squash),
            _ => Err(format!("Invalid merge strategy: {s}")),
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a merge rehearsal that touched no ref or working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrialMerge {
    Clean,
    Conflicts(Vec<String>),
    NotFastForward,
}

/// Primitives the lifecycle manager needs from a version-control system.
///
/// Implementations must make `create_branch` and `add_workspace` atomic, and
/// `trial_merge` side-effect free. Removal operations are idempotent.
pub trait VcsBackend: Send + Sync {
    fn branch_exists(&self, branch: &str) -> Result<bool>;

    /// Creates `branch` pointing at the tip of `base`.
    fn create_branch(&self, branch: &str, base: &str) -> Result<()>;

    /// Deletes `branch`; a missing branch is not an error.
    fn delete_branch(&self, branch: &str) -> Result<()>;

    /// Checks `branch` out into a new working copy at `path`.
    fn add_workspace(&self, path: &Path, branch: &str) -> Result<()>;

    /// Removes the working copy at `path`; a missing one is not an error.
    fn remove_workspace(&self, path: &Path) -> Result<()>;

    fn has_uncommitted_changes(&self, path: &Path) -> Result<bool>;

    /// Rehearses merging `branch` into `target`.
    fn trial_merge(&self, target: &str, branch: &str, strategy: MergeStrategy)
        -> Result<TrialMerge>;

    /// Merges `branch` into `target`. On failure the target is left as it
    /// was.
    fn merge(
        &self,
        target: &str,
        branch: &str,
        strategy: MergeStrategy,
        message: &str,
    ) -> Result<()>;

    /// Commit id at the tip of `branch`.
    fn branch_tip(&self, branch: &str) -> Result<String>;
}
