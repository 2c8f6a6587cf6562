//! On-disk layout of the orchestrator state directory.

use std::path::{Path, PathBuf};

use crate::models::ArtifactKind;

/// Name of the state directory under the project root.
pub const STATE_DIR: &str = ".specflow";
/// Name of the per-spec record file.
pub const STATE_FILE: &str = "state.json";
/// Name of the active index file.
pub const INDEX_FILE: &str = "index.json";

/// Paths of every file the orchestrator owns, rooted at a project directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Project root (the repository working directory).
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state_dir(&self) -> PathBuf {
        self.root.join(STATE_DIR)
    }

    pub fn config_file(&self) -> PathBuf {
        self.state_dir().join("config.json")
    }

    pub fn specs_dir(&self) -> PathBuf {
        self.state_dir().join("specs")
    }

    pub fn index_file(&self) -> PathBuf {
        self.specs_dir().join(INDEX_FILE)
    }

    pub fn active_dir(&self) -> PathBuf {
        self.specs_dir().join("active")
    }

    pub fn completed_dir(&self) -> PathBuf {
        self.specs_dir().join("completed")
    }

    pub fn cancelled_dir(&self) -> PathBuf {
        self.specs_dir().join("cancelled")
    }

    /// Directory holding an active spec's record and artifacts.
    pub fn spec_dir(&self, id: &str) -> PathBuf {
        self.active_dir().join(id)
    }

    pub fn state_file(&self, id: &str) -> PathBuf {
        self.spec_dir(id).join(STATE_FILE)
    }

    pub fn completed_spec_dir(&self, id: &str) -> PathBuf {
        self.completed_dir().join(id)
    }

    pub fn cancelled_spec_dir(&self, id: &str) -> PathBuf {
        self.cancelled_dir().join(id)
    }

    /// Where the external generator writes the given artifact.
    pub fn artifact_path(&self, id: &str, kind: ArtifactKind) -> PathBuf {
        self.spec_dir(id).join(kind.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let layout = Layout::new("/repo");
        assert_eq!(
            layout.state_file("0a1b2c3d"),
            PathBuf::from("/repo/.specflow/specs/active/0a1b2c3d/state.json")
        );
        assert_eq!(
            layout.artifact_path("0a1b2c3d", ArtifactKind::Specification),
            PathBuf::from("/repo/.specflow/specs/active/0a1b2c3d/spec.md")
        );
        assert_eq!(
            layout.completed_spec_dir("0a1b2c3d"),
            PathBuf::from("/repo/.specflow/specs/completed/0a1b2c3d")
        );
        assert_eq!(layout.index_file(), PathBuf::from("/repo/.specflow/specs/index.json"));
    }
}
