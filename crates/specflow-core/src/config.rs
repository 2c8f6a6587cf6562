//! Project configuration stored at `.specflow/config.json`.

use std::{path::PathBuf, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    error::{IoResultExt, OrchestratorError, Result},
    events::{EventSink, JsonlSink, NoopSink},
    store::{atomic, Layout},
    workspace::MergeStrategy,
};

/// Event sink settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EventsConfig {
    pub enabled: bool,
    /// JSONL file; relative paths resolve against the project root.
    /// Defaults to the XDG state directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Per-project settings. Every field has a default, so a missing file or a
/// partial file is valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProjectConfig {
    /// Branch new specs fork from and archive merges into by default
    pub main_branch: String,
    /// Directory, relative to the root, that holds spec workspaces
    pub worktree_dir: PathBuf,
    /// First component of every spec branch name
    pub branch_prefix: String,
    pub default_strategy: MergeStrategy,
    pub events: EventsConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            main_branch: "main".to_string(),
            worktree_dir: PathBuf::from("worktrees"),
            branch_prefix: "spec".to_string(),
            default_strategy: MergeStrategy::Merge,
            events: EventsConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Reads the project configuration, falling back to defaults when the
    /// file does not exist.
    pub fn load(layout: &Layout) -> Result<Self> {
        let path = layout.config_file();
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e).at_path(path),
        };
        let config: Self =
            serde_json::from_slice(&bytes).map_err(|e| OrchestratorError::Configuration {
                message: format!("{}: {e}", path.display()),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Writes the configuration atomically.
    pub fn save(&self, layout: &Layout) -> Result<()> {
        self.validate()?;
        let json = serde_json::to_vec_pretty(self)?;
        atomic::write_atomic(&layout.config_file(), &json)
    }

    /// Creates the state directory and a default configuration file.
    ///
    /// Returns `false` without touching anything when a configuration file
    /// already exists.
    pub fn init(layout: &Layout) -> Result<bool> {
        if layout.config_file().exists() {
            return Ok(false);
        }
        Self::default().save(layout)?;
        Ok(true)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| {
            Err(OrchestratorError::Configuration {
                message: message.to_string(),
            })
        };
        if self.main_branch.trim().is_empty() {
            return invalid("main_branch cannot be empty");
        }
        if self.branch_prefix.trim().is_empty() || self.branch_prefix.contains(char::is_whitespace)
        {
            return invalid("branch_prefix must be a non-empty name without whitespace");
        }
        if self.worktree_dir.is_absolute() || self.worktree_dir.as_os_str().is_empty() {
            return invalid("worktree_dir must be a relative path");
        }
        Ok(())
    }

    /// The event sink described by `events`.
    pub fn event_sink(&self, layout: &Layout) -> Result<Arc<dyn EventSink>> {
        if !self.events.enabled {
            return Ok(Arc::new(NoopSink));
        }
        let path = match &self.events.path {
            Some(path) if path.is_relative() => layout.root().join(path),
            Some(path) => path.clone(),
            None => JsonlSink::default_path()?,
        };
        Ok(Arc::new(JsonlSink::new(path)))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ProjectConfig::load(&Layout::new(dir.path())).unwrap();
        assert_eq!(config, ProjectConfig::default());
        assert_eq!(config.main_branch, "main");
        assert_eq!(config.default_strategy, MergeStrategy::Merge);
        assert!(!config.events.enabled);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let layout = Layout::new(dir.path());
        std::fs::create_dir_all(layout.state_dir()).unwrap();
        std::fs::write(
            layout.config_file(),
            r#"{"main_branch":"trunk","default_strategy":"squash"}"#,
        )
        .unwrap();

        let config = ProjectConfig::load(&layout).unwrap();
        assert_eq!(config.main_branch, "trunk");
        assert_eq!(config.default_strategy, MergeStrategy::Squash);
        assert_eq!(config.branch_prefix, "spec");
    }

    #[test]
    fn test_save_round_trip() {
        let dir = TempDir::new().unwrap();
        let layout = Layout::new(dir.path());
        let config = ProjectConfig {
            worktree_dir: PathBuf::from(".trees"),
            ..ProjectConfig::default()
        };
        config.save(&layout).unwrap();
        assert_eq!(ProjectConfig::load(&layout).unwrap(), config);
    }

    #[test]
    fn test_init_writes_defaults_once() {
        let dir = TempDir::new().unwrap();
        let layout = Layout::new(dir.path());
        assert!(ProjectConfig::init(&layout).unwrap());
        assert!(layout.config_file().is_file());

        std::fs::write(layout.config_file(), r#"{"main_branch":"trunk"}"#).unwrap();
        assert!(!ProjectConfig::init(&layout).unwrap());
        assert_eq!(ProjectConfig::load(&layout).unwrap().main_branch, "trunk");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = TempDir::new().unwrap();
        let layout = Layout::new(dir.path());
        std::fs::create_dir_all(layout.state_dir()).unwrap();
        std::fs::write(layout.config_file(), r#"{"worktree_dir":"/abs"}"#).unwrap();
        let err = ProjectConfig::load(&layout).unwrap_err();
        assert!(matches!(err, OrchestratorError::Configuration { .. }));

        std::fs::write(layout.config_file(), r#"{"default_strategy":"rebase"}"#).unwrap();
        assert!(ProjectConfig::load(&layout).is_err());
    }

    #[test]
    fn test_relative_event_path_resolves_against_root() {
        let dir = TempDir::new().unwrap();
        let layout = Layout::new(dir.path());
        let config = ProjectConfig {
            events: EventsConfig {
                enabled: true,
                path: Some(PathBuf::from("events.jsonl")),
            },
            ..ProjectConfig::default()
        };
        let sink = config.event_sink(&layout).unwrap();
        sink.emit(&crate::events::TransitionEvent::phase("x", "new", "defined", false))
            .unwrap();
        assert!(dir.path().join("events.jsonl").is_file());
    }
}
