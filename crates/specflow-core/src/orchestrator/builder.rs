//! Builder for creating and configuring [`Orchestrator`] instances.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tokio::task;

use super::Orchestrator;
use crate::{
    config::ProjectConfig,
    engine::Engine,
    error::{OrchestratorError, Result},
    events::{EventSink, JsonlSink},
    phase::{ArtifactProbe, FsArtifacts},
    store::Layout,
    workspace::{GitCli, VcsBackend},
};

/// Builder for [`Orchestrator`].
///
/// Everything except the root has a default: configuration is read from
/// `<root>/.specflow/config.json`, version control goes through the `git`
/// CLI, artifacts are probed on disk and events go wherever the
/// configuration says.
#[derive(Default)]
pub struct OrchestratorBuilder {
    root: Option<PathBuf>,
    config: Option<ProjectConfig>,
    vcs: Option<Arc<dyn VcsBackend>>,
    artifacts: Option<Arc<dyn ArtifactProbe>>,
    events: Option<Arc<dyn EventSink>>,
    events_path: Option<PathBuf>,
}

impl std::fmt::Debug for OrchestratorBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrchestratorBuilder")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("events_path", &self.events_path)
            .finish_non_exhaustive()
    }
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the project root. Defaults to the current directory.
    pub fn with_root<P: AsRef<Path>>(mut self, root: P) -> Self {
        self.root = Some(root.as_ref().to_path_buf());
        self
    }

    /// Uses `config` instead of reading the project configuration file.
    pub fn with_config(mut self, config: ProjectConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_vcs(mut self, vcs: Arc<dyn VcsBackend>) -> Self {
        self.vcs = Some(vcs);
        self
    }

    pub fn with_artifacts(mut self, artifacts: Arc<dyn ArtifactProbe>) -> Self {
        self.artifacts = Some(artifacts);
        self
    }

    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = Some(events);
        self
    }

    /// Appends events to a JSONL file, overriding the configuration.
    pub fn with_events_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.events_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Builds the orchestrator, opening the state store.
    ///
    /// # Errors
    ///
    /// Returns `OrchestratorError::Configuration` for an invalid
    /// configuration file and `OrchestratorError::FileSystem` if the state
    /// directory cannot be created.
    pub async fn build(self) -> Result<Orchestrator> {
        task::spawn_blocking(move || self.build_engine())
            .await
            .map_err(|e| OrchestratorError::Configuration {
                message: format!("Task join error: {e}"),
            })?
            .map(Orchestrator::new)
    }

    fn build_engine(self) -> Result<Engine> {
        let root = match self.root {
            Some(root) => root,
            None => std::env::current_dir().map_err(|e| OrchestratorError::Configuration {
                message: format!("Cannot determine current directory: {e}"),
            })?,
        };
        let layout = Layout::new(root);

        let config = match self.config {
            Some(config) => config,
            None => ProjectConfig::load(&layout)?,
        };
        let vcs: Arc<dyn VcsBackend> = match self.vcs {
            Some(vcs) => vcs,
            None => Arc::new(GitCli::new(layout.root())),
        };
        let artifacts: Arc<dyn ArtifactProbe> = match self.artifacts {
            Some(artifacts) => artifacts,
            None => Arc::new(FsArtifacts::new(layout.clone())),
        };
        let events: Arc<dyn EventSink> = match (self.events, self.events_path) {
            (Some(events), _) => events,
            (None, Some(path)) => Arc::new(JsonlSink::new(path)),
            (None, None) => config.event_sink(&layout)?,
        };

        Engine::new(layout, config, vcs, artifacts, events)
    }
}
