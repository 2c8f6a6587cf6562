//! Synchronous orchestration facade.
//!
//! [`Engine`] sequences the store, the phase machine, the task resolver and
//! the workspace manager for each external intent. Every operation loads the
//! spec, validates, mutates in memory, performs any workspace work, then
//! saves through the store; on error nothing is persisted. Archive is the
//! exception: it saves the archived phase after merging and before
//! teardown, and a repeated call finishes an interrupted archive.
//!
//! Operations on one spec are serialized by a per-spec mutex; operations on
//! different specs only meet at the store's index lock. Spec creation takes
//! an additional lock so name checks and workspace allocation stay
//! consistent.

mod spec_ops;
mod task_ops;


use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use serde::{Deserialize, Serialize};

pub use spec_ops::ArchiveOptions;

use crate::{
    config::ProjectConfig,
    error::{OrchestratorError, Result},
    events::{self, EventSink, TransitionEvent},
    models::Spec,
    phase::ArtifactProbe,
    store::{Layout, SpecStore},
    workspace::{MergeReport, VcsBackend, WorkspaceManager},
};

/// Result of a successful archive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArchiveOutcome {
    /// The archived record
    pub spec: Spec,
    /// Absent when an interrupted archive was completed without merging
    pub merge: Option<MergeReport>,
    /// Whether the review gate was bypassed
    pub forced: bool,
}

/// Composes every component behind explicit spec ids.
pub struct Engine {
    config: ProjectConfig,
    store: SpecStore,
    workspaces: WorkspaceManager,
    artifacts: Arc<dyn ArtifactProbe>,
    events: Arc<dyn EventSink>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    create_lock: Mutex<()>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("root", &self.store.layout().root())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub fn new(
        layout: Layout,
        config: ProjectConfig,
        vcs: Arc<dyn VcsBackend>,
        artifacts: Arc<dyn ArtifactProbe>,
        events: Arc<dyn EventSink>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store: SpecStore::open(layout)?,
            workspaces: WorkspaceManager::new(vcs),
            artifacts,
            events,
            locks: Mutex::new(HashMap::new()),
            create_lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn layout(&self) -> &Layout {
        self.store.layout()
    }

    pub fn store(&self) -> &SpecStore {
        &self.store
    }

    /// Runs `f` while holding the mutex of spec `id`.
    fn with_spec_lock<T>(&self, id: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(id.to_string()).or_default())
        };
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Drops the mutex of a spec that left the active set.
    fn forget_spec_lock(&self, id: &str) {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
    }

    /// Loads an active spec, reporting archived ones as terminal.
    fn load_active(&self, id: &str) -> Result<Spec> {
        match self.store.load(id) {
            Err(OrchestratorError::NotFound { .. })
                if self.store.layout().completed_spec_dir(id).exists() =>
            {
                Err(OrchestratorError::TerminalPhase { id: id.to_string() })
            }
            other => other,
        }
    }

    fn emit(&self, event: TransitionEvent) {
        events::emit_best_effort(self.events.as_ref(), &event);
    }
}
