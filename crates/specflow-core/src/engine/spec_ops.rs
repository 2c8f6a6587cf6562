//! Spec-level operations: creation, inspection, phase changes, archive and
//! cancellation.

use std::path::PathBuf;

use log::{info, warn};

use super::{ArchiveOutcome, Engine};
use crate::{
    error::{OrchestratorError, Result},
    events::TransitionEvent,
    models::{ArtifactKind, Phase, Spec, SpecSummary},
    phase::{self, gate, AdvanceOutcome},
    workspace::{naming, MergeStrategy},
};

/// How to archive a spec; unset fields fall back to the project config.
#[derive(Debug, Clone, Default)]
pub struct ArchiveOptions {
    pub target: Option<String>,
    pub strategy: Option<MergeStrategy>,
    pub keep_branch: bool,
    pub keep_workspace: bool,
    pub force: bool,
}

impl Engine {
    /// Creates a spec with its branch and workspace.
    pub fn create_spec(&self, name: &str) -> Result<Spec> {
        naming::validate_spec_name(name)?;

        let _guard = self
            .create_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if self.store.find_by_name(name)?.is_some() {
            return Err(OrchestratorError::DuplicateName {
                name: name.to_string(),
            });
        }

        let layout = self.store.layout();
        let id = loop {
            let id = naming::new_spec_id();
            if !layout.spec_dir(&id).exists() && !layout.completed_spec_dir(&id).exists() {
                break id;
            }
        };
        let spec = Spec::new(
            &id,
            name,
            naming::branch_name(&self.config.branch_prefix, &id, name),
            naming::workspace_path(layout.root(), &self.config.worktree_dir, &id, name),
        );

        self.workspaces.create(&spec, &self.config.main_branch)?;
        if let Err(e) = self.store.insert(&spec) {
            warn!("Could not record spec {id}, releasing its workspace: {e}");
            if let Err(rollback) = self.workspaces.teardown(&spec, false, false) {
                warn!("Could not release workspace of {id}: {rollback}");
            }
            return Err(e);
        }

        info!("Created spec {} ({}) on branch {}", spec.id, spec.name, spec.branch);
        Ok(spec)
    }

    /// Loads a spec record, active or archived.
    pub fn show_spec(&self, id: &str) -> Result<Spec> {
        match self.store.load(id) {
            Err(OrchestratorError::NotFound { .. }) => self.store.load_archived(id),
            other => other,
        }
    }

    pub fn list_specs(&self, archived: bool) -> Result<Vec<SpecSummary>> {
        if archived {
            self.store.list_archived()
        } else {
            self.store.list_active()
        }
    }

    /// Maps an id or a unique active name to a spec id.
    pub fn resolve_spec(&self, key: &str) -> Result<String> {
        let layout = self.store.layout();
        if naming::is_spec_id(key)
            && (layout.state_file(key).is_file() || layout.completed_spec_dir(key).is_dir())
        {
            return Ok(key.to_string());
        }
        match self.store.find_by_name(key)? {
            Some(summary) => Ok(summary.id),
            None => Err(OrchestratorError::NotFound {
                id: key.to_string(),
            }),
        }
    }

    /// Moves a spec to its next phase.
    pub fn advance_phase(&self, id: &str, force: bool) -> Result<AdvanceOutcome> {
        self.with_spec_lock(id, || {
            let mut spec = self.load_active(id)?;
            let outcome = phase::advance(&mut spec, force, self.artifacts.as_ref())?;
            self.store.save(&mut spec)?;

            if outcome.forced {
                let unmet: Vec<String> = outcome.warnings.iter().map(ToString::to_string).collect();
                warn!(
                    "FORCED phase transition of {id}: {} -> {} (bypassed: {})",
                    outcome.from,
                    outcome.to,
                    unmet.join("; ")
                );
            } else {
                info!("Spec {id} advanced {} -> {}", outcome.from, outcome.to);
            }
            self.emit(TransitionEvent::phase(id, outcome.from, outcome.to, outcome.forced));
            Ok(outcome)
        })
    }

    /// Merges, tears down and archives a reviewed spec.
    ///
    /// A failed merge leaves the spec, its branch and its workspace exactly
    /// as they were so the call can be retried after manual resolution.
    ///
    /// The archived phase is persisted right after the merge, before any
    /// teardown. A spec found archived but still active was interrupted
    /// after that point; calling this again tears down and moves it without
    /// merging a second time.
    pub fn archive_spec(&self, id: &str, options: &ArchiveOptions) -> Result<ArchiveOutcome> {
        let outcome = self.with_spec_lock(id, || {
            let mut spec = self.load_active(id)?;

            if spec.phase == Phase::Archived {
                warn!("Spec {id} is archived but still active; completing archive");
                self.workspaces
                    .teardown(&spec, options.keep_branch, options.keep_workspace)?;
                self.store.move_to_archive(id)?;

                let (from, forced) = spec
                    .history
                    .last()
                    .filter(|transition| transition.to == Phase::Archived)
                    .map_or((Phase::Reviewed, false), |transition| {
                        (transition.from, transition.forced)
                    });
                self.emit(TransitionEvent::phase(id, from, Phase::Archived, forced));
                return Ok(ArchiveOutcome {
                    spec,
                    merge: None,
                    forced,
                });
            }

            let from = spec.phase;
            let mut forced = false;
            if let Some(unmet) = gate::check(&spec, Phase::Archived, self.artifacts.as_ref()) {
                if !options.force {
                    return Err(OrchestratorError::Validation {
                        id: id.to_string(),
                        from,
                        to: Phase::Archived,
                        unmet,
                    });
                }
                warn!("FORCED archive of {id} from phase {from}: {unmet}");
                forced = true;
            }

            let target = options
                .target
                .clone()
                .unwrap_or_else(|| self.config.main_branch.clone());
            let strategy = options.strategy.unwrap_or(self.config.default_strategy);

            let report = self.workspaces.merge(&spec, &target, strategy)?;
            phase::record_transition(&mut spec, Phase::Archived, forced);
            self.store.save(&mut spec)?;

            self.workspaces
                .teardown(&spec, options.keep_branch, options.keep_workspace)?;
            self.store.move_to_archive(id)?;

            info!("Archived spec {id} into {target}");
            self.emit(TransitionEvent::phase(id, from, Phase::Archived, forced));
            Ok(ArchiveOutcome {
                spec,
                merge: Some(report),
                forced,
            })
        })?;
        self.forget_spec_lock(id);
        Ok(outcome)
    }

    /// Releases a spec's branch and workspace and retires its record.
    ///
    /// With `delete_artifacts` the record and artifacts are deleted;
    /// otherwise they are kept as a tombstone under `cancelled/`.
    pub fn cancel_spec(&self, id: &str, delete_artifacts: bool) -> Result<Spec> {
        let spec = self.with_spec_lock(id, || {
            let mut spec = self.load_active(id)?;
            self.workspaces.teardown(&spec, false, false)?;
            if delete_artifacts {
                self.store.remove(id)?;
            } else {
                self.store.tombstone(&mut spec)?;
            }
            info!("Cancelled spec {id} at phase {}", spec.phase);
            Ok(spec)
        })?;
        self.forget_spec_lock(id);
        Ok(spec)
    }

    /// Where the external generator writes `kind` for spec `id`.
    pub fn artifact_path(&self, id: &str, kind: ArtifactKind) -> Result<PathBuf> {
        self.load_active(id)?;
        Ok(self.store.layout().artifact_path(id, kind))
    }

    /// Regenerates the active index from the records on disk.
    pub fn rebuild_index(&self) -> Result<Vec<SpecSummary>> {
        self.store.rebuild_index()
    }
}
