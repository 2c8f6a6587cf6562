//! Spec operations of the [`Orchestrator`].

use std::path::PathBuf;

use super::Orchestrator;
use crate::{
    display::SpecSummaries,
    engine::{ArchiveOptions, ArchiveOutcome},
    error::Result,
    models::Spec,
    params::{AdvancePhase, ArchiveSpec, ArtifactRef, CancelSpec, CreateSpec, ListSpecs, SpecId},
    phase::AdvanceOutcome,
};

impl Orchestrator {
    /// Creates a spec, its branch and its workspace.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use specflow_core::{params::CreateSpec, OrchestratorBuilder};
    /// # async {
    /// let orchestrator = OrchestratorBuilder::new().build().await?;
    /// let spec = orchestrator
    ///     .create_spec(&CreateSpec { name: "search-api".to_string() })
    ///     .await?;
    /// assert_eq!(spec.branch, format!("spec/{}-search-api", spec.id));
    /// # Result::<(), specflow_core::OrchestratorError>::Ok(())
    /// # };
    /// ```
    pub async fn create_spec(&self, params: &CreateSpec) -> Result<Spec> {
        let name = params.name.clone();
        self.run(move |engine| engine.create_spec(&name)).await
    }

    /// Loads a spec, active or archived.
    pub async fn show_spec(&self, params: &SpecId) -> Result<Spec> {
        let id = params.id.clone();
        self.run(move |engine| engine.show_spec(&id)).await
    }

    /// Lists active specs, or archived ones when `params.archived` is set.
    pub async fn list_specs(&self, params: &ListSpecs) -> Result<SpecSummaries> {
        let archived = params.archived;
        self.run(move |engine| engine.list_specs(archived))
            .await
            .map(SpecSummaries)
    }

    /// Maps an id or a unique active name to a spec id.
    pub async fn resolve_spec(&self, key: &str) -> Result<String> {
        let key = key.to_string();
        self.run(move |engine| engine.resolve_spec(&key)).await
    }

    /// Moves a spec to its next phase, enforcing the gate unless forced.
    pub async fn advance_phase(&self, params: &AdvancePhase) -> Result<AdvanceOutcome> {
        let id = params.id.clone();
        let force = params.force;
        self.run(move |engine| engine.advance_phase(&id, force)).await
    }

    /// Merges a reviewed spec into its target, releases its workspace and
    /// moves it to the completed index.
    pub async fn archive_spec(&self, params: &ArchiveSpec) -> Result<ArchiveOutcome> {
        let id = params.id.clone();
        let options = ArchiveOptions {
            target: params.target.clone(),
            strategy: params.strategy,
            keep_branch: params.keep_branch,
            keep_workspace: params.keep_workspace,
            force: params.force,
        };
        self.run(move |engine| engine.archive_spec(&id, &options))
            .await
    }

    /// Releases a spec's workspace and branch and retires its record.
    pub async fn cancel_spec(&self, params: &CancelSpec) -> Result<Spec> {
        let id = params.id.clone();
        let delete = params.delete_artifacts;
        self.run(move |engine| engine.cancel_spec(&id, delete)).await
    }

    /// Path where the external generator writes an artifact.
    pub async fn artifact_path(&self, params: &ArtifactRef) -> Result<PathBuf> {
        let id = params.id.clone();
        let kind = params.kind;
        self.run(move |engine| engine.artifact_path(&id, kind)).await
    }

    /// Regenerates the active index from the records on disk.
    pub async fn rebuild_index(&self) -> Result<SpecSummaries> {
        self.run(|engine| engine.rebuild_index())
            .await
            .map(SpecSummaries)
    }
}
