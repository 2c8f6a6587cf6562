//! MCP tool handlers implementation

use log::debug;
use rmcp::{
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    ErrorData,
};
use schemars::JsonSchema;
use serde::Deserialize;
use specflow_core::{
    display::{CreateResult, DeleteResult, OperationStatus, PhaseResult, UpdateResult},
    params as core, Orchestrator,
};

use super::to_mcp_error;

// ============================================================================
// Generic Parameter Wrapper Implementation
// ============================================================================
//
// Core parameter types only derive JsonSchema behind the `schema` feature.
// This transparent wrapper forwards deserialization and schema generation to
// the wrapped type so tool signatures can name one concrete type per tool.

/// Generic MCP wrapper for core parameter types
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct McpParams<T>(T)
where
    T: JsonSchema;

impl<T> JsonSchema for McpParams<T>
where
    T: JsonSchema,
{
    fn schema_name() -> std::borrow::Cow<'static, str> {
        T::schema_name()
    }

    fn json_schema(g: &mut schemars::SchemaGenerator) -> schemars::Schema {
        T::json_schema(g)
    }
}

impl<T> AsRef<T> for McpParams<T>
where
    T: JsonSchema,
{
    fn as_ref(&self) -> &T {
        &self.0
    }
}

impl<T> McpParams<T>
where
    T: JsonSchema,
{
    pub fn into_inner(self) -> T {
        self.0
    }
}

// Type aliases for cleaner usage in function signatures
pub type SpecId = McpParams<core::SpecId>;
pub type CreateSpec = McpParams<core::CreateSpec>;
pub type ListSpecs = McpParams<core::ListSpecs>;
pub type AdvancePhase = McpParams<core::AdvancePhase>;
pub type ArchiveSpec = McpParams<core::ArchiveSpec>;
pub type CancelSpec = McpParams<core::CancelSpec>;
pub type ArtifactRef = McpParams<core::ArtifactRef>;
pub type DefineTasks = McpParams<core::DefineTasks>;
pub type TaskRef = McpParams<core::TaskRef>;
pub type CompleteTask = McpParams<core::CompleteTask>;
pub type FailTask = McpParams<core::FailTask>;

pub type McpResult = Result<CallToolResult, ErrorData>;

fn text(body: impl ToString) -> McpResult {
    Ok(CallToolResult::success(vec![Content::text(
        body.to_string(),
    )]))
}

/// Handler implementations for the MCP server
///
/// Every `id` parameter accepts a spec id or the name of an active spec.
pub struct McpHandlers {
    orchestrator: Orchestrator,
}

impl McpHandlers {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }

    async fn resolve(&self, key: &str) -> Result<String, ErrorData> {
        self.orchestrator
            .resolve_spec(key)
            .await
            .map_err(|e| to_mcp_error("Failed to resolve spec", &e))
    }

    pub async fn create_spec(&self, Parameters(params): Parameters<CreateSpec>) -> McpResult {
        debug!("create_spec: {:?}", params);

        let spec = self
            .orchestrator
            .create_spec(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to create spec", &e))?;
        text(CreateResult::new(spec))
    }

    pub async fn list_specs(&self, Parameters(params): Parameters<ListSpecs>) -> McpResult {
        debug!("list_specs: {:?}", params);

        let inner = params.as_ref();
        let specs = self
            .orchestrator
            .list_specs(inner)
            .await
            .map_err(|e| to_mcp_error("Failed to list specs", &e))?;
        let title = if inner.archived {
            "Archived Specs"
        } else {
            "Active Specs"
        };
        text(format!("# {title}\n\n{specs}"))
    }

    pub async fn show_spec(&self, Parameters(params): Parameters<SpecId>) -> McpResult {
        debug!("show_spec: {:?}", params);

        let id = self.resolve(&params.as_ref().id).await?;
        let spec = self
            .orchestrator
            .show_spec(&core::SpecId { id })
            .await
            .map_err(|e| to_mcp_error("Failed to load spec", &e))?;
        text(spec)
    }

    pub async fn advance_phase(&self, Parameters(params): Parameters<AdvancePhase>) -> McpResult {
        debug!("advance_phase: {:?}", params);

        let mut params = params.into_inner();
        params.id = self.resolve(&params.id).await?;
        let outcome = self
            .orchestrator
            .advance_phase(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to advance spec", &e))?;
        text(PhaseResult {
            id: &params.id,
            outcome: &outcome,
        })
    }

    pub async fn archive_spec(&self, Parameters(params): Parameters<ArchiveSpec>) -> McpResult {
        debug!("archive_spec: {:?}", params);

        let mut params = params.into_inner();
        params.id = self.resolve(&params.id).await?;
        let outcome = self
            .orchestrator
            .archive_spec(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to archive spec", &e))?;
        text(outcome)
    }

    pub async fn cancel_spec(&self, Parameters(params): Parameters<CancelSpec>) -> McpResult {
        debug!("cancel_spec: {:?}", params);

        let mut params = params.into_inner();
        params.id = self.resolve(&params.id).await?;
        let spec = self
            .orchestrator
            .cancel_spec(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to cancel spec", &e))?;
        text(DeleteResult::new(spec))
    }

    pub async fn artifact_path(&self, Parameters(params): Parameters<ArtifactRef>) -> McpResult {
        debug!("artifact_path: {:?}", params);

        let mut params = params.into_inner();
        params.id = self.resolve(&params.id).await?;
        let path = self
            .orchestrator
            .artifact_path(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to locate artifact", &e))?;
        text(path.display())
    }

    pub async fn define_tasks(&self, Parameters(params): Parameters<DefineTasks>) -> McpResult {
        debug!("define_tasks: {:?}", params);

        let mut params = params.into_inner();
        params.id = self.resolve(&params.id).await?;
        let count = params.tasks.len();
        let spec = self
            .orchestrator
            .define_tasks(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to define tasks", &e))?;
        text(UpdateResult::with_changes(
            spec,
            vec![format!("Defined {count} tasks")],
        ))
    }

    pub async fn ready_tasks(&self, Parameters(params): Parameters<SpecId>) -> McpResult {
        debug!("ready_tasks: {:?}", params);

        let id = self.resolve(&params.as_ref().id).await?;
        let tasks = self
            .orchestrator
            .ready_tasks(&core::SpecId { id })
            .await
            .map_err(|e| to_mcp_error("Failed to find ready tasks", &e))?;
        text(tasks)
    }

    pub async fn blocked_tasks(&self, Parameters(params): Parameters<SpecId>) -> McpResult {
        debug!("blocked_tasks: {:?}", params);

        let id = self.resolve(&params.as_ref().id).await?;
        let blocked = self
            .orchestrator
            .blocked_tasks(&core::SpecId { id })
            .await
            .map_err(|e| to_mcp_error("Failed to find blocked tasks", &e))?;
        text(blocked)
    }

    pub async fn start_task(&self, Parameters(params): Parameters<TaskRef>) -> McpResult {
        debug!("start_task: {:?}", params);

        let mut params = params.into_inner();
        params.id = self.resolve(&params.id).await?;
        let task = self
            .orchestrator
            .start_task(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to start task", &e))?;
        text(UpdateResult::new(task))
    }

    pub async fn complete_task(&self, Parameters(params): Parameters<CompleteTask>) -> McpResult {
        debug!("complete_task: {:?}", params);

        let mut params = params.into_inner();
        params.id = self.resolve(&params.id).await?;
        let task = self
            .orchestrator
            .complete_task(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to complete task", &e))?;
        text(UpdateResult::new(task))
    }

    pub async fn fail_task(&self, Parameters(params): Parameters<FailTask>) -> McpResult {
        debug!("fail_task: {:?}", params);

        let mut params = params.into_inner();
        params.id = self.resolve(&params.id).await?;
        let task = self
            .orchestrator
            .fail_task(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to record task failure", &e))?;
        text(UpdateResult::new(task))
    }

    pub async fn skip_task(&self, Parameters(params): Parameters<TaskRef>) -> McpResult {
        debug!("skip_task: {:?}", params);

        let mut params = params.into_inner();
        params.id = self.resolve(&params.id).await?;
        let task = self
            .orchestrator
            .skip_task(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to skip task", &e))?;
        text(UpdateResult::new(task))
    }

    pub async fn retry_task(&self, Parameters(params): Parameters<TaskRef>) -> McpResult {
        debug!("retry_task: {:?}", params);

        let mut params = params.into_inner();
        params.id = self.resolve(&params.id).await?;
        let task = self
            .orchestrator
            .retry_task(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to retry task", &e))?;
        text(UpdateResult::new(task))
    }

    pub async fn rebuild_index(&self) -> McpResult {
        debug!("rebuild_index");

        let specs = self
            .orchestrator
            .rebuild_index()
            .await
            .map_err(|e| to_mcp_error("Failed to rebuild index", &e))?;
        text(OperationStatus::success(format!(
            "Rebuilt index with {} active specs",
            specs.len()
        )))
    }
}
