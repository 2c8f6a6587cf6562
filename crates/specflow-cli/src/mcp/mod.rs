//! MCP server implementation for Specflow
//!
//! Exposes the orchestrator operations as Model Context Protocol tools over
//! stdio so that agent drivers can move specs through their lifecycle.

use std::sync::Arc;

use anyhow::Result;
use log::{debug, error, info};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};
use specflow_core::Orchestrator;
use tokio::signal::unix::{signal, SignalKind};

pub mod errors;
pub mod handlers;

pub use errors::to_mcp_error;
// Re-export parameter types and result type from handlers for external use
pub use handlers::{
    AdvancePhase, ArchiveSpec, ArtifactRef, CancelSpec, CompleteTask, CreateSpec, DefineTasks,
    FailTask, ListSpecs, McpResult, SpecId, TaskRef,
};

/// MCP server for Specflow
#[derive(Clone)]
pub struct SpecflowMcpServer {
    handlers: Arc<handlers::McpHandlers>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl SpecflowMcpServer {
    /// Create a new Specflow MCP server
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            handlers: Arc::new(handlers::McpHandlers::new(orchestrator)),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "create_spec",
        description = "Create a new spec (unit of feature work). Requires a kebab-case name unique among active specs. Allocates a dedicated git branch and worktree and returns the new 8-character spec ID."
    )]
    async fn create_spec(&self, params: Parameters<CreateSpec>) -> McpResult {
        self.handlers.create_spec(params).await
    }

    #[tool(
        name = "list_specs",
        description = "List specs with their phase and task progress. Use archived=false (default) for active specs or archived=true for merged and completed ones."
    )]
    async fn list_specs(&self, params: Parameters<ListSpecs>) -> McpResult {
        self.handlers.list_specs(params).await
    }

    #[tool(
        name = "show_spec",
        description = "Show a spec in full: phase, branch, worktree path, every task with status and dependencies, and the phase history including forced transitions. Accepts a spec ID or name."
    )]
    async fn show_spec(&self, params: Parameters<SpecId>) -> McpResult {
        self.handlers.show_spec(params).await
    }

    #[tool(
        name = "advance_phase",
        description = "Move a spec to its next phase (new → defined → planned → decomposed → implementing → reviewed). Each step has a gate: planned needs the specification artifact, decomposed needs the plan, implementing needs tasks, reviewed needs every task completed or skipped. force=true bypasses the gate and is recorded. Reviewed specs must be archived with archive_spec instead."
    )]
    async fn advance_phase(&self, params: Parameters<AdvancePhase>) -> McpResult {
        self.handlers.advance_phase(params).await
    }

    #[tool(
        name = "archive_spec",
        description = "Merge a reviewed spec's branch into the target (default: configured main branch) after a conflict-free rehearsal, remove its worktree and branch, and move it to the completed index. strategy is one of fast-forward-only, merge, squash. On conflict nothing is changed and the conflicting paths are reported."
    )]
    async fn archive_spec(&self, params: Parameters<ArchiveSpec>) -> McpResult {
        self.handlers.archive_spec(params).await
    }

    #[tool(
        name = "cancel_spec",
        description = "Abandon a spec: remove its worktree and branch, then keep a tombstone record (default) or delete the record and artifacts with delete_artifacts=true."
    )]
    async fn cancel_spec(&self, params: Parameters<CancelSpec>) -> McpResult {
        self.handlers.cancel_spec(params).await
    }

    #[tool(
        name = "artifact_path",
        description = "Return the file path where a spec artifact (brief, specification, plan, tasks) is read from and should be written to."
    )]
    async fn artifact_path(&self, params: Parameters<ArtifactRef>) -> McpResult {
        self.handlers.artifact_path(params).await
    }

    #[tool(
        name = "define_tasks",
        description = "Install the complete task collection of a spec in phase decomposed or implementing, replacing any existing tasks. Only allowed while every task is still pending. Task IDs must be unique and depends_on must reference known IDs without cycles."
    )]
    async fn define_tasks(&self, params: Parameters<DefineTasks>) -> McpResult {
        self.handlers.define_tasks(params).await
    }

    #[tool(
        name = "ready_tasks",
        description = "List the pending tasks of a spec whose dependencies are all completed or skipped, ordered by task ID. These can be started now."
    )]
    async fn ready_tasks(&self, params: Parameters<SpecId>) -> McpResult {
        self.handlers.ready_tasks(params).await
    }

    #[tool(
        name = "blocked_tasks",
        description = "List the pending tasks of a spec that are waiting on unfinished dependencies, with the dependency IDs each one waits on."
    )]
    async fn blocked_tasks(&self, params: Parameters<SpecId>) -> McpResult {
        self.handlers.blocked_tasks(params).await
    }

    #[tool(
        name = "start_task",
        description = "Mark a ready task as in progress. Fails if the spec is not implementing or any dependency is unfinished."
    )]
    async fn start_task(&self, params: Parameters<TaskRef>) -> McpResult {
        self.handlers.start_task(params).await
    }

    #[tool(
        name = "complete_task",
        description = "Mark an in-progress task as completed. A non-empty summary of what was accomplished is required."
    )]
    async fn complete_task(&self, params: Parameters<CompleteTask>) -> McpResult {
        self.handlers.complete_task(params).await
    }

    #[tool(
        name = "fail_task",
        description = "Mark an in-progress task as failed with a note describing the failure. Failed tasks can be retried with retry_task."
    )]
    async fn fail_task(&self, params: Parameters<FailTask>) -> McpResult {
        self.handlers.fail_task(params).await
    }

    #[tool(
        name = "skip_task",
        description = "Skip a pending or in-progress task. Skipped tasks count as satisfied for their dependents and for review."
    )]
    async fn skip_task(&self, params: Parameters<TaskRef>) -> McpResult {
        self.handlers.skip_task(params).await
    }

    #[tool(
        name = "retry_task",
        description = "Move a failed task back to in progress."
    )]
    async fn retry_task(&self, params: Parameters<TaskRef>) -> McpResult {
        self.handlers.retry_task(params).await
    }

    #[tool(
        name = "rebuild_index",
        description = "Regenerate the active spec index from the spec records on disk. Operator repair for a lost or stale index."
    )]
    async fn rebuild_index(&self) -> McpResult {
        self.handlers.rebuild_index().await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for SpecflowMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "specflow".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(r#"Specflow drives units of feature work ("specs") through a fixed lifecycle, each on its own git branch and worktree.

## Phases
new → defined → planned → decomposed → implementing → reviewed → archived

- planned requires the specification artifact (see `artifact_path`)
- decomposed requires the plan artifact
- implementing requires a non-empty task set (`define_tasks`)
- reviewed requires every task completed or skipped
- archived is reached only through `archive_spec`, which merges the branch

## Typical Loop
1. `create_spec`, then `advance_phase` as artifacts are written
2. `define_tasks` with dependencies, `advance_phase` to implementing
3. Repeat: `ready_tasks` → `start_task` → work in the spec worktree → `complete_task`
4. `advance_phase` to reviewed, then `archive_spec`

## Errors
Gate and transition failures are reported as invalid parameters and name the unmet condition. Merge conflicts list the conflicting paths and leave everything untouched."#.to_string()),
        }
    }
}

/// Run the MCP server with stdio transport
pub async fn run_stdio_server(server: SpecflowMcpServer) -> Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    info!("Starting Specflow MCP server on stdio");
    debug!(
        "Server created with {} tools",
        server.tool_router.list_all().len()
    );

    let service = server.serve(stdio()).await.inspect_err(|e| {
        error!("serving error: {e:?}");
    })?;

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = service.waiting() => {
            match result {
                Ok(_) => info!("MCP server stopped normally"),
                Err(e) => error!("MCP server error: {e:?}"),
            }
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }

    info!("MCP server shutdown complete");
    Ok(())
}
