//! Specflow CLI Application
//!
//! Command-line and MCP interface for the specflow workflow orchestrator.

mod args;
mod cli;
mod mcp;
mod renderer;

use std::path::PathBuf;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use mcp::{run_stdio_server, SpecflowMcpServer};
use renderer::TerminalRenderer;
use specflow_core::{
    display::OperationStatus, params::ListSpecs, Layout, OrchestratorBuilder, ProjectConfig,
};
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        root,
        events,
        no_color,
        command,
    } = Args::parse();

    let root = match root {
        Some(root) => root,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let renderer = TerminalRenderer::new(!no_color);

    if let Some(Init) = command {
        return init(root, &renderer);
    }

    let orchestrator = OrchestratorBuilder::new()
        .with_root(&root)
        .with_events_path(events)
        .build()
        .await
        .context("Failed to initialize orchestrator")?;

    info!("Specflow started in {}", root.display());

    match command {
        Some(Spec { command }) => {
            Cli::new(orchestrator, renderer)
                .handle_spec_command(command)
                .await
        }
        Some(Task { command }) => {
            Cli::new(orchestrator, renderer)
                .handle_task_command(command)
                .await
        }
        Some(Reindex) => Cli::new(orchestrator, renderer).rebuild_index().await,
        Some(Serve) => {
            info!("Starting Specflow MCP server");
            run_stdio_server(SpecflowMcpServer::new(orchestrator))
                .await
                .context("MCP server failed")
        }
        Some(Init) | None => {
            Cli::new(orchestrator, renderer)
                .list_specs(&ListSpecs { archived: false })
                .await
        }
    }
}

fn init(root: PathBuf, renderer: &TerminalRenderer) -> Result<()> {
    let layout = Layout::new(root);
    let created = ProjectConfig::init(&layout).context("Failed to initialize project")?;
    let message = if created {
        format!("Initialized {}", layout.config_file().display())
    } else {
        format!("Already initialized: {}", layout.config_file().display())
    };
    renderer.render(&OperationStatus::success(message).to_string())
}
