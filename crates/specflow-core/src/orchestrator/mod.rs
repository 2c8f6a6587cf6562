//! Async orchestration API.
//!
//! [`Orchestrator`] is the entry point for interfaces running on a tokio
//! runtime. Every call moves the blocking work (file I/O, `git`) onto the
//! blocking thread pool and runs the matching [`Engine`] operation there.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Orchestrator   │    │     Engine      │    │ Store / Phase / │
//! │ (async, params) │───▶│ (sync, per-spec │───▶│ Tasks /         │
//! │                 │    │  serialization) │    │ Workspace       │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use specflow_core::{params::{AdvancePhase, CreateSpec}, OrchestratorBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = OrchestratorBuilder::new()
//!     .with_root("/path/to/repo")
//!     .build()
//!     .await?;
//!
//! let spec = orchestrator
//!     .create_spec(&CreateSpec { name: "login-flow".to_string() })
//!     .await?;
//! orchestrator
//!     .advance_phase(&AdvancePhase { id: spec.id.clone(), force: false })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod spec_handlers;
pub mod task_handlers;


use std::sync::Arc;

use tokio::task;

pub use builder::OrchestratorBuilder;

use crate::{
    engine::Engine,
    error::{OrchestratorError, Result},
};

/// Async facade over a shared [`Engine`].
#[derive(Debug, Clone)]
pub struct Orchestrator {
    engine: Arc<Engine>,
}

impl Orchestrator {
    pub(crate) fn new(engine: Engine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// The underlying synchronous engine.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Runs `f` against the engine on the blocking thread pool.
    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Engine) -> Result<T> + Send + 'static,
    {
        let engine = Arc::clone(&self.engine);
        task::spawn_blocking(move || f(&engine))
            .await
            .map_err(|e| OrchestratorError::Configuration {
                message: format!("Task join error: {e}"),
            })?
    }
}
