//! Error types for the orchestrator library.

use std::{fmt, path::PathBuf};

use thiserror::Error;

use crate::{
    models::{Phase, TaskStatus},
    phase::GateFailure,
};

/// Coarse classification of every [`OrchestratorError`].
///
/// Callers use the kind to decide the next action without inspecting the
/// individual variant: validation errors are fixed by satisfying the named
/// condition (or forcing), conflict errors by operator action on the
/// repository, integrity errors by manual repair of the persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A precondition or transition rule was not satisfied
    Validation,
    /// Branch/workspace collision, merge conflict or dirty workspace
    Conflict,
    /// Missing or corrupt persisted state
    Integrity,
    /// Operation attempted on an archived spec
    Terminal,
    /// File system, version control or configuration failure
    Environment,
}

/// Comprehensive error type for all orchestrator operations.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// A phase gate was not satisfied
    #[error("Cannot advance spec {id} from {from} to {to}: {unmet}")]
    Validation {
        id: String,
        from: Phase,
        to: Phase,
        unmet: GateFailure,
    },
    /// The reviewed → archived edge is only reachable through archive
    #[error("Spec {id} is reviewed; use archive to merge and complete it")]
    ArchiveRequired { id: String },
    /// Operation is not allowed in the spec's current phase
    #[error("Spec {id} is in phase {actual}; operation requires {expected}")]
    WrongPhase {
        id: String,
        expected: String,
        actual: Phase,
    },
    /// The task dependency graph contains a cycle
    #[error("Cyclic task dependency: {}", .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },
    /// A task depends on an id that is not in the collection
    #[error("Task {task} depends on unknown task {dependency}")]
    UnknownDependency { task: String, dependency: String },
    /// Two tasks share an id
    #[error("Duplicate task id {id}")]
    DuplicateTaskId { id: String },
    /// Task collection can no longer be replaced wholesale
    #[error("Tasks of spec {id} cannot be replaced: task {task} is {status}")]
    TasksAlreadyStarted {
        id: String,
        task: String,
        status: TaskStatus,
    },
    /// Task is pending but some dependency is unsatisfied
    #[error("Task {task} is not ready; waiting on: {}", .waiting_on.join(", "))]
    NotReady {
        task: String,
        waiting_on: Vec<String>,
    },
    /// Completing a task requires a non-empty summary
    #[error("Task {task} cannot be completed without a summary")]
    EmptySummary { task: String },
    /// Task status transition is not permitted
    #[error("Task {task} cannot go from {from} to {to}")]
    InvalidTransition {
        task: String,
        from: TaskStatus,
        to: TaskStatus,
    },
    /// Task not found in the spec
    #[error("Task {task} not found in spec {spec}")]
    TaskNotFound { spec: String, task: String },
    /// Spec already reached its terminal phase
    #[error("Spec {id} is archived; no further transitions are permitted")]
    TerminalPhase { id: String },
    /// Branch already exists in the repository
    #[error("Branch '{branch}' already exists")]
    BranchExists { branch: String },
    /// Workspace directory already exists
    #[error("Workspace '{}' already exists", .path.display())]
    WorkspaceExists { path: PathBuf },
    /// Trial merge found conflicting paths
    #[error("Merging '{branch}' into '{target}' conflicts on: {}", .paths.join(", "))]
    MergeConflict {
        branch: String,
        target: String,
        paths: Vec<String>,
    },
    /// Fast-forward-only merge requested but histories diverged
    #[error("Cannot fast-forward '{target}' to '{branch}'")]
    NotFastForward { branch: String, target: String },
    /// The spec workspace has uncommitted modifications
    #[error("Workspace '{}' has uncommitted changes", .path.display())]
    DirtyWorkspace { path: PathBuf },
    /// Another active spec already uses this name
    #[error("An active spec named '{name}' already exists")]
    DuplicateName { name: String },
    /// No spec record for the given id
    #[error("Spec {id} not found")]
    NotFound { id: String },
    /// Persisted record failed structural validation
    #[error("Corrupt state for spec {id}: {reason}")]
    CorruptState { id: String, reason: String },
    /// Spec is already present in the completed index
    #[error("Spec {id} is already archived")]
    AlreadyArchived { id: String },
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// File system operation errors
    #[error("File system error at path '{}': {source}", .path.display())]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Version control backend failure
    #[error("Version control error during {operation}: {message}")]
    Vcs { operation: String, message: String },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> OrchestratorError {
        OrchestratorError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl OrchestratorError {
    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Creates a version control error for the named operation.
    pub fn vcs(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Vcs {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Creates a corrupt-state error for a spec record.
    pub fn corrupt(id: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::CorruptState {
            id: id.into(),
            reason: reason.to_string(),
        }
    }

    /// Classifies the error into the taxonomy callers act on.
    pub fn kind(&self) -> ErrorKind {
        use OrchestratorError::*;

        match self {
            Validation { .. }
            | ArchiveRequired { .. }
            | WrongPhase { .. }
            | CyclicDependency { .. }
            | UnknownDependency { .. }
            | DuplicateTaskId { .. }
            | TasksAlreadyStarted { .. }
            | NotReady { .. }
            | EmptySummary { .. }
            | InvalidTransition { .. }
            | TaskNotFound { .. }
            | InvalidInput { .. } => ErrorKind::Validation,
            BranchExists { .. }
            | WorkspaceExists { .. }
            | MergeConflict { .. }
            | NotFastForward { .. }
            | DirtyWorkspace { .. }
            | DuplicateName { .. } => ErrorKind::Conflict,
            NotFound { .. } | CorruptState { .. } | AlreadyArchived { .. } => {
                ErrorKind::Integrity
            }
            TerminalPhase { .. } => ErrorKind::Terminal,
            FileSystem { .. } | Vcs { .. } | Serialization { .. } | Configuration { .. } => {
                ErrorKind::Environment
            }
        }
    }
}

/// Extension trait attaching a path to I/O failures.
pub trait IoResultExt<T> {
    /// Map an I/O error to [`OrchestratorError::FileSystem`] at `path`.
    fn at_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::result::Result<T, std::io::Error> {
    fn at_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| OrchestratorError::FileSystem {
            path: path.into(),
            source,
        })
    }
}

/// Extension trait for Result to provide concise error mapping with
/// anyhow-style context.
pub trait ResultExt<T, E> {
    /// Add context to any error type, converting to OrchestratorError.
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| OrchestratorError::Configuration {
            message: format!("{}: {}", context, e),
        })
    }
}

/// Result type alias for orchestrator operations
pub type Result<T> = std::result::Result<T, OrchestratorError>;
