//! Error handling utilities for MCP server

use rmcp::ErrorData;
use specflow_core::{ErrorKind, OrchestratorError};

/// Maps an orchestrator error to an MCP error.
///
/// Validation failures are the caller's to fix and are reported as invalid
/// parameters; everything else is an internal error. The message always
/// carries the full error text so agents can act on the named condition.
pub fn to_mcp_error(message: &str, error: &OrchestratorError) -> ErrorData {
    let text = format!("{message}: {error}");
    match error.kind() {
        ErrorKind::Validation => ErrorData::invalid_params(text, None),
        _ => ErrorData::internal_error(text, None),
    }
}
