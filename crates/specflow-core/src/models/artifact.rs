//! Artifacts produced by the external content generator.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of document that phase gates check for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum ArtifactKind {
    /// Optional short description written before the spec is defined
    Brief,
    /// Feature specification
    Specification,
    /// Implementation plan
    Plan,
    /// Human-readable task breakdown
    Tasks,
}

impl ArtifactKind {
    /// File name of the artifact inside the spec directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactKind::Brief => "brief.md",
            ArtifactKind::Specification => "spec.md",
            ArtifactKind::Plan => "plan.md",
            ArtifactKind::Tasks => "tasks.md",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::Brief => "brief",
            ArtifactKind::Specification => "specification",
            ArtifactKind::Plan => "plan",
            ArtifactKind::Tasks => "tasks",
        };
        f.write_str(name)
    }
}
