//! Artifact existence checks used by the phase gates.

use crate::{models::ArtifactKind, store::Layout};

/// Answers "does artifact X exist for spec Y" without reading its content.
pub trait ArtifactProbe: Send + Sync {
    fn exists(&self, spec_id: &str, kind: ArtifactKind) -> bool;
}

/// Probes artifact files next to each active spec record.
#[derive(Debug, Clone)]
pub struct FsArtifacts {
    layout: Layout,
}

impl FsArtifacts {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }
}

impl ArtifactProbe for FsArtifacts {
    fn exists(&self, spec_id: &str, kind: ArtifactKind) -> bool {
        self.layout.artifact_path(spec_id, kind).is_file()
    }
}
