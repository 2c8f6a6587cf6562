//! Crash-consistent file replacement.
//!
//! Content is first written to a uniquely named staging file in the target's
//! directory and synced, then renamed over the target in one step. A staging
//! file that is dropped before [`StagedWrite::commit`] is deleted.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;

use crate::error::{IoResultExt, Result};

/// Prefix of every staging file; readers never look at these.
pub const STAGING_PREFIX: &str = ".staging-";

/// A fully written, synced staging file awaiting its final rename.
#[derive(Debug)]
pub struct StagedWrite {
    file: NamedTempFile,
    target: PathBuf,
}

impl StagedWrite {
    /// Path of the staging file.
    pub fn staging_path(&self) -> &Path {
        self.file.path()
    }

    /// Atomically replaces the target with the staged content.
    pub fn commit(self) -> Result<()> {
        let target = self.target;
        self.file
            .persist(&target)
            .map_err(|e| e.error)
            .at_path(&target)?;
        sync_parent(&target);
        Ok(())
    }

    /// Leaves the staging file on disk without committing it.
    #[cfg(test)]
    pub(crate) fn abandon(self) -> PathBuf {
        match self.file.keep() {
            Ok((_, path)) => path,
            Err(e) => panic!("failed to keep staging file: {e}"),
        }
    }
}

/// Writes `content` to a staging file next to `target` and syncs it.
pub fn stage(target: &Path, content: &[u8]) -> Result<StagedWrite> {
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).at_path(dir)?;

    let mut file = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .suffix(".tmp")
        .tempfile_in(dir)
        .at_path(dir)?;
    file.write_all(content).at_path(file.path().to_path_buf())?;
    file.as_file()
        .sync_all()
        .at_path(file.path().to_path_buf())?;

    Ok(StagedWrite {
        file,
        target: target.to_path_buf(),
    })
}

/// Stages and commits in one call.
pub fn write_atomic(target: &Path, content: &[u8]) -> Result<()> {
    stage(target, content)?.commit()
}

#[cfg(unix)]
fn sync_parent(target: &Path) {
    if let Some(dir) = target.parent() {
        if let Err(e) = fs::File::open(dir).and_then(|d| d.sync_all()) {
            log::debug!("Could not sync directory {}: {e}", dir.display());
        }
    }
}

#[cfg(not(unix))]
fn sync_parent(_target: &Path) {}
