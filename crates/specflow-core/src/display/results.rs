//! Result wrapper types for displaying operation outcomes.

use std::fmt;

use crate::{
    engine::ArchiveOutcome,
    models::{Spec, Task},
    phase::AdvanceOutcome,
};

/// Wrapper type for displaying the result of create operations.
///
/// # Examples
///
/// ```rust
/// use specflow_core::{display::CreateResult, models::Spec};
///
/// let spec = Spec::new("0a1b2c3d", "login", "spec/0a1b2c3d-login", "/ws");
/// let output = CreateResult::new(spec).to_string();
/// assert!(output.starts_with("Created spec 'login' with ID: 0a1b2c3d"));
/// ```
pub struct CreateResult<T> {
    pub resource: T,
}

impl<T> CreateResult<T> {
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl fmt::Display for CreateResult<Spec> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Created spec '{}' with ID: {}",
            self.resource.name, self.resource.id
        )?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

/// Wrapper type for displaying the result of update operations, with the
/// list of changes made.
pub struct UpdateResult<T> {
    pub resource: T,
    pub changes: Vec<String>,
}

impl<T> UpdateResult<T> {
    pub fn new(resource: T) -> Self {
        Self {
            resource,
            changes: Vec::new(),
        }
    }

    pub fn with_changes(resource: T, changes: Vec<String>) -> Self {
        Self { resource, changes }
    }

    fn fmt_changes(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.changes.is_empty() {
            writeln!(f)?;
            writeln!(f, "Changes made:")?;
            for change in &self.changes {
                writeln!(f, "- {change}")?;
            }
        }
        writeln!(f)
    }
}

impl fmt::Display for UpdateResult<Task> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Updated task {}", self.resource.id)?;
        self.fmt_changes(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for UpdateResult<Spec> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Updated spec {}", self.resource.id)?;
        self.fmt_changes(f)?;
        write!(f, "{}", self.resource)
    }
}

/// Wrapper type for displaying a cancelled spec.
pub struct DeleteResult<T> {
    pub resource: T,
}

impl<T> DeleteResult<T> {
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl fmt::Display for DeleteResult<Spec> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let how = if self.resource.cancelled_at.is_some() {
            "tombstoned"
        } else {
            "deleted"
        };
        writeln!(
            f,
            "Cancelled spec '{}' (ID: {}); record {how}",
            self.resource.name, self.resource.id
        )
    }
}

/// A phase advance of one spec.
pub struct PhaseResult<'a> {
    pub id: &'a str,
    pub outcome: &'a AdvanceOutcome,
}

impl fmt::Display for PhaseResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Spec {} advanced: {} -> {}",
            self.id, self.outcome.from, self.outcome.to
        )?;
        if self.outcome.forced {
            writeln!(f)?;
            writeln!(f, "**Forced.** Bypassed gates:")?;
            for warning in &self.outcome.warnings {
                writeln!(f, "- {warning}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for ArchiveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Archived spec '{}' (ID: {})", self.spec.name, self.spec.id)?;
        if let Some(merge) = &self.merge {
            writeln!(
                f,
                "- Merged `{}` into `{}` ({})",
                merge.branch, merge.target, merge.strategy
            )?;
            writeln!(f, "- Target tip: {:.12} -> {:.12}", merge.before, merge.after)?;
        }
        if self.forced {
            writeln!(f, "- **Forced** past the review gate")?;
        }
        Ok(())
    }
}
