//! Markdown `Display` implementations for domain models.

use std::fmt;

use super::datetime::LocalDateTime;
use crate::models::{Spec, SpecSummary, Task, TaskCounts, TaskStatus};

impl fmt::Display for TaskCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total == 0 {
            return f.write_str("no tasks");
        }
        write!(
            f,
            "{}/{} done ({:.0}%)",
            self.finished(),
            self.total,
            self.percentage()
        )?;
        if self.failed > 0 {
            write!(f, ", {} failed", self.failed)?;
        }
        Ok(())
    }
}

impl fmt::Display for Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {} ({})", self.name, self.id)?;
        writeln!(f)?;
        writeln!(f, "- Phase: {}", self.phase)?;
        writeln!(f, "- Branch: `{}`", self.branch)?;
        writeln!(f, "- Workspace: `{}`", self.workspace.display())?;
        writeln!(f, "- Progress: {}", self.task_counts())?;
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))?;
        if let Some(cancelled) = &self.cancelled_at {
            writeln!(f, "- Cancelled: {}", LocalDateTime(cancelled))?;
        }

        if self.tasks.is_empty() {
            writeln!(f, "\nNo tasks defined.")?;
        } else {
            writeln!(f, "\n## Tasks")?;
            writeln!(f)?;
            for task in &self.tasks {
                write!(f, "{task}")?;
            }
        }

        if self.history.iter().any(|transition| transition.forced) {
            writeln!(f, "## Forced transitions")?;
            writeln!(f)?;
            for transition in self.history.iter().filter(|t| t.forced) {
                writeln!(
                    f,
                    "- {} -> {} at {}",
                    transition.from,
                    transition.to,
                    LocalDateTime(&transition.at)
                )?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "### {}. {} ({})", self.id, self.name, self.status.with_icon())?;
        writeln!(f)?;

        if !self.description.is_empty() {
            writeln!(f, "{}", self.description)?;
            writeln!(f)?;
        }
        if !self.depends_on.is_empty() {
            writeln!(f, "- Depends on: {}", self.depends_on.join(", "))?;
        }
        if !self.context_refs.is_empty() {
            writeln!(f, "- Context: {}", self.context_refs.join(", "))?;
        }
        if let Some(started) = &self.started_at {
            writeln!(f, "- Started: {}", LocalDateTime(started))?;
        }
        if let Some(completed) = &self.completed_at {
            writeln!(f, "- Completed: {}", LocalDateTime(completed))?;
        }
        if self.status == TaskStatus::Failed {
            if let Some(error) = &self.last_error {
                writeln!(f, "- Last error: {error}")?;
            }
        }
        if !self.depends_on.is_empty()
            || !self.context_refs.is_empty()
            || self.started_at.is_some()
            || self.completed_at.is_some()
            || (self.status == TaskStatus::Failed && self.last_error.is_some())
        {
            writeln!(f)?;
        }

        if let Some(summary) = &self.summary {
            writeln!(f, "#### Summary")?;
            writeln!(f)?;
            writeln!(f, "{summary}")?;
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for SpecSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## {} (ID: {})", self.name, self.id)?;
        writeln!(f)?;
        writeln!(f, "- **Phase**: {}", self.phase)?;
        writeln!(f, "- **Tasks**: {}", self.tasks)?;
        writeln!(f, "- **Branch**: `{}`", self.branch)?;
        writeln!(f, "- **Created**: {}", LocalDateTime(&self.created_at))?;
        writeln!(f)
    }
}
