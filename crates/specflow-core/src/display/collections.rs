//! Collection wrappers with empty-collection handling.

use std::{fmt, ops::Index};

use crate::{
    models::{SpecSummary, Task},
    tasks::BlockedTask,
};

/// Newtype wrapper for displaying spec summaries.
///
/// # Examples
///
/// ```rust
/// use specflow_core::{display::SpecSummaries, models::{Spec, SpecSummary}};
///
/// let spec = Spec::new("0a1b2c3d", "login", "spec/0a1b2c3d-login", "/ws");
/// let summaries = SpecSummaries(vec![SpecSummary::from(&spec)]);
/// assert!(summaries.to_string().contains("## login (ID: 0a1b2c3d)"));
/// ```
pub struct SpecSummaries(pub Vec<SpecSummary>);

impl SpecSummaries {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SpecSummary> {
        self.0.iter()
    }
}

impl Index<usize> for SpecSummaries {
    type Output = SpecSummary;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IntoIterator for SpecSummaries {
    type Item = SpecSummary;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for SpecSummaries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No specs found.");
        }
        for summary in &self.0 {
            write!(f, "{summary}")?;
        }
        Ok(())
    }
}

/// Newtype wrapper for displaying a list of tasks.
pub struct Tasks(pub Vec<Task>);

impl Tasks {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for Tasks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No tasks found.");
        }
        for task in &self.0 {
            write!(f, "{task}")?;
        }
        Ok(())
    }
}

/// Newtype wrapper for the blocked-task report.
pub struct BlockedTasks(pub Vec<BlockedTask>);

impl fmt::Display for BlockedTasks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No blocked tasks.");
        }
        for blocked in &self.0 {
            writeln!(
                f,
                "- **{}** {}: waiting on {}",
                blocked.task_id,
                blocked.name,
                blocked.waiting_on.join(", ")
            )?;
        }
        Ok(())
    }
}
