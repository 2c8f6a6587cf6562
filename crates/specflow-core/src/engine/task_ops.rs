//! Task-level operations.

use log::info;

use super::Engine;
use crate::{
    error::{OrchestratorError, Result},
    events::TransitionEvent,
    models::{Spec, Task},
    tasks::{self, transitions, BlockedTask, StatusChange},
};

impl Engine {
    /// Installs a complete task collection, replacing the previous one.
    pub fn define_tasks(&self, id: &str, definitions: Vec<Task>) -> Result<Spec> {
        self.with_spec_lock(id, || {
            let mut spec = self.load_active(id)?;
            tasks::replace_tasks(&mut spec, definitions)?;
            self.store.save(&mut spec)?;
            info!("Defined {} tasks for spec {id}", spec.tasks.len());
            Ok(spec)
        })
    }

    /// Pending tasks whose dependencies are all satisfied, by ascending id.
    pub fn ready_tasks(&self, id: &str) -> Result<Vec<Task>> {
        let spec = self.load_active(id)?;
        Ok(tasks::find_ready(&spec.tasks).into_iter().cloned().collect())
    }

    /// Pending tasks that are waiting on unfinished dependencies.
    pub fn blocked_tasks(&self, id: &str) -> Result<Vec<BlockedTask>> {
        let spec = self.load_active(id)?;
        Ok(tasks::blocked_report(&spec.tasks))
    }

    pub fn start_task(&self, id: &str, task_id: &str) -> Result<Task> {
        self.update_task(id, task_id, |spec| transitions::start(spec, task_id))
    }

    pub fn complete_task(&self, id: &str, task_id: &str, summary: &str) -> Result<Task> {
        self.update_task(id, task_id, |spec| {
            transitions::complete(spec, task_id, summary)
        })
    }

    pub fn fail_task(&self, id: &str, task_id: &str, error: &str) -> Result<Task> {
        self.update_task(id, task_id, |spec| transitions::fail(spec, task_id, error))
    }

    pub fn skip_task(&self, id: &str, task_id: &str) -> Result<Task> {
        self.update_task(id, task_id, |spec| transitions::skip(spec, task_id))
    }

    pub fn retry_task(&self, id: &str, task_id: &str) -> Result<Task> {
        self.update_task(id, task_id, |spec| transitions::retry(spec, task_id))
    }

    /// Applies one status transition and persists it before returning.
    fn update_task(
        &self,
        id: &str,
        task_id: &str,
        transition: impl FnOnce(&mut Spec) -> Result<StatusChange>,
    ) -> Result<Task> {
        self.with_spec_lock(id, || {
            let mut spec = self.load_active(id)?;
            let change = transition(&mut spec)?;
            self.store.save(&mut spec)?;

            info!(
                "Task {task_id} of spec {id}: {} -> {}",
                change.from, change.to
            );
            self.emit(TransitionEvent::task(id, task_id, change.from, change.to));

            spec.task(task_id)
                .cloned()
                .ok_or_else(|| OrchestratorError::TaskNotFound {
                    spec: id.to_string(),
                    task: task_id.to_string(),
                })
        })
    }
}
