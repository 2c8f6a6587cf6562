//! Task operations of the [`Orchestrator`].

use super::Orchestrator;
use crate::{
    display::{BlockedTasks, Tasks},
    error::Result,
    models::{Spec, Task},
    params::{CompleteTask, DefineTasks, FailTask, SpecId, TaskRef},
};

impl Orchestrator {
    /// Replaces a spec's task collection after validating it.
    pub async fn define_tasks(&self, params: &DefineTasks) -> Result<Spec> {
        let id = params.id.clone();
        let tasks: Vec<Task> = params.tasks.iter().cloned().map(Task::from).collect();
        self.run(move |engine| engine.define_tasks(&id, tasks)).await
    }

    /// Tasks that can be started now, by ascending id.
    pub async fn ready_tasks(&self, params: &SpecId) -> Result<Tasks> {
        let id = params.id.clone();
        self.run(move |engine| engine.ready_tasks(&id))
            .await
            .map(Tasks)
    }

    /// Pending tasks waiting on unfinished dependencies.
    pub async fn blocked_tasks(&self, params: &SpecId) -> Result<BlockedTasks> {
        let id = params.id.clone();
        self.run(move |engine| engine.blocked_tasks(&id))
            .await
            .map(BlockedTasks)
    }

    pub async fn start_task(&self, params: &TaskRef) -> Result<Task> {
        let TaskRef { id, task_id } = params.clone();
        self.run(move |engine| engine.start_task(&id, &task_id)).await
    }

    pub async fn complete_task(&self, params: &CompleteTask) -> Result<Task> {
        let CompleteTask {
            id,
            task_id,
            summary,
        } = params.clone();
        self.run(move |engine| engine.complete_task(&id, &task_id, &summary))
            .await
    }

    pub async fn fail_task(&self, params: &FailTask) -> Result<Task> {
        let FailTask { id, task_id, error } = params.clone();
        self.run(move |engine| engine.fail_task(&id, &task_id, &error))
            .await
    }

    pub async fn skip_task(&self, params: &TaskRef) -> Result<Task> {
        let TaskRef { id, task_id } = params.clone();
        self.run(move |engine| engine.skip_task(&id, &task_id)).await
    }

    pub async fn retry_task(&self, params: &TaskRef) -> Result<Task> {
        let TaskRef { id, task_id } = params.clone();
        self.run(move |engine| engine.retry_task(&id, &task_id)).await
    }
}
