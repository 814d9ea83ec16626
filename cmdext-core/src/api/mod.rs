// cmdext-core/src/api/mod.rs

pub mod payloads;

use std::sync::Arc;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};
use cmdext_common::models::{CustomCommand, NewCustomCommand, NewScheduledTask, ScheduledTask};
use cmdext_common::traits::{CustomCommandRepository, ScheduledTaskRepository};
use crate::Error;
use crate::services::ReloadController;

pub use payloads::{decode_json, parse_id, CreateCommandRequest, CreateTaskRequest};

/// JSON shape of one command in `GET /api/commands`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandView {
    pub id: i64,
    pub command_name: String,
    pub response: String,
    pub required_role: String,
    pub user_cooldown: i64,
    pub global_cooldown: i64,
    pub is_enabled: bool,
}

impl From<CustomCommand> for CommandView {
    fn from(c: CustomCommand) -> Self {
        Self {
            id: c.id,
            command_name: c.command_name,
            response: c.response,
            required_role: c.required_role,
            user_cooldown: c.user_cooldown_seconds,
            global_cooldown: c.global_cooldown_seconds,
            is_enabled: c.is_enabled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: i64,
    pub task_name: String,
    pub message: String,
    pub interval_minutes: i64,
    pub is_enabled: bool,
}

impl From<ScheduledTask> for TaskView {
    fn from(t: ScheduledTask) -> Self {
        Self {
            id: t.id,
            task_name: t.task_name,
            message: t.message,
            interval_minutes: t.interval_minutes,
            is_enabled: t.is_enabled,
        }
    }
}

/// List/create/delete for both entity kinds.
///
/// Each mutation holds its kind's lock across "write store, reload live set",
/// so two writers can never interleave their reloads. Listing takes no lock.
pub struct ManagementApi {
    command_repo: Arc<dyn CustomCommandRepository>,
    task_repo: Arc<dyn ScheduledTaskRepository>,
    reload: Arc<ReloadController>,
    command_lock: Mutex<()>,
    task_lock: Mutex<()>,
}

impl ManagementApi {
    pub fn new(
        command_repo: Arc<dyn CustomCommandRepository>,
        task_repo: Arc<dyn ScheduledTaskRepository>,
        reload: Arc<ReloadController>,
    ) -> Self {
        Self {
            command_repo,
            task_repo,
            reload,
            command_lock: Mutex::new(()),
            task_lock: Mutex::new(()),
        }
    }

    pub fn reload_controller(&self) -> &Arc<ReloadController> {
        &self.reload
    }

    pub async fn list_commands(&self) -> Result<Vec<CommandView>, Error> {
        let rows = self.command_repo.list_all_commands().await?;
        Ok(rows.into_iter().map(CommandView::from).collect())
    }

    pub async fn create_command(&self, req: CreateCommandRequest) -> Result<i64, Error> {
        let new_cmd = NewCustomCommand::try_from(req)?;

        let _guard = self.command_lock.lock().await;
        let id = self.command_repo.insert_command(&new_cmd).await?;
        info!("Created command '{}' (id={})", new_cmd.command_name, id);
        self.reload_commands_after_write().await;
        Ok(id)
    }

    pub async fn delete_command(&self, raw_id: &str) -> Result<(), Error> {
        let id = parse_id(raw_id)?;

        let _guard = self.command_lock.lock().await;
        self.command_repo.delete_command(id).await?;
        info!("Deleted command id={}", id);
        self.reload_commands_after_write().await;
        Ok(())
    }

    pub async fn list_tasks(&self) -> Result<Vec<TaskView>, Error> {
        let rows = self.task_repo.list_all_tasks().await?;
        Ok(rows.into_iter().map(TaskView::from).collect())
    }

    pub async fn create_task(&self, req: CreateTaskRequest) -> Result<i64, Error> {
        let new_task = NewScheduledTask::try_from(req)?;

        let _guard = self.task_lock.lock().await;
        let id = self.task_repo.insert_task(&new_task).await?;
        info!("Created scheduled task '{}' (id={})", new_task.task_name, id);
        self.reload_tasks_after_write().await;
        Ok(id)
    }

    pub async fn delete_task(&self, raw_id: &str) -> Result<(), Error> {
        let id = parse_id(raw_id)?;

        let _guard = self.task_lock.lock().await;
        self.task_repo.delete_task(id).await?;
        info!("Deleted scheduled task id={}", id);
        self.reload_tasks_after_write().await;
        Ok(())
    }

    // The write already committed; a failed reload is logged, not reported.
    async fn reload_commands_after_write(&self) {
        if let Err(e) = self.reload.reload_commands().await {
            warn!("Command reload after write failed: {}", e);
        }
    }

    async fn reload_tasks_after_write(&self) {
        if let Err(e) = self.reload.reload_tasks().await {
            warn!("Task reload after write failed: {}", e);
        }
    }
}
