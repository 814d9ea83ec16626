// cmdext-core/src/services/reload.rs

use std::sync::Arc;
use parking_lot::Mutex;
use tracing::{error, info};
use cmdext_common::traits::{CustomCommandRepository, ScheduledTaskRepository};
use crate::Error;
use crate::services::registration::{RegistrationBridge, SyncReport};

/// Lifecycle of the scheduled-task subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
}

/// Re-derives the live command and job sets from the store.
///
/// Callers that mutate the store are responsible for serializing
/// "mutate, then reload" per entity kind; see `ManagementApi`.
pub struct ReloadController {
    command_repo: Arc<dyn CustomCommandRepository>,
    task_repo: Arc<dyn ScheduledTaskRepository>,
    bridge: Arc<RegistrationBridge>,
    scheduler_state: Mutex<SchedulerState>,
}

impl ReloadController {
    pub fn new(
        command_repo: Arc<dyn CustomCommandRepository>,
        task_repo: Arc<dyn ScheduledTaskRepository>,
        bridge: Arc<RegistrationBridge>,
    ) -> Self {
        Self {
            command_repo,
            task_repo,
            bridge,
            scheduler_state: Mutex::new(SchedulerState::Stopped),
        }
    }

    /// Drain all live commands and register every enabled row.
    ///
    /// On a store failure the previous live set is left as is.
    pub async fn reload_commands(&self) -> Result<SyncReport, Error> {
        let rows = match self.command_repo.list_enabled_commands().await {
            Ok(rows) => rows,
            Err(e) => {
                error!("Failed to reload commands: {}", e);
                return Err(e);
            }
        };

        let report = self.bridge.sync_commands(&rows);
        info!(
            "Loaded {} custom command(s) from database ({} skipped)",
            report.registered, report.skipped
        );
        Ok(report)
    }

    /// Stopped -> Running: load enabled tasks and schedule a job for each.
    ///
    /// The scheduler counts as started even if the store cannot be read; it
    /// just has no jobs until the next successful reload.
    pub async fn start_tasks(&self) -> Result<SyncReport, Error> {
        *self.scheduler_state.lock() = SchedulerState::Running;
        let rows = match self.task_repo.list_enabled_tasks().await {
            Ok(rows) => rows,
            Err(e) => {
                error!("Failed to load scheduled tasks: {}", e);
                return Err(e);
            }
        };

        let report = self.bridge.sync_tasks(&rows);
        if report.registered > 0 {
            info!("Loaded {} scheduled task(s)", report.registered);
        }
        Ok(report)
    }

    /// Running -> Stopped: remove every tracked job.
    pub fn stop_tasks(&self) {
        let removed = self.bridge.drain_tasks();
        *self.scheduler_state.lock() = SchedulerState::Stopped;
        if removed > 0 {
            info!("Stopped {} scheduled task(s)", removed);
        }
    }

    /// `stop_tasks` followed by `start_tasks`.
    pub async fn reload_tasks(&self) -> Result<SyncReport, Error> {
        self.stop_tasks();
        let report = self.start_tasks().await?;
        info!("Scheduled tasks reloaded");
        Ok(report)
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        *self.scheduler_state.lock()
    }

    /// Retract every live command (used on shutdown).
    pub fn drain_commands(&self) {
        let removed = self.bridge.drain_commands();
        if removed > 0 {
            info!("Unregistered {} custom command(s)", removed);
        }
    }
}
