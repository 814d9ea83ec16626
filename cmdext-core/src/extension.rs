// cmdext-core/src/extension.rs

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};
use cmdext_common::traits::BotRuntime;
use crate::Error;
use crate::api::ManagementApi;
use crate::db::Database;
use crate::repositories::{SqliteCustomCommandRepository, SqliteScheduledTaskRepository};
use crate::services::{RegistrationBridge, ReloadController};
use crate::settings::Settings;
use crate::web::WebServer;

pub const EXTENSION_NAME: &str = "CommandsExtension";

/// Everything the extension owns between `initialize` and `shutdown`.
pub struct CommandsExtension {
    api: Arc<ManagementApi>,
    reload: Arc<ReloadController>,
    web: Option<WebServer>,
}

impl CommandsExtension {
    /// Open the store, push its enabled rows into `runtime`, start the
    /// scheduler and bring up the management UI on `127.0.0.1:<port>`.
    ///
    /// A web server that fails to bind is logged; commands and tasks keep working.
    pub async fn initialize(
        db_path: &str,
        runtime: Arc<dyn BotRuntime>,
        settings: &Settings,
    ) -> Result<Self, Error> {
        info!("[{}] initializing (db={})", EXTENSION_NAME, db_path);
        let db = Database::new(db_path).await?;

        let command_repo = Arc::new(SqliteCustomCommandRepository::new(db.pool().clone()));
        let task_repo = Arc::new(SqliteScheduledTaskRepository::new(db.pool().clone()));
        let bridge = Arc::new(RegistrationBridge::new(runtime));
        let reload = Arc::new(ReloadController::new(command_repo.clone(), task_repo.clone(), bridge));
        let api = Arc::new(ManagementApi::new(command_repo, task_repo, reload.clone()));

        if let Err(e) = reload.reload_commands().await {
            warn!("[{}] initial command load failed: {}", EXTENSION_NAME, e);
        }
        if let Err(e) = reload.start_tasks().await {
            warn!("[{}] scheduled tasks not started: {}", EXTENSION_NAME, e);
        }

        let addr = SocketAddr::from(([127, 0, 0, 1], settings.web_server_port));
        let web = match WebServer::start(addr, api.clone()).await {
            Ok(server) => {
                info!("[{}] Web UI available at http://localhost:{}", EXTENSION_NAME, server.local_addr().port());
                Some(server)
            }
            Err(e) => {
                error!("[{}] failed to start web server: {}", EXTENSION_NAME, e);
                None
            }
        };

        Ok(Self { api, reload, web })
    }

    pub fn api(&self) -> &Arc<ManagementApi> {
        &self.api
    }

    pub fn reload_controller(&self) -> &Arc<ReloadController> {
        &self.reload
    }

    /// Where the management UI is listening, if it came up.
    pub fn web_addr(&self) -> Option<SocketAddr> {
        self.web.as_ref().map(WebServer::local_addr)
    }

    /// Stop the web server, then the scheduler, then retract every command.
    pub async fn shutdown(&mut self) {
        if let Some(web) = self.web.take() {
            if let Err(e) = web.stop().await {
                warn!("[{}] web server stopped with error: {}", EXTENSION_NAME, e);
            }
        }
        self.reload.stop_tasks();
        self.reload.drain_commands();
        info!("[{}] shut down", EXTENSION_NAME);
    }
}
