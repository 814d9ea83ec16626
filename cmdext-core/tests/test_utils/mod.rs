// File: cmdext-core/tests/test_utils/mod.rs

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use parking_lot::Mutex;
use cmdext_common::traits::ChatSink;
use cmdext_core::api::ManagementApi;
use cmdext_core::repositories::{SqliteCustomCommandRepository, SqliteScheduledTaskRepository};
use cmdext_core::runtime::LocalBotRuntime;
use cmdext_core::services::{RegistrationBridge, ReloadController};
use cmdext_core::{Database, Error};

/// Remembers everything the bot "said".
#[derive(Default)]
pub struct RecordingSink {
    pub sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl ChatSink for RecordingSink {
    async fn send_message(&self, channel: &str, text: &str) -> Result<(), Error> {
        self.sent.lock().push((channel.to_string(), text.to_string()));
        Ok(())
    }
}

pub struct Harness {
    pub db: Database,
    pub runtime: Arc<LocalBotRuntime>,
    pub sink: Arc<RecordingSink>,
    pub api: Arc<ManagementApi>,
}

/// In-memory store wired to a local runtime whose "minute" is an hour long,
/// so scheduled jobs never fire during a test.
pub async fn setup_harness() -> Result<Harness, Error> {
    let db = Database::new(":memory:").await?;
    let sink = Arc::new(RecordingSink::default());
    let runtime = Arc::new(
        LocalBotRuntime::new("test_channel", sink.clone()).with_time_unit(Duration::from_secs(3600)),
    );

    let command_repo = Arc::new(SqliteCustomCommandRepository::new(db.pool().clone()));
    let task_repo = Arc::new(SqliteScheduledTaskRepository::new(db.pool().clone()));
    let bridge = Arc::new(RegistrationBridge::new(runtime.clone()));
    let reload = Arc::new(ReloadController::new(command_repo.clone(), task_repo.clone(), bridge));
    let api = Arc::new(ManagementApi::new(command_repo, task_repo, reload));

    Ok(Harness { db, runtime, sink, api })
}

pub fn sorted(mut names: Vec<String>) -> Vec<String> {
    names.sort();
    names
}
