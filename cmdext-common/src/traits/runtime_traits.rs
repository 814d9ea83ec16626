use async_trait::async_trait;
use crate::error::Error;
use crate::models::{DynamicCommand, ScheduledMessage};

/// Registration surface of the host bot runtime.
///
/// Calls are synchronous: once `register_command` returns `Ok`, chat messages
/// can match the command.
pub trait BotRuntime: Send + Sync {
    fn register_command(&self, name: &str, command: DynamicCommand) -> Result<(), Error>;
    fn unregister_command(&self, name: &str) -> Result<(), Error>;

    fn schedule_job(&self, name: &str, interval_minutes: u64, action: ScheduledMessage) -> Result<(), Error>;

    /// Returns `Error::NotFound` for a job the runtime does not know about.
    fn remove_scheduled_job(&self, name: &str) -> Result<(), Error>;
}

/// Where the bot's outgoing chat lines end up.
#[async_trait]
pub trait ChatSink: Send + Sync {
    async fn send_message(&self, channel: &str, text: &str) -> Result<(), Error>;
}
