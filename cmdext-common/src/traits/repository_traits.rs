use async_trait::async_trait;
use crate::error::Error;
use crate::models::{CustomCommand, NewCustomCommand, ScheduledTask, NewScheduledTask};

#[async_trait]
pub trait CustomCommandRepository: Send + Sync {
    async fn list_enabled_commands(&self) -> Result<Vec<CustomCommand>, Error>;
    async fn list_all_commands(&self) -> Result<Vec<CustomCommand>, Error>;

    /// Returns the id the store assigned. Fails with `Error::Constraint` on a duplicate name.
    async fn insert_command(&self, cmd: &NewCustomCommand) -> Result<i64, Error>;

    /// Deleting an id that does not exist is not an error.
    async fn delete_command(&self, id: i64) -> Result<(), Error>;
}

#[async_trait]
pub trait ScheduledTaskRepository: Send + Sync {
    async fn list_enabled_tasks(&self) -> Result<Vec<ScheduledTask>, Error>;
    async fn list_all_tasks(&self) -> Result<Vec<ScheduledTask>, Error>;

    /// Returns the id the store assigned. Fails with `Error::Constraint` on a duplicate name.
    async fn insert_task(&self, task: &NewScheduledTask) -> Result<i64, Error>;

    /// Deleting an id that does not exist is not an error.
    async fn delete_task(&self, id: i64) -> Result<(), Error>;
}
