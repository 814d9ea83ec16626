// cmdext-core/src/repositories/mod.rs

pub mod sqlite;

pub use sqlite::custom_commands::SqliteCustomCommandRepository;
pub use sqlite::scheduled_tasks::SqliteScheduledTaskRepository;
