// File: cmdext-common/src/models/mod.rs
pub mod command;
pub mod task;

pub use command::{
    CustomCommand, NewCustomCommand, DynamicCommand, OutgoingMessage, Role,
    DEFAULT_USER_COOLDOWN_SECONDS, DEFAULT_GLOBAL_COOLDOWN_SECONDS,
};
pub use task::{ScheduledTask, NewScheduledTask, ScheduledMessage};
