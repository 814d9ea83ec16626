// cmdext-core/src/repositories/sqlite/mod.rs

pub mod custom_commands;
pub mod scheduled_tasks;
