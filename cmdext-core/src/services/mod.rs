// File: cmdext-core/src/services/mod.rs

pub mod registration;
pub mod reload;

pub use registration::{RegistrationBridge, SyncReport};
pub use reload::{ReloadController, SchedulerState};
