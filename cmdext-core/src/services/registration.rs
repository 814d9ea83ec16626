// cmdext-core/src/services/registration.rs

use std::collections::HashSet;
use std::sync::Arc;
use parking_lot::Mutex;
use tracing::{debug, warn};
use cmdext_common::models::{CustomCommand, ScheduledTask};
use cmdext_common::traits::BotRuntime;
use crate::Error;

/// Outcome of one drain-and-rebuild pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub registered: usize,
    pub skipped: usize,
}

/// Mirrors store rows into the host runtime and remembers what it registered
/// so the next sync can retract exactly that.
///
/// The tracked sets are derived state. They are only ever replaced wholesale:
/// drain everything, then register the new batch.
pub struct RegistrationBridge {
    runtime: Arc<dyn BotRuntime>,
    live_commands: Mutex<HashSet<String>>,
    live_tasks: Mutex<HashSet<String>>,
}

impl RegistrationBridge {
    pub fn new(runtime: Arc<dyn BotRuntime>) -> Self {
        Self {
            runtime,
            live_commands: Mutex::new(HashSet::new()),
            live_tasks: Mutex::new(HashSet::new()),
        }
    }

    /// Unregister every tracked command, then register one handler per row.
    ///
    /// A row the runtime refuses is logged and skipped; the rest still go live.
    pub fn sync_commands(&self, rows: &[CustomCommand]) -> SyncReport {
        let mut live = self.live_commands.lock();
        self.unregister_commands(&mut live);

        let mut report = SyncReport::default();
        for row in rows {
            match self.runtime.register_command(&row.command_name, row.to_dynamic()) {
                Ok(()) => {
                    live.insert(row.command_name.clone());
                    report.registered += 1;
                }
                Err(e) => {
                    warn!("Skipping command '{}' (id={}): {}", row.command_name, row.id, e);
                    report.skipped += 1;
                }
            }
        }
        report
    }

    /// Same drain-and-rebuild for timer jobs, keyed by task name.
    pub fn sync_tasks(&self, rows: &[ScheduledTask]) -> SyncReport {
        let mut live = self.live_tasks.lock();
        self.remove_jobs(&mut live);

        let mut report = SyncReport::default();
        for row in rows {
            let registered = u64::try_from(row.interval_minutes)
                .map_err(|_| Error::Registration(format!("interval {} is not positive", row.interval_minutes)))
                .and_then(|minutes| {
                    self.runtime.schedule_job(&row.task_name, minutes, row.to_scheduled_message())
                });
            match registered {
                Ok(()) => {
                    live.insert(row.task_name.clone());
                    report.registered += 1;
                }
                Err(e) => {
                    warn!("Skipping scheduled task '{}' (id={}): {}", row.task_name, row.id, e);
                    report.skipped += 1;
                }
            }
        }
        report
    }

    /// Remove every tracked timer job. Returns how many were tracked.
    pub fn drain_tasks(&self) -> usize {
        let mut live = self.live_tasks.lock();
        self.remove_jobs(&mut live)
    }

    /// Unregister every tracked command. Returns how many were tracked.
    pub fn drain_commands(&self) -> usize {
        let mut live = self.live_commands.lock();
        self.unregister_commands(&mut live)
    }

    fn unregister_commands(&self, live: &mut HashSet<String>) -> usize {
        let count = live.len();
        for name in live.drain() {
            if let Err(e) = self.runtime.unregister_command(&name) {
                debug!("unregister_command('{}') => {}", name, e);
            }
        }
        count
    }

    fn remove_jobs(&self, live: &mut HashSet<String>) -> usize {
        let count = live.len();
        for name in live.drain() {
            // The runtime may already have dropped the job; that is expected during reloads.
            let _ = self.runtime.remove_scheduled_job(&name);
        }
        count
    }

    pub fn live_command_names(&self) -> HashSet<String> {
        self.live_commands.lock().clone()
    }

    pub fn live_task_names(&self) -> HashSet<String> {
        self.live_tasks.lock().clone()
    }
}
