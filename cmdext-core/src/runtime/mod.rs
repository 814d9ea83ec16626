//! cmdext-core/src/runtime/mod.rs
//!
//! An in-process host runtime: a command table matched against chat lines,
//! plus interval jobs that broadcast into one channel.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use cmdext_common::models::{DynamicCommand, Role, ScheduledMessage};
use cmdext_common::traits::{BotRuntime, ChatSink};
use crate::Error;

/// One registered command, keyed in the table by its lowercased name.
#[derive(Debug, Clone)]
struct RegisteredCommand {
    name: String,
    command: DynamicCommand,
}

/// Last-use timestamps for per-user and global cooldowns.
#[derive(Debug, Default)]
pub struct CooldownTracker {
    last_global_use: HashMap<String, Instant>,
    last_user_use: HashMap<(String, String), Instant>,
}

impl CooldownTracker {
    /// Returns false while `key` is cooling down for `user` (or globally);
    /// otherwise records the use and returns true.
    pub fn try_use(&mut self, key: &str, user: &str, cmd: &DynamicCommand, now: Instant) -> bool {
        if let Some(last) = self.last_global_use.get(key) {
            if now.duration_since(*last) < Duration::from_secs(cmd.global_cooldown_seconds) {
                return false;
            }
        }
        let user_key = (key.to_string(), user.to_lowercase());
        if let Some(last) = self.last_user_use.get(&user_key) {
            if now.duration_since(*last) < Duration::from_secs(cmd.user_cooldown_seconds) {
                return false;
            }
        }
        self.last_global_use.insert(key.to_string(), now);
        self.last_user_use.insert(user_key, now);
        true
    }

    fn forget(&mut self, key: &str) {
        self.last_global_use.remove(key);
        self.last_user_use.retain(|(k, _), _| k != key);
    }
}

pub struct LocalBotRuntime {
    channel: String,
    sink: Arc<dyn ChatSink>,
    commands: DashMap<String, RegisteredCommand>,
    jobs: DashMap<String, JoinHandle<()>>,
    cooldowns: Mutex<CooldownTracker>,
    /// Length of one "minute" for job periods. Real time unless a test shrinks it.
    time_unit: Duration,
}

impl LocalBotRuntime {
    /// `channel` is where scheduled broadcasts go.
    pub fn new(channel: impl Into<String>, sink: Arc<dyn ChatSink>) -> Self {
        Self {
            channel: channel.into(),
            sink,
            commands: DashMap::new(),
            jobs: DashMap::new(),
            cooldowns: Mutex::new(CooldownTracker::default()),
            time_unit: Duration::from_secs(60),
        }
    }

    pub fn with_time_unit(mut self, unit: Duration) -> Self {
        self.time_unit = unit;
        self
    }

    /// Names of currently registered commands, as they were registered.
    pub fn registered_commands(&self) -> Vec<String> {
        self.commands.iter().map(|e| e.value().name.clone()).collect()
    }

    pub fn scheduled_jobs(&self) -> Vec<String> {
        self.jobs.iter().map(|e| e.key().clone()).collect()
    }

    /// Match a chat line against the command table.
    ///
    /// Returns the text the bot said, or `None` when the line is not a command,
    /// the user lacks the role, or a cooldown is active.
    pub async fn handle_chat_message(
        &self,
        channel: &str,
        user: &str,
        role: Role,
        text: &str,
    ) -> Result<Option<String>, Error> {
        let trimmed = text.trim();
        if !trimmed.starts_with('!') {
            return Ok(None);
        }
        let cmd_part = match trimmed.split_whitespace().next() {
            Some(first) => first.trim_start_matches('!').to_lowercase(),
            None => return Ok(None),
        };
        if cmd_part.is_empty() {
            return Ok(None);
        }

        let found = self.commands.get(&cmd_part).map(|e| e.value().clone());
        let registered = match found {
            Some(r) => r,
            None => {
                debug!("No command found matching '{}'", cmd_part);
                return Ok(None);
            }
        };

        if !role.satisfies(registered.command.required_role) {
            debug!(
                "User '{}' ({}) lacks role {} for !{}",
                user, role, registered.command.required_role, registered.name
            );
            return Ok(None);
        }

        if !self.cooldowns.lock().try_use(&cmd_part, user, &registered.command, Instant::now()) {
            debug!("!{} is on cooldown for '{}'", registered.name, user);
            return Ok(None);
        }

        let out = registered.command.execute(channel);
        self.sink.send_message(&out.channel, &out.text).await?;
        Ok(Some(out.text))
    }

    /// Abort every scheduled job.
    pub fn shutdown(&self) {
        let names = self.scheduled_jobs();
        for name in names {
            if let Some((_, handle)) = self.jobs.remove(&name) {
                handle.abort();
            }
        }
    }
}

impl Drop for LocalBotRuntime {
    fn drop(&mut self) {
        for entry in self.jobs.iter() {
            entry.value().abort();
        }
    }
}

impl BotRuntime for LocalBotRuntime {
    fn register_command(&self, name: &str, command: DynamicCommand) -> Result<(), Error> {
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(Error::Registration(format!("invalid command name '{}'", name)));
        }
        match self.commands.entry(name.to_lowercase()) {
            Entry::Occupied(_) => Err(Error::Registration(format!("command '{}' is already registered", name))),
            Entry::Vacant(slot) => {
                slot.insert(RegisteredCommand { name: name.to_string(), command });
                Ok(())
            }
        }
    }

    fn unregister_command(&self, name: &str) -> Result<(), Error> {
        let key = name.to_lowercase();
        match self.commands.remove(&key) {
            Some(_) => {
                self.cooldowns.lock().forget(&key);
                Ok(())
            }
            None => Err(Error::NotFound(format!("command '{}'", name))),
        }
    }

    fn schedule_job(&self, name: &str, interval_minutes: u64, action: ScheduledMessage) -> Result<(), Error> {
        if interval_minutes == 0 {
            return Err(Error::Registration(format!("job '{}' needs a positive interval", name)));
        }
        let rt = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::Registration(format!("no async runtime for job '{}': {}", name, e)))?;

        match self.jobs.entry(name.to_string()) {
            Entry::Occupied(_) => Err(Error::Registration(format!("job '{}' is already scheduled", name))),
            Entry::Vacant(slot) => {
                let minutes = u32::try_from(interval_minutes).unwrap_or(u32::MAX);
                let period = self.time_unit.saturating_mul(minutes);
                if period.is_zero() {
                    return Err(Error::Registration(format!("job '{}' has a zero period", name)));
                }
                let channel = self.channel.clone();
                let sink = self.sink.clone();
                let job_name = name.to_string();

                let handle = rt.spawn(async move {
                    let start = tokio::time::Instant::now() + period;
                    let mut ticker = tokio::time::interval_at(start, period);
                    loop {
                        ticker.tick().await;
                        let out = action.execute(&channel);
                        if let Err(e) = sink.send_message(&out.channel, &out.text).await {
                            warn!("Scheduled job '{}' failed to send: {}", job_name, e);
                        }
                    }
                });
                slot.insert(handle);
                info!("Scheduled job '{}' every {} minute(s)", name, interval_minutes);
                Ok(())
            }
        }
    }

    fn remove_scheduled_job(&self, name: &str) -> Result<(), Error> {
        match self.jobs.remove(name) {
            Some((_, handle)) => {
                handle.abort();
                Ok(())
            }
            None => Err(Error::NotFound(format!("job '{}'", name))),
        }
    }
}
