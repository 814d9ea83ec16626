use std::fmt;
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

/// Minimum chat role a user must hold to trigger a command.
///
/// Variants are declared lowest to highest so the derived `Ord` doubles as the
/// permission ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    #[default]
    Everyone,
    Subscriber,
    #[serde(rename = "VIP")]
    Vip,
    Moderator,
    Broadcaster,
}

impl Role {
    /// Case-insensitive parse. Anything unrecognized (including blank input) is `Everyone`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "broadcaster" => Role::Broadcaster,
            "moderator" => Role::Moderator,
            "vip" => Role::Vip,
            "subscriber" => Role::Subscriber,
            _ => Role::Everyone,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Everyone => "Everyone",
            Role::Subscriber => "Subscriber",
            Role::Vip => "VIP",
            Role::Moderator => "Moderator",
            Role::Broadcaster => "Broadcaster",
        }
    }

    /// True when someone holding `self` may use something gated at `required`.
    pub fn satisfies(&self, required: Role) -> bool {
        *self >= required
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A custom chat command (e.g. `!hello`) as stored in the `CustomCommands` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomCommand {
    pub id: i64,
    pub command_name: String,
    pub response: String,
    pub required_role: String,
    pub user_cooldown_seconds: i64,
    pub global_cooldown_seconds: i64,
    pub is_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CustomCommand {
    /// The handler configuration the host runtime should register for this row.
    pub fn to_dynamic(&self) -> DynamicCommand {
        DynamicCommand {
            response: self.response.clone(),
            required_role: Role::parse(&self.required_role),
            user_cooldown_seconds: self.user_cooldown_seconds.max(0) as u64,
            global_cooldown_seconds: self.global_cooldown_seconds.max(0) as u64,
        }
    }
}

/// Validated fields for inserting a new command. The store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCustomCommand {
    pub command_name: String,
    pub response: String,
    pub required_role: Role,
    pub user_cooldown_seconds: i64,
    pub global_cooldown_seconds: i64,
    pub is_enabled: bool,
}

pub const DEFAULT_USER_COOLDOWN_SECONDS: i64 = 5;
pub const DEFAULT_GLOBAL_COOLDOWN_SECONDS: i64 = 0;

/// What the host runtime runs when a registered command matches.
///
/// There is only one behavior (reply with a fixed text), so this is a plain
/// value rather than a trait object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicCommand {
    pub response: String,
    pub required_role: Role,
    pub user_cooldown_seconds: u64,
    pub global_cooldown_seconds: u64,
}

impl DynamicCommand {
    pub fn execute(&self, channel: &str) -> OutgoingMessage {
        OutgoingMessage {
            channel: channel.to_string(),
            text: self.response.clone(),
        }
    }
}

/// A single line the bot wants to say in a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub channel: String,
    pub text: String,
}
