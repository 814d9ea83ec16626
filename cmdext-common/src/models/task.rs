use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use crate::models::command::OutgoingMessage;

/// A repeating broadcast message stored in the `ScheduledTasks` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub id: i64,
    pub task_name: String,
    pub message: String,
    pub interval_minutes: i64,
    pub is_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduledTask {
    pub fn to_scheduled_message(&self) -> ScheduledMessage {
        ScheduledMessage {
            message: self.message.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewScheduledTask {
    pub task_name: String,
    pub message: String,
    pub interval_minutes: i64,
    pub is_enabled: bool,
}

/// The action fired by a timer job: say `message` verbatim in the broadcast channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledMessage {
    pub message: String,
}

impl ScheduledMessage {
    pub fn execute(&self, channel: &str) -> OutgoingMessage {
        OutgoingMessage {
            channel: channel.to_string(),
            text: self.message.clone(),
        }
    }
}
