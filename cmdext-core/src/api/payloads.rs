// cmdext-core/src/api/payloads.rs
//
// Request bodies for the management API. Every body goes through
// `decode_json` and then a `TryFrom` into the store's `New*` type, so
// handlers only ever see validated values.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use cmdext_common::models::{
    NewCustomCommand, NewScheduledTask, Role,
    DEFAULT_GLOBAL_COOLDOWN_SECONDS, DEFAULT_USER_COOLDOWN_SECONDS,
};
use crate::Error;

/// An integer the browser may send as `5` or `"5"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IntField {
    Number(i64),
    Text(String),
}

impl IntField {
    fn resolve(&self, field: &str) -> Result<i64, Error> {
        match self {
            IntField::Number(n) => Ok(*n),
            IntField::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| Error::Validation(format!("{field} must be an integer, got '{s}'"))),
        }
    }
}

/// A boolean sent as `true` or `"true"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BoolField {
    Flag(bool),
    Text(String),
}

impl BoolField {
    fn resolve(&self, field: &str) -> Result<bool, Error> {
        match self {
            BoolField::Flag(b) => Ok(*b),
            BoolField::Text(s) => match s.trim().to_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(Error::Validation(format!("{field} must be true or false, got '{s}'"))),
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommandRequest {
    #[serde(default)]
    pub command_name: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub required_role: Option<String>,
    #[serde(default)]
    pub user_cooldown: Option<IntField>,
    #[serde(default)]
    pub global_cooldown: Option<IntField>,
    #[serde(default)]
    pub is_enabled: Option<BoolField>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub task_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub interval_minutes: Option<IntField>,
    #[serde(default)]
    pub is_enabled: Option<BoolField>,
}

/// Decode a JSON body, reporting the path of the first offending field.
pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    let de = &mut serde_json::Deserializer::from_slice(body);
    serde_path_to_error::deserialize(de).map_err(|e| {
        let path = e.path().to_string();
        if path == "." {
            Error::Validation(format!("invalid request body: {}", e.inner()))
        } else {
            Error::Validation(format!("invalid value for '{}': {}", path, e.inner()))
        }
    })
}

/// Path ids must be plain integers.
pub fn parse_id(raw: &str) -> Result<i64, Error> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| Error::Validation(format!("invalid id '{raw}'")))
}

fn required_text(value: Option<String>, field: &str) -> Result<String, Error> {
    match value {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(Error::Validation(format!("{field} is required"))),
    }
}

fn optional_int(value: Option<&IntField>, field: &str, default: i64) -> Result<i64, Error> {
    match value {
        Some(v) => v.resolve(field),
        None => Ok(default),
    }
}

impl TryFrom<CreateCommandRequest> for NewCustomCommand {
    type Error = Error;

    fn try_from(req: CreateCommandRequest) -> Result<Self, Self::Error> {
        let command_name = required_text(req.command_name, "commandName")?.trim().to_string();
        let response = required_text(req.response, "response")?;

        let user_cooldown_seconds =
            optional_int(req.user_cooldown.as_ref(), "userCooldown", DEFAULT_USER_COOLDOWN_SECONDS)?;
        let global_cooldown_seconds =
            optional_int(req.global_cooldown.as_ref(), "globalCooldown", DEFAULT_GLOBAL_COOLDOWN_SECONDS)?;
        if user_cooldown_seconds < 0 || global_cooldown_seconds < 0 {
            return Err(Error::Validation("cooldowns cannot be negative".into()));
        }

        let is_enabled = match req.is_enabled {
            Some(v) => v.resolve("isEnabled")?,
            None => true,
        };

        Ok(NewCustomCommand {
            command_name,
            response,
            required_role: req.required_role.as_deref().map(Role::parse).unwrap_or_default(),
            user_cooldown_seconds,
            global_cooldown_seconds,
            is_enabled,
        })
    }
}

impl TryFrom<CreateTaskRequest> for NewScheduledTask {
    type Error = Error;

    fn try_from(req: CreateTaskRequest) -> Result<Self, Self::Error> {
        let task_name = required_text(req.task_name, "taskName")?.trim().to_string();
        let message = required_text(req.message, "message")?;
        let interval_minutes = match req.interval_minutes {
            Some(v) => v.resolve("intervalMinutes")?,
            None => return Err(Error::Validation("intervalMinutes is required".into())),
        };
        if interval_minutes <= 0 {
            return Err(Error::Validation("intervalMinutes must be positive".into()));
        }
        let is_enabled = match req.is_enabled {
            Some(v) => v.resolve("isEnabled")?,
            None => true,
        };

        Ok(NewScheduledTask { task_name, message, interval_minutes, is_enabled })
    }
}
