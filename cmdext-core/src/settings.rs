// cmdext-core/src/settings.rs

use std::path::Path;
use serde_json::Value;
use tracing::{info, warn};
use crate::Error;

pub const DEFAULT_WEB_SERVER_PORT: u16 = 5000;

/// Runtime settings read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub web_server_port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self { web_server_port: DEFAULT_WEB_SERVER_PORT }
    }
}

impl Settings {
    /// Load `{"Settings": {"WebServerPort": N}}` from `path`.
    ///
    /// Never fails: anything unreadable or out of range logs a warning and
    /// falls back to the default port.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(settings) => {
                info!("Using web server port {} from {}", settings.web_server_port, path.display());
                settings
            }
            Err(e) => {
                warn!(
                    "Could not read settings from {} ({}); using default port {}",
                    path.display(), e, DEFAULT_WEB_SERVER_PORT
                );
                Self::default()
            }
        }
    }

    fn try_load(path: &Path) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)?;
        let doc: Value = serde_json::from_str(&raw)?;
        let port = doc
            .pointer("/Settings/WebServerPort")
            .ok_or_else(|| Error::Config("Settings.WebServerPort is missing".into()))?;
        Ok(Self { web_server_port: parse_port(port)? })
    }
}

fn parse_port(value: &Value) -> Result<u16, Error> {
    let n = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    match n.and_then(|n| u16::try_from(n).ok()) {
        Some(port) if port != 0 => Ok(port),
        _ => Err(Error::Config(format!("invalid WebServerPort: {}", value))),
    }
}
