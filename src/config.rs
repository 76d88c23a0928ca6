use crate::modem::bearer::Carrier;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Per-step reply timeouts in milliseconds, sized after measured device
/// latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub default_ms: u32,
    pub pin_query_ms: u32,
    pub attach_ms: u32,
    pub bearer_param_ms: u32,
    pub bearer_switch_ms: u32,
    pub http_action_ms: u32,
    pub http_read_ms: u32,
    pub json_upload_ms: u32,
    /// Upload window announced to the modem in `AT+HTTPDATA`.
    pub http_upload_window_ms: u32,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            default_ms: 500,
            pin_query_ms: 5000,
            attach_ms: 20_000,
            bearer_param_ms: 10_000,
            bearer_switch_ms: 30_000,
            http_action_ms: 30_000,
            http_read_ms: 5000,
            json_upload_ms: 16_000,
            http_upload_window_ms: 8000,
        }
    }
}

/// Registration polling: `rounds` rounds of `round_s` seconds, one
/// `AT+CREG?` every `poll_interval_s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationPolicy {
    pub rounds: u8,
    pub round_s: u8,
    pub poll_interval_s: u8,
}

impl Default for RegistrationPolicy {
    fn default() -> Self {
        Self {
            rounds: 2,
            round_s: 30,
            poll_interval_s: 15,
        }
    }
}

impl RegistrationPolicy {
    pub fn polls_per_round(self) -> u8 {
        if self.poll_interval_s == 0 {
            return 1;
        }
        self.round_s.div_ceil(self.poll_interval_s).max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub root: String,
    pub web_service: String,
    pub user_agent: String,
    pub user_data: String,
    pub content_type: String,
    pub max_attempts: u8,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            root: String::new(),
            web_service: String::new(),
            user_agent: "sim868".to_string(),
            user_data: String::new(),
            content_type: "application/json".to_string(),
            max_attempts: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ModemConfig {
    pub carrier: Carrier,
    pub timeouts: Timeouts,
    pub registration: RegistrationPolicy,
    pub http: HttpConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ModemConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
