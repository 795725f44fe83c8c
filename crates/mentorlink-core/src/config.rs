//! Application configuration model.
//!
//! Loaded from `config.toml` by the infrastructure layer. Every section has
//! defaults so a missing or partial file is always usable.

use crate::error::{MentorError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub booking: BookingSettings,
    #[serde(default)]
    pub auto_reply: AutoReplySettings,
    /// Default tracing filter when neither `RUST_LOG` nor `--verbose` is given.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageSettings::default(),
            booking: BookingSettings::default(),
            auto_reply: AutoReplySettings::default(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Rejects settings that would make the services misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.booking.session_minutes == 0 {
            return Err(MentorError::config("booking.session_minutes must be positive"));
        }
        if self.auto_reply.min_delay_ms > self.auto_reply.max_delay_ms {
            return Err(MentorError::config(format!(
                "auto_reply.min_delay_ms ({}) exceeds max_delay_ms ({})",
                self.auto_reply.min_delay_ms, self.auto_reply.max_delay_ms
            )));
        }
        Ok(())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct StorageSettings {
    /// Directory holding the collection documents. Falls back to the
    /// platform data directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct BookingSettings {
    /// Length of one coaching slot, used for overlap detection.
    #[serde(default = "default_session_minutes")]
    pub session_minutes: u32,
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            session_minutes: default_session_minutes(),
        }
    }
}

/// Simulated reply posted by the other participant after a user message.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AutoReplySettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "default_reply_text")]
    pub text: String,
}

impl Default for AutoReplySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            text: default_reply_text(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_session_minutes() -> u32 {
    60
}

fn default_true() -> bool {
    true
}

fn default_min_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    2000
}

fn default_reply_text() -> String {
    "Thanks for your message. I'll reply soon.".to_string()
}
