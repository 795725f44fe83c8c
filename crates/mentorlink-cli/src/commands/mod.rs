//! Subcommand handlers.

pub mod booking;
pub mod chat;
pub mod directory;
pub mod profile;
pub mod rating;

use anyhow::{Context, Result};
use mentorlink_application::AppServices;
use serde::Serialize;

/// What every handler runs against.
pub struct CliContext {
    pub services: AppServices,
    /// Acting user id.
    pub user: String,
    pub json: bool,
}

impl CliContext {
    /// Prints `value` as JSON in `--json` mode, otherwise hands it to `human`.
    pub fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            let encoded = serde_json::to_string_pretty(value).context("Failed to encode output")?;
            println!("{encoded}");
        } else {
            human(value);
        }
        Ok(())
    }

    /// Display name of a user, falling back to the id.
    pub async fn display_name(&self, user_id: &str) -> String {
        match self.services.profiles.get_user(user_id).await {
            Ok(user) => user.full_name,
            Err(_) => user_id.to_string(),
        }
    }
}

fn stars(score: u8) -> String {
    "★".repeat(score as usize) + &"☆".repeat(5usize.saturating_sub(score as usize))
}
