//! Unified path management for MentorLink files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/mentorlink/          # Config directory
//! └── config.toml                # Application configuration
//!
//! ~/.local/share/mentorlink/     # Data directory (or [storage] data_dir)
//! ├── users.toml
//! ├── bookings.toml
//! ├── ratings.toml
//! ├── history.toml
//! └── conversations.toml         # threads with their messages
//! ```

use mentorlink_core::error::{MentorError, Result};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "mentorlink";

/// One persisted collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Users,
    Bookings,
    Ratings,
    History,
    Conversations,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Users,
        Collection::Bookings,
        Collection::Ratings,
        Collection::History,
        Collection::Conversations,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Collection::Users => "users.toml",
            Collection::Bookings => "bookings.toml",
            Collection::Ratings => "ratings.toml",
            Collection::History => "history.toml",
            Collection::Conversations => "conversations.toml",
        }
    }
}

/// Resolves config and data locations.
///
/// With a base directory (tests, `--data-dir`) everything lives under it;
/// otherwise the platform directories from `dirs` are used.
#[derive(Debug, Clone, Default)]
pub struct MentorPaths {
    base_dir: Option<PathBuf>,
    data_dir_override: Option<PathBuf>,
}

impl MentorPaths {
    pub fn new(base_dir: Option<&Path>) -> Self {
        Self {
            base_dir: base_dir.map(Path::to_path_buf),
            data_dir_override: None,
        }
    }

    /// Uses `data_dir` for collections regardless of the base directory.
    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        self.data_dir_override = data_dir;
        self
    }

    pub fn config_dir(&self) -> Result<PathBuf> {
        if let Some(base) = &self.base_dir {
            return Ok(base.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| MentorError::config("Cannot determine the config directory"))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir_override {
            return Ok(dir.clone());
        }
        if let Some(base) = &self.base_dir {
            return Ok(base.join("data"));
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| MentorError::config("Cannot determine the data directory"))
    }

    pub fn config_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    pub fn collection_file(&self, collection: Collection) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(collection.file_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_dir_contains_everything() {
        let paths = MentorPaths::new(Some(Path::new("/tmp/mentorlink-test")));

        assert_eq!(
            paths.config_file().unwrap(),
            PathBuf::from("/tmp/mentorlink-test/config.toml")
        );
        assert_eq!(
            paths.collection_file(Collection::Bookings).unwrap(),
            PathBuf::from("/tmp/mentorlink-test/data/bookings.toml")
        );
    }

    #[test]
    fn test_data_dir_override_wins() {
        let paths = MentorPaths::new(Some(Path::new("/tmp/base")))
            .with_data_dir(Some(PathBuf::from("/srv/mentorlink")));

        assert_eq!(
            paths.collection_file(Collection::History).unwrap(),
            PathBuf::from("/srv/mentorlink/history.toml")
        );
        assert_eq!(paths.config_dir().unwrap(), PathBuf::from("/tmp/base"));
    }

    #[test]
    fn test_collection_file_names_are_distinct() {
        let mut names: Vec<_> = Collection::ALL.iter().map(|c| c.file_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Collection::ALL.len());
    }
}
