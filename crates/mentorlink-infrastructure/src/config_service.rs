//! Configuration service implementation.
//!
//! Loads [`AppConfig`] from `config.toml`, writing the defaults when the
//! file does not exist yet, and caches the result.

use crate::paths::MentorPaths;
use crate::storage::AtomicTomlFile;
use mentorlink_core::config::AppConfig;
use mentorlink_core::error::Result;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Configuration service that loads and caches the root configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    file: AtomicTomlFile<AppConfig>,
    config: Arc<RwLock<Option<AppConfig>>>,
}

impl ConfigService {
    /// Uses the config file resolved by `paths`.
    pub fn new(paths: &MentorPaths) -> Result<Self> {
        Ok(Self::with_file(paths.config_file()?))
    }

    /// Uses an explicit config file (e.g. `--config`).
    pub fn with_file(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        self.file.path()
    }

    /// Returns the configuration, loading it on first access.
    pub fn get_config(&self) -> Result<AppConfig> {
        {
            let cached = self.config.read().unwrap_or_else(|p| p.into_inner());
            if let Some(config) = cached.as_ref() {
                return Ok(config.clone());
            }
        }

        let loaded = self.load()?;

        let mut cached = self.config.write().unwrap_or_else(|p| p.into_inner());
        *cached = Some(loaded.clone());
        Ok(loaded)
    }

    /// Validates and persists `config`, replacing the cached copy.
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        config.validate()?;
        self.file.save(config)?;
        let mut cached = self.config.write().unwrap_or_else(|p| p.into_inner());
        *cached = Some(config.clone());
        Ok(())
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut cached = self.config.write().unwrap_or_else(|p| p.into_inner());
        *cached = None;
    }

    fn load(&self) -> Result<AppConfig> {
        let config = match self.file.load()? {
            Some(config) => config,
            None => {
                let default_config = AppConfig::default();
                self.file.save(&default_config)?;
                tracing::info!(path = %self.file.path().display(), "Wrote default configuration");
                default_config
            }
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_is_created_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(&MentorPaths::new(Some(temp_dir.path()))).unwrap();

        let config = service.get_config().unwrap();

        assert_eq!(config, AppConfig::default());
        assert!(temp_dir.path().join("config.toml").exists());
    }

    #[test]
    fn test_existing_config_is_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "log_level = \"debug\"\n[auto_reply]\nenabled = false\n").unwrap();

        let config = ConfigService::with_file(path).get_config().unwrap();

        assert_eq!(config.log_level, "debug");
        assert!(!config.auto_reply.enabled);
        assert_eq!(config.booking.session_minutes, 60);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[booking]\nsession_minutes = 0\n").unwrap();

        assert!(ConfigService::with_file(path).get_config().is_err());
    }

    #[test]
    fn test_cache_survives_file_changes_until_invalidated() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let service = ConfigService::with_file(path.clone());
        assert_eq!(service.get_config().unwrap().log_level, "info");

        std::fs::write(&path, "log_level = \"warn\"\n").unwrap();
        assert_eq!(service.get_config().unwrap().log_level, "info");

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().log_level, "warn");
    }
}
