//! Atomic TOML documents.
//!
//! Every collection is one TOML file that is read whole and written whole.
//! Writes go to a sibling temp file which is fsynced and renamed over the
//! original, so a reader never observes a half-written document.

use mentorlink_core::error::{MentorError, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// A handle to one TOML document on disk.
///
/// Provides:
/// - **Atomicity**: updates are all-or-nothing via tmp file + rename
/// - **Isolation**: `update` holds an exclusive `fs2` lock across read-modify-write
/// - **Durability**: explicit fsync before rename
pub struct AtomicTomlFile<T> {
    path: PathBuf,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Clone for AtomicTomlFile<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for AtomicTomlFile<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtomicTomlFile").field("path", &self.path).finish()
    }
}

impl<T> AtomicTomlFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and deserializes the document.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Successfully loaded and deserialized
    /// - `Ok(None)`: File doesn't exist or is blank
    /// - `Err`: Failed to read or parse the file
    pub fn load(&self) -> Result<Option<T>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        let data: T = toml::from_str(&content).map_err(|e| MentorError::Serialization {
            format: "TOML".to_string(),
            message: format!("{}: {}", self.path.display(), e),
        })?;
        Ok(Some(data))
    }

    /// Writes `data`, replacing the whole document.
    pub fn save(&self, data: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let toml_string = toml::to_string_pretty(data)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(toml_string.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Read-modify-write under an exclusive lock.
    ///
    /// The document (or `default_value` if absent) is passed to `f`. The
    /// result is written back only if `f` succeeds; an error from `f`
    /// leaves the file untouched and is returned as-is.
    pub fn update<R, F>(&self, default_value: T, f: F) -> Result<R>
    where
        F: FnOnce(&mut T) -> Result<R>,
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut data = self.load()?.unwrap_or(default_value);
        let result = f(&mut data)?;
        self.save(&data)?;

        Ok(result)
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| MentorError::io(format!("{} has no parent directory", self.path.display())))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| MentorError::io(format!("{} has no file name", self.path.display())))?;

        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

/// Exclusive advisory lock on `<document>.lock`, released on drop.
///
/// The lock file itself is left in place: unlinking it while another
/// process waits on it would let a third process lock a fresh inode.
struct FileLock {
    file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        fs2::FileExt::lock_exclusive(&file)
            .map_err(|e| MentorError::io(format!("Failed to lock {}: {}", lock_path.display(), e)))?;

        Ok(FileLock { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
    struct Counter {
        name: String,
        count: u32,
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicTomlFile::<Counter>::new(temp_dir.path().join("counter.toml"));

        file.save(&Counter {
            name: "visits".to_string(),
            count: 42,
        })
        .unwrap();

        let loaded = file.load().unwrap().unwrap();
        assert_eq!(loaded.name, "visits");
        assert_eq!(loaded.count, 42);
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicTomlFile::<Counter>::new(temp_dir.path().join("missing.toml"));

        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_update_creates_from_default_and_returns_value() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicTomlFile::<Counter>::new(temp_dir.path().join("nested/counter.toml"));

        let after = file
            .update(Counter::default(), |c| {
                c.count += 10;
                Ok(c.count)
            })
            .unwrap();

        assert_eq!(after, 10);
        assert_eq!(file.load().unwrap().unwrap().count, 10);
    }

    #[test]
    fn test_failed_update_leaves_document_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicTomlFile::<Counter>::new(temp_dir.path().join("counter.toml"));
        file.save(&Counter {
            name: "visits".to_string(),
            count: 1,
        })
        .unwrap();

        let result: Result<()> = file.update(Counter::default(), |c| {
            c.count = 99;
            Err(MentorError::validation("rejected"))
        });

        assert!(result.unwrap_err().is_validation());
        assert_eq!(file.load().unwrap().unwrap().count, 1);
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("counter.toml");
        let file = AtomicTomlFile::<Counter>::new(path.clone());

        file.save(&Counter::default()).unwrap();

        assert!(!temp_dir.path().join(".counter.toml.tmp").exists());
        assert!(path.exists());
    }

    #[test]
    fn test_corrupt_document_reports_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("counter.toml");
        fs::write(&path, "count = \"not a number\"").unwrap();

        let err = AtomicTomlFile::<Counter>::new(path).load().unwrap_err();
        assert!(matches!(err, MentorError::Serialization { .. }));
    }
}
