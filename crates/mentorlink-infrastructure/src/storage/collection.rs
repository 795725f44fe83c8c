//! Typed collection documents on top of [`AtomicTomlFile`].

use super::atomic_toml::AtomicTomlFile;
use mentorlink_core::error::{MentorError, Result};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};

/// Current layout version written into every collection file.
pub const DOCUMENT_VERSION: u32 = 1;

/// On-disk shape of a collection: a version tag plus the items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct CollectionDocument<T> {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

fn default_version() -> u32 {
    DOCUMENT_VERSION
}

impl<T> Default for CollectionDocument<T> {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            items: Vec::new(),
        }
    }
}

/// A collection file whose blocking I/O runs off the async runtime.
///
/// Reads default to an empty collection when the file is missing.
pub struct TomlCollection<T> {
    file: AtomicTomlFile<CollectionDocument<T>>,
}

impl<T> Clone for TomlCollection<T> {
    fn clone(&self) -> Self {
        Self {
            file: self.file.clone(),
        }
    }
}

impl<T> TomlCollection<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Returns every item in the collection.
    pub async fn read(&self) -> Result<Vec<T>> {
        let file = self.file.clone();
        let document = tokio::task::spawn_blocking(move || file.load())
            .await
            .map_err(|e| MentorError::internal(format!("Storage task failed: {}", e)))??;

        let document = document.unwrap_or_default();
        check_version(&document, self.file.path())?;
        Ok(document.items)
    }

    /// Applies `f` to the item list and writes the result back as one
    /// document. Nothing is written if `f` fails or the file has a newer
    /// layout.
    pub async fn modify<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || {
            let path = file.path().to_path_buf();
            file.update(CollectionDocument::default(), |document| {
                check_version(document, &path)?;
                document.version = DOCUMENT_VERSION;
                f(&mut document.items)
            })
        })
        .await
        .map_err(|e| MentorError::internal(format!("Storage task failed: {}", e)))?
    }
}

fn check_version<T>(document: &CollectionDocument<T>, path: &Path) -> Result<()> {
    if document.version > DOCUMENT_VERSION {
        return Err(MentorError::data_access(format!(
            "{} was written by a newer version (layout {})",
            path.display(),
            document.version
        )));
    }
    Ok(())
}
