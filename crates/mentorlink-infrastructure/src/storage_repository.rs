use std::path::Path;

use crate::paths::{Collection, MentorPaths};
use crate::storage::TomlCollection;
use mentorlink_core::error::Result;
use serde::{Serialize, de::DeserializeOwned};

/// Common trait for repositories backed by one [`TomlCollection`] file.
///
/// Implementors name their collection and item type; `open` resolves the
/// file through [`MentorPaths`].
pub trait StorageRepository: Sized {
    /// The collection file this repository owns
    const COLLECTION: Collection;

    /// The entity name used in log lines and errors
    const ENTITY_NAME: &'static str;

    /// The stored item type
    type Item: Serialize + DeserializeOwned + Send + 'static;

    fn from_collection(collection: TomlCollection<Self::Item>) -> Self;

    /// Returns a reference to the underlying collection
    fn collection(&self) -> &TomlCollection<Self::Item>;

    /// Opens the repository at the location resolved by `paths`.
    fn open(paths: &MentorPaths) -> Result<Self> {
        let path = paths.collection_file(Self::COLLECTION)?;
        tracing::debug!(entity = Self::ENTITY_NAME, path = %path.display(), "Opening collection");
        Ok(Self::from_collection(TomlCollection::new(path)))
    }

    /// Returns the collection file path
    fn file_path(&self) -> &Path {
        self.collection().path()
    }
}
