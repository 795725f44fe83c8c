//! Storage layer for atomic file operations.

mod atomic_toml;
mod collection;

pub use atomic_toml::AtomicTomlFile;
pub use collection::{CollectionDocument, DOCUMENT_VERSION, TomlCollection};
