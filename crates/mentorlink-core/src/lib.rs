//! Domain layer for MentorLink.
//!
//! Models, repository traits and the error type shared by the
//! infrastructure and application crates. Nothing here performs I/O.

pub mod booking;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod conversation;
pub mod error;
pub mod rating;
pub mod repository;
pub mod session;
pub mod slot;
pub mod user;

// Re-export common error type
pub use error::{MentorError, Result};
