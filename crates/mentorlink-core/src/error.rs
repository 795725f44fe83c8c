//! Error types for the MentorLink application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire MentorLink application.
///
/// The first four variants form the domain taxonomy surfaced to the display
/// layer. The remaining variants cover storage and configuration failures.
/// None of them are retried automatically.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum MentorError {
    /// Bad input shape or range (score outside 1..=5, empty message, unknown slot)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Operation not legal in the entity's current state
    #[error("Invalid state for {entity_type} '{id}': {message}")]
    InvalidState {
        entity_type: &'static str,
        id: String,
        message: String,
    },

    /// A terminal operation (rate / skip) was already applied
    #[error("Booking '{booking_id}' has already been resolved")]
    AlreadyResolved { booking_id: String },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Data access error (repository/storage layer)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MentorError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an InvalidState error
    pub fn invalid_state(
        entity_type: &'static str,
        id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidState {
            entity_type,
            id: id.into(),
            message: message.into(),
        }
    }

    /// Creates an AlreadyResolved error
    pub fn already_resolved(booking_id: impl Into<String>) -> Self {
        Self::AlreadyResolved {
            booking_id: booking_id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }

    pub fn is_already_resolved(&self) -> bool {
        matches!(self, Self::AlreadyResolved { .. })
    }

    /// Check if this is an IO error
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns true for errors caused by the caller's request rather than
    /// by storage or configuration.
    pub fn is_user_facing(&self) -> bool {
        self.is_validation()
            || self.is_not_found()
            || self.is_invalid_state()
            || self.is_already_resolved()
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for MentorError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for MentorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for MentorError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for MentorError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, MentorError>`.
pub type Result<T> = std::result::Result<T, MentorError>;
