//! Repository trait re-exports.
//!
//! This module provides centralized access to all repository traits.

pub use crate::booking::BookingRepository;
pub use crate::catalog::CatalogProvider;
pub use crate::conversation::ConversationRepository;
pub use crate::rating::{HistoryRepository, RatingRepository};
pub use crate::user::UserRepository;
