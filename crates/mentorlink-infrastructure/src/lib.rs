pub mod config_service;
pub mod memory_repository;
pub mod paths;
pub mod seed;
pub mod storage;
pub mod storage_repository;
pub mod toml_booking_repository;
pub mod toml_conversation_repository;
pub mod toml_rating_repository;
pub mod toml_user_repository;

pub use crate::config_service::ConfigService;
pub use crate::memory_repository::{
    InMemoryBookingRepository, InMemoryConversationRepository, InMemoryHistoryRepository,
    InMemoryRatingRepository, InMemoryUserRepository,
};
pub use crate::paths::{Collection, MentorPaths};
pub use crate::storage_repository::StorageRepository;
pub use crate::toml_booking_repository::TomlBookingRepository;
pub use crate::toml_conversation_repository::{ConversationThread, TomlConversationRepository};
pub use crate::toml_rating_repository::{TomlHistoryRepository, TomlRatingRepository};
pub use crate::toml_user_repository::TomlUserRepository;
