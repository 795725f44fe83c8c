//! Application layer for MentorLink.
//!
//! This crate provides the use cases that coordinate the domain models and
//! the repositories: booking, the live-session lifecycle, rating and
//! archival, conversations and profiles.

pub mod app_services;
pub mod booking_manager;
pub mod conversation_service;
pub mod directory_catalog;
pub mod events;
pub mod profile_service;
pub mod rating_collector;
pub mod session_lifecycle;

pub use app_services::{AppServices, Repositories};
pub use booking_manager::{BookingLock, BookingManager};
pub use conversation_service::{ConversationService, SentMessage};
pub use directory_catalog::DirectoryCatalog;
pub use events::LifecycleEvents;
pub use profile_service::ProfileService;
pub use rating_collector::RatingCollector;
pub use session_lifecycle::SessionLifecycleController;
