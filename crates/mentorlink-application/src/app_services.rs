//! Service wiring.
//!
//! Builds every application service over one set of repositories, sharing
//! the clock, the lifecycle event bus and the booking lock.

use crate::booking_manager::{BookingLock, BookingManager};
use crate::conversation_service::ConversationService;
use crate::directory_catalog::DirectoryCatalog;
use crate::events::LifecycleEvents;
use crate::profile_service::ProfileService;
use crate::rating_collector::RatingCollector;
use crate::session_lifecycle::SessionLifecycleController;
use mentorlink_core::booking::BookingRepository;
use mentorlink_core::catalog::CatalogProvider;
use mentorlink_core::clock::Clock;
use mentorlink_core::config::AppConfig;
use mentorlink_core::conversation::ConversationRepository;
use mentorlink_core::error::Result;
use mentorlink_core::rating::{HistoryRepository, RatingRepository};
use mentorlink_core::user::UserRepository;
use mentorlink_infrastructure::{
    InMemoryBookingRepository, InMemoryConversationRepository, InMemoryHistoryRepository,
    InMemoryRatingRepository, InMemoryUserRepository, MentorPaths, StorageRepository,
    TomlBookingRepository, TomlConversationRepository, TomlHistoryRepository,
    TomlRatingRepository, TomlUserRepository,
};
use std::sync::Arc;

/// One backend per entity type.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub ratings: Arc<dyn RatingRepository>,
    pub history: Arc<dyn HistoryRepository>,
    pub conversations: Arc<dyn ConversationRepository>,
}

impl Repositories {
    /// Process-local repositories; nothing survives the process.
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            bookings: Arc::new(InMemoryBookingRepository::new()),
            ratings: Arc::new(InMemoryRatingRepository::new()),
            history: Arc::new(InMemoryHistoryRepository::new()),
            conversations: Arc::new(InMemoryConversationRepository::new()),
        }
    }

    /// TOML collection files under the data directory of `paths`.
    pub fn open(paths: &MentorPaths) -> Result<Self> {
        tracing::debug!(data_dir = %paths.data_dir()?.display(), "Opening file-backed repositories");
        Ok(Self {
            users: Arc::new(TomlUserRepository::open(paths)?),
            bookings: Arc::new(TomlBookingRepository::open(paths)?),
            ratings: Arc::new(TomlRatingRepository::open(paths)?),
            history: Arc::new(TomlHistoryRepository::open(paths)?),
            conversations: Arc::new(TomlConversationRepository::open(paths)?),
        })
    }
}

/// All application services, ready to use.
pub struct AppServices {
    pub repositories: Repositories,
    pub catalog: Arc<DirectoryCatalog>,
    pub bookings: Arc<BookingManager>,
    pub sessions: Arc<SessionLifecycleController>,
    pub ratings: Arc<RatingCollector>,
    pub conversations: ConversationService,
    pub profiles: Arc<ProfileService>,
    pub events: LifecycleEvents,
    pub clock: Arc<dyn Clock>,
}

impl AppServices {
    pub fn new(repositories: Repositories, config: &AppConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        let events = LifecycleEvents::new();
        let lock = BookingLock::default();
        let catalog = Arc::new(DirectoryCatalog::new(
            repositories.users.clone(),
            repositories.history.clone(),
        ));
        let catalog_provider: Arc<dyn CatalogProvider> = catalog.clone();

        let bookings = Arc::new(BookingManager::new(
            repositories.bookings.clone(),
            repositories.users.clone(),
            catalog_provider,
            clock.clone(),
            events.clone(),
            lock.clone(),
            config.booking.session_minutes,
        ));
        let conversations = ConversationService::new(
            repositories.conversations.clone(),
            clock.clone(),
            config.auto_reply.clone(),
        );
        let sessions = Arc::new(SessionLifecycleController::new(
            repositories.bookings.clone(),
            conversations.clone(),
            clock.clone(),
            events.clone(),
            lock.clone(),
        ));
        let ratings = Arc::new(RatingCollector::new(
            repositories.bookings.clone(),
            repositories.ratings.clone(),
            repositories.history.clone(),
            clock.clone(),
            events.clone(),
            lock,
        ));
        let profiles = Arc::new(ProfileService::new(repositories.users.clone(), clock.clone()));

        Ok(Self {
            repositories,
            catalog,
            bookings,
            sessions,
            ratings,
            conversations,
            profiles,
            events,
            clock,
        })
    }

    pub fn in_memory(config: &AppConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        Self::new(Repositories::in_memory(), config, clock)
    }

    /// File-backed services; a configured `storage.data_dir` overrides the
    /// data directory of `paths`.
    pub fn file_backed(paths: &MentorPaths, config: &AppConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let paths = match &config.storage.data_dir {
            Some(dir) => paths.clone().with_data_dir(Some(dir.clone())),
            None => paths.clone(),
        };
        Self::new(Repositories::open(&paths)?, config, clock)
    }
}
