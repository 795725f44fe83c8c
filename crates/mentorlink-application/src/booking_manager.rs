//! Booking creation, listing and cancellation.

use crate::events::LifecycleEvents;
use mentorlink_core::booking::{Booking, BookingAction, BookingRepository, BookingStatus, NewBooking};
use mentorlink_core::catalog::CatalogProvider;
use mentorlink_core::clock::Clock;
use mentorlink_core::error::{MentorError, Result};
use mentorlink_core::session::LifecycleEvent;
use mentorlink_core::user::UserRepository;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Serializes every read-check-write on the booking list.
///
/// Shared by the booking manager, the session controller and the rating
/// collector so that a cancel and a join on the same booking cannot
/// interleave.
pub type BookingLock = Arc<Mutex<()>>;

const FALLBACK_TOPIC: &str = "General";

pub struct BookingManager {
    bookings: Arc<dyn BookingRepository>,
    users: Arc<dyn UserRepository>,
    catalog: Arc<dyn CatalogProvider>,
    clock: Arc<dyn Clock>,
    events: LifecycleEvents,
    lock: BookingLock,
    session_minutes: u32,
}

impl BookingManager {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        users: Arc<dyn UserRepository>,
        catalog: Arc<dyn CatalogProvider>,
        clock: Arc<dyn Clock>,
        events: LifecycleEvents,
        lock: BookingLock,
        session_minutes: u32,
    ) -> Self {
        Self {
            bookings,
            users,
            catalog,
            clock,
            events,
            lock,
            session_minutes,
        }
    }

    /// Books `request.slot` with a volunteer.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the learner or the volunteer does not exist
    /// - `Validation` if the volunteer does not offer the slot, or the
    ///   learner or the volunteer already holds an overlapping booking
    pub async fn create_booking(&self, request: NewBooking) -> Result<Booking> {
        let _guard = self.lock.lock().await;

        if request.learner_id == request.volunteer_id {
            return Err(MentorError::validation("A learner cannot book themselves"));
        }
        if self.users.find_by_id(&request.learner_id).await?.is_none() {
            return Err(MentorError::not_found("user", &request.learner_id));
        }
        let volunteer = self
            .catalog
            .find_volunteer(&request.volunteer_id)
            .await?
            .ok_or_else(|| MentorError::not_found("volunteer", &request.volunteer_id))?;

        if !volunteer.offers(&request.slot) {
            return Err(MentorError::validation(format!(
                "{} does not offer {}",
                volunteer.name, request.slot
            )));
        }

        let learner_bookings = self.bookings.list_by_learner(&request.learner_id).await?;
        if let Some(clash) = self.first_overlap(&learner_bookings, &request) {
            return Err(MentorError::validation(format!(
                "Learner already has a booking at {} overlapping {}",
                clash.slot(),
                request.slot
            )));
        }

        let volunteer_bookings = self.bookings.list_by_volunteer(&request.volunteer_id).await?;
        if let Some(clash) = self.first_overlap(&volunteer_bookings, &request) {
            return Err(MentorError::validation(format!(
                "{} is already booked at {}",
                volunteer.name,
                clash.slot()
            )));
        }

        let topic = request
            .topic
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .or(volunteer.specialty.clone())
            .unwrap_or_else(|| FALLBACK_TOPIC.to_string());

        let now = self.clock.now();
        let booking = Booking {
            id: Uuid::new_v4().to_string(),
            learner_id: request.learner_id,
            volunteer_id: volunteer.id,
            volunteer_name: volunteer.name,
            topic,
            date: request.slot.date,
            time: request.slot.time,
            status: BookingStatus::Scheduled,
            created_at: now,
            updated_at: now,
            started_at: None,
            ended_at: None,
            duration_secs: None,
            description: request
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            notes: None,
        };
        self.bookings.save(&booking).await?;

        tracing::info!(
            booking_id = %booking.id,
            learner_id = %booking.learner_id,
            volunteer_id = %booking.volunteer_id,
            slot = %booking.slot(),
            "Booking created"
        );
        self.events.publish(LifecycleEvent::BookingCreated {
            booking: booking.clone(),
        });
        Ok(booking)
    }

    /// A learner's active bookings, date then time ascending.
    pub async fn list_bookings(&self, learner_id: &str) -> Result<Vec<Booking>> {
        self.bookings.list_by_learner(learner_id).await
    }

    pub async fn get_booking(&self, booking_id: &str) -> Result<Booking> {
        self.bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| MentorError::not_found("booking", booking_id))
    }

    /// Cancels a scheduled booking. Any other status is `InvalidState`.
    pub async fn cancel_booking(&self, booking_id: &str) -> Result<Booking> {
        let _guard = self.lock.lock().await;

        let mut booking = self.get_booking(booking_id).await?;
        booking.apply(BookingAction::Cancel, self.clock.now())?;
        self.bookings.save(&booking).await?;

        tracing::info!(booking_id = %booking.id, "Booking cancelled");
        self.events.publish(LifecycleEvent::BookingCancelled {
            booking_id: booking.id.clone(),
        });
        Ok(booking)
    }

    fn first_overlap<'a>(&self, existing: &'a [Booking], request: &NewBooking) -> Option<&'a Booking> {
        existing.iter().find(|b| {
            b.status.holds_slot() && b.slot().overlaps(&request.slot, self.session_minutes)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory_catalog::DirectoryCatalog;
    use chrono::Utc;
    use mentorlink_core::clock::ManualClock;
    use mentorlink_core::slot::TimeSlot;
    use mentorlink_core::user::UserRepository;
    use mentorlink_infrastructure::seed::{DEMO_LEARNER_ID, demo_users, seed_demo};
    use mentorlink_infrastructure::{
        InMemoryBookingRepository, InMemoryHistoryRepository, InMemoryUserRepository,
    };

    const SECOND_LEARNER_ID: &str = "learner-2";

    async fn create_manager() -> (BookingManager, LifecycleEvents) {
        let users = Arc::new(InMemoryUserRepository::new());
        seed_demo(users.as_ref(), Utc::now()).await.unwrap();
        manager_over(users)
    }

    /// Demo data plus a second learner, with vol-1 also offering 14:30 on
    /// 2025-01-20.
    async fn create_shared_manager() -> BookingManager {
        let users = Arc::new(InMemoryUserRepository::new());
        for mut user in demo_users(Utc::now()) {
            if user.id == "vol-1" {
                user.availability.push(slot("2025-01-20", "14:30"));
            }
            if user.id == DEMO_LEARNER_ID {
                let mut second = user.clone();
                second.id = SECOND_LEARNER_ID.to_string();
                second.full_name = "Rosa Díaz".to_string();
                users.save(&second).await.unwrap();
            }
            users.save(&user).await.unwrap();
        }
        manager_over(users).0
    }

    fn manager_over(users: Arc<InMemoryUserRepository>) -> (BookingManager, LifecycleEvents) {
        let history = Arc::new(InMemoryHistoryRepository::new());
        let catalog = Arc::new(DirectoryCatalog::new(users.clone(), history));
        let events = LifecycleEvents::new();
        let manager = BookingManager::new(
            Arc::new(InMemoryBookingRepository::new()),
            users,
            catalog,
            Arc::new(ManualClock::new(Utc::now())),
            events.clone(),
            BookingLock::default(),
            60,
        );
        (manager, events)
    }

    fn slot(date: &str, time: &str) -> TimeSlot {
        TimeSlot::parse(date, time).unwrap()
    }

    #[tokio::test]
    async fn test_create_defaults_topic_to_specialty() {
        let (manager, events) = create_manager().await;
        let mut rx = events.subscribe();

        let booking = manager
            .create_booking(NewBooking::new(DEMO_LEARNER_ID, "vol-2", slot("2025-01-20", "14:00")))
            .await
            .unwrap();

        assert_eq!(booking.status, BookingStatus::Scheduled);
        assert_eq!(booking.topic, "Email y Videollamadas");
        assert_eq!(booking.volunteer_name, "Carlos Rodríguez");
        assert!(matches!(
            rx.try_recv().unwrap(),
            LifecycleEvent::BookingCreated { .. }
        ));
    }

    #[tokio::test]
    async fn test_slot_not_offered_is_rejected() {
        let (manager, _) = create_manager().await;

        let err = manager
            .create_booking(NewBooking::new(DEMO_LEARNER_ID, "vol-1", slot("2025-01-21", "14:00")))
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert!(manager.list_bookings(DEMO_LEARNER_ID).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_volunteer_is_not_found() {
        let (manager, _) = create_manager().await;

        let err = manager
            .create_booking(NewBooking::new(DEMO_LEARNER_ID, "vol-99", slot("2025-01-20", "14:00")))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_learner_overlap_is_rejected() {
        let (manager, _) = create_manager().await;
        manager
            .create_booking(NewBooking::new(DEMO_LEARNER_ID, "vol-1", slot("2025-01-20", "14:00")))
            .await
            .unwrap();

        let err = manager
            .create_booking(NewBooking::new(DEMO_LEARNER_ID, "vol-2", slot("2025-01-20", "14:00")))
            .await
            .unwrap_err();
        assert!(err.is_validation());

        // The next hour does not overlap a 60 minute slot.
        manager
            .create_booking(NewBooking::new(DEMO_LEARNER_ID, "vol-2", slot("2025-01-20", "15:00")))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_volunteer_cannot_be_double_booked() {
        let manager = create_shared_manager().await;
        manager
            .create_booking(NewBooking::new(DEMO_LEARNER_ID, "vol-1", slot("2025-01-20", "14:00")))
            .await
            .unwrap();

        for time in ["14:00", "14:30"] {
            let err = manager
                .create_booking(NewBooking::new(SECOND_LEARNER_ID, "vol-1", slot("2025-01-20", time)))
                .await
                .unwrap_err();
            assert!(err.is_validation(), "{time} should clash with the 14:00 call");
        }
        assert!(manager.list_bookings(SECOND_LEARNER_ID).await.unwrap().is_empty());

        // Another volunteer at the same time is fine.
        manager
            .create_booking(NewBooking::new(SECOND_LEARNER_ID, "vol-2", slot("2025-01-20", "14:00")))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_self_booking_is_rejected() {
        let (manager, _) = create_manager().await;

        let err = manager
            .create_booking(NewBooking::new("vol-1", "vol-1", slot("2025-01-20", "14:00")))
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert!(manager.list_bookings("vol-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_description_is_trimmed_and_kept() {
        let (manager, _) = create_manager().await;

        let booking = manager
            .create_booking(
                NewBooking::new(DEMO_LEARNER_ID, "vol-2", slot("2025-01-20", "14:00"))
                    .with_description("  Quiero enviar fotos a mi nieta  "),
            )
            .await
            .unwrap();

        assert_eq!(booking.description.as_deref(), Some("Quiero enviar fotos a mi nieta"));
        assert_eq!(booking.notes, None);
    }

    #[tokio::test]
    async fn test_cancelled_booking_frees_the_slot() {
        let (manager, _) = create_manager().await;
        let first = manager
            .create_booking(NewBooking::new(DEMO_LEARNER_ID, "vol-1", slot("2025-01-22", "10:00")))
            .await
            .unwrap();

        manager.cancel_booking(&first.id).await.unwrap();

        manager
            .create_booking(NewBooking::new(DEMO_LEARNER_ID, "vol-1", slot("2025-01-22", "10:00")))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancel_twice_is_invalid_state() {
        let (manager, _) = create_manager().await;
        let booking = manager
            .create_booking(NewBooking::new(DEMO_LEARNER_ID, "vol-1", slot("2025-01-22", "10:00")))
            .await
            .unwrap();

        manager.cancel_booking(&booking.id).await.unwrap();
        let err = manager.cancel_booking(&booking.id).await.unwrap_err();

        assert!(err.is_invalid_state());
        assert_eq!(
            manager.get_booking(&booking.id).await.unwrap().status,
            BookingStatus::Cancelled
        );
    }

    #[tokio::test]
    async fn test_list_is_sorted_by_date_then_time() {
        let (manager, _) = create_manager().await;
        for (date, time) in [("2025-01-27", "10:00"), ("2025-01-20", "16:00"), ("2025-01-20", "10:00")] {
            manager
                .create_booking(NewBooking::new(DEMO_LEARNER_ID, "vol-3", slot(date, time)))
                .await
                .unwrap();
        }

        let slots: Vec<_> = manager
            .list_bookings(DEMO_LEARNER_ID)
            .await
            .unwrap()
            .iter()
            .map(|b| b.slot().to_string())
            .collect();
        assert_eq!(
            slots,
            vec!["2025-01-20 10:00", "2025-01-20 16:00", "2025-01-27 10:00"]
        );
    }
}
