//! End-to-end booking → session → rating scenarios.

use chrono::{Duration, TimeZone, Utc};
use mentorlink_application::AppServices;
use mentorlink_core::booking::{BookingStatus, NewBooking};
use mentorlink_core::catalog::CatalogProvider;
use mentorlink_core::clock::ManualClock;
use mentorlink_core::config::AppConfig;
use mentorlink_core::session::LifecycleEvent;
use mentorlink_core::slot::TimeSlot;
use mentorlink_core::user::{User, UserRepository, UserRole};
use mentorlink_infrastructure::MentorPaths;
use mentorlink_infrastructure::seed::demo_slots;
use std::sync::Arc;

fn user(id: &str, name: &str, role: UserRole) -> User {
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    User {
        id: id.to_string(),
        full_name: name.to_string(),
        role,
        phone: "6000-0000".to_string(),
        cedula: "8-123-4567".to_string(),
        email: None,
        location: None,
        bio: None,
        profile_image: None,
        specialty: (role == UserRole::Volunteer).then(|| "Email y Videollamadas".to_string()),
        interests: Vec::new(),
        skills: Vec::new(),
        availability: if role == UserRole::Volunteer {
            demo_slots()
        } else {
            Vec::new()
        },
        created_at: now,
        updated_at: now,
    }
}

async fn setup(services: &AppServices) {
    let users = &services.repositories.users;
    users.save(&user("1", "Juan Pérez", UserRole::Elderly)).await.unwrap();
    users.save(&user("2", "Carlos Rodríguez", UserRole::Volunteer)).await.unwrap();
}

fn in_memory() -> (AppServices, ManualClock) {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 20, 13, 55, 0).unwrap());
    let services = AppServices::in_memory(&AppConfig::default(), Arc::new(clock.clone())).unwrap();
    (services, clock)
}

fn slot(date: &str, time: &str) -> TimeSlot {
    TimeSlot::parse(date, time).unwrap()
}

#[tokio::test]
async fn book_join_end_rate_archives_the_booking() {
    let (services, clock) = in_memory();
    setup(&services).await;
    let mut events = services.events.subscribe();

    let booking = services
        .bookings
        .create_booking(NewBooking::new("1", "2", slot("2025-01-20", "14:00")))
        .await
        .unwrap();

    let handle = services.sessions.join_session(&booking.id).await.unwrap();
    clock.advance(Duration::seconds(60));
    let completed = services.sessions.end_session(&handle).await.unwrap();

    assert_eq!(completed.booking_id, booking.id);
    assert_eq!(completed.duration_secs, 60);
    assert_eq!(completed.volunteer_name, "Carlos Rodríguez");
    assert_eq!(
        services.bookings.get_booking(&booking.id).await.unwrap().status,
        BookingStatus::Completed
    );

    let rating = services
        .ratings
        .submit_rating(&completed, 5, Some("great".to_string()))
        .await
        .unwrap();
    assert_eq!(rating.score, 5);

    let history = services.ratings.history("1").await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].booking_id, booking.id);
    assert_eq!(history[0].rating, Some(5));
    assert!(services.bookings.list_bookings("1").await.unwrap().is_empty());

    let listing = services.catalog.find_volunteer("2").await.unwrap().unwrap();
    assert_eq!(listing.rating, Some(5.0));
    assert_eq!(listing.sessions, 1);

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(matches!(seen[0], LifecycleEvent::BookingCreated { .. }));
    assert!(matches!(seen[1], LifecycleEvent::SessionStarted { .. }));
    assert!(matches!(seen[2], LifecycleEvent::SessionEnded { .. }));
    assert!(matches!(seen[3], LifecycleEvent::RatingSubmitted { score: 5, .. }));
    assert!(seen.iter().all(|e| e.booking_id() == booking.id));
}

#[tokio::test]
async fn created_booking_is_listed_with_identical_fields() {
    let (services, _clock) = in_memory();
    setup(&services).await;

    let booking = services
        .bookings
        .create_booking(NewBooking::new("1", "2", slot("2025-01-24", "11:00")).with_topic("Zoom"))
        .await
        .unwrap();

    let listed = services.bookings.list_bookings("1").await.unwrap();
    assert_eq!(listed, vec![booking]);
}

#[tokio::test]
async fn joining_a_cancelled_booking_is_invalid_state() {
    let (services, _clock) = in_memory();
    setup(&services).await;
    let booking = services
        .bookings
        .create_booking(NewBooking::new("1", "2", slot("2025-01-20", "14:00")))
        .await
        .unwrap();
    services.bookings.cancel_booking(&booking.id).await.unwrap();

    let err = services.sessions.join_session(&booking.id).await.unwrap_err();

    assert!(err.is_invalid_state());
    assert_eq!(
        services.bookings.get_booking(&booking.id).await.unwrap().status,
        BookingStatus::Cancelled
    );
}

#[tokio::test]
async fn illegal_edges_leave_state_unchanged() {
    let (services, _clock) = in_memory();
    setup(&services).await;
    let booking = services
        .bookings
        .create_booking(NewBooking::new("1", "2", slot("2025-01-20", "14:00")))
        .await
        .unwrap();

    // Cannot rate before the call happened.
    let err = services
        .ratings
        .completed_session(&booking.id)
        .await
        .unwrap_err();
    assert!(err.is_invalid_state());

    services.sessions.join_session(&booking.id).await.unwrap();

    // In progress: neither join again nor cancel.
    assert!(services.sessions.join_session(&booking.id).await.unwrap_err().is_invalid_state());
    assert!(services.bookings.cancel_booking(&booking.id).await.unwrap_err().is_invalid_state());
    assert_eq!(
        services.bookings.get_booking(&booking.id).await.unwrap().status,
        BookingStatus::InProgress
    );
}

#[tokio::test]
async fn rate_and_skip_are_mutually_exclusive() {
    let (services, clock) = in_memory();
    setup(&services).await;
    let booking = services
        .bookings
        .create_booking(NewBooking::new("1", "2", slot("2025-01-22", "10:00")))
        .await
        .unwrap();
    let handle = services.sessions.join_session(&booking.id).await.unwrap();
    clock.advance(Duration::minutes(30));
    let completed = services.sessions.end_session(&handle).await.unwrap();

    services.ratings.skip_rating(&completed).await.unwrap();

    let err = services.ratings.submit_rating(&completed, 4, None).await.unwrap_err();
    assert!(err.is_already_resolved());
    let err = services.ratings.skip_rating(&completed).await.unwrap_err();
    assert!(err.is_already_resolved());

    let history = services.ratings.history("1").await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].rating, None);
    assert_eq!(history[0].duration_secs, 30 * 60);
}

#[tokio::test]
async fn state_survives_reopening_file_storage() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let paths = MentorPaths::new(Some(temp_dir.path()));
    let config = AppConfig::default();
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 20, 13, 55, 0).unwrap());

    let booking_id = {
        let services = AppServices::file_backed(&paths, &config, Arc::new(clock.clone())).unwrap();
        setup(&services).await;
        let booking = services
            .bookings
            .create_booking(NewBooking::new("1", "2", slot("2025-01-20", "14:00")))
            .await
            .unwrap();
        let handle = services.sessions.join_session(&booking.id).await.unwrap();
        clock.advance(Duration::seconds(60));
        services.sessions.end_session(&handle).await.unwrap();
        booking.id
    };

    // A later process rates the completed booking by id.
    let services = AppServices::file_backed(&paths, &config, Arc::new(clock.clone())).unwrap();
    let completed = services.ratings.completed_session(&booking_id).await.unwrap();
    assert_eq!(completed.duration_secs, 60);

    services.ratings.submit_rating(&completed, 5, None).await.unwrap();

    let reopened = AppServices::file_backed(&paths, &config, Arc::new(clock)).unwrap();
    assert!(reopened.bookings.list_bookings("1").await.unwrap().is_empty());
    assert_eq!(reopened.ratings.history("1").await.unwrap().len(), 1);
    assert!(
        reopened
            .ratings
            .completed_session(&booking_id)
            .await
            .unwrap_err()
            .is_already_resolved()
    );
}

#[tokio::test]
async fn call_interrupted_mid_session_ends_after_reopening() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let paths = MentorPaths::new(Some(temp_dir.path()));
    let config = AppConfig::default();
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 20, 14, 0, 0).unwrap());

    // The joining process exits without ending the call.
    let (booking_id, handle) = {
        let services = AppServices::file_backed(&paths, &config, Arc::new(clock.clone())).unwrap();
        setup(&services).await;
        let booking = services
            .bookings
            .create_booking(NewBooking::new("1", "2", slot("2025-01-20", "14:00")))
            .await
            .unwrap();
        let handle = services.sessions.join_session(&booking.id).await.unwrap();
        (booking.id, handle)
    };
    clock.advance(Duration::minutes(25));

    let services = AppServices::file_backed(&paths, &config, Arc::new(clock.clone())).unwrap();
    assert_eq!(
        services.bookings.get_booking(&booking_id).await.unwrap().status,
        BookingStatus::InProgress
    );
    assert_eq!(services.sessions.resume_session(&booking_id).await.unwrap(), handle);

    let completed = services.sessions.end_session(&handle).await.unwrap();
    assert_eq!(completed.duration_secs, 25 * 60);
    services.ratings.skip_rating(&completed).await.unwrap();

    // The slot is free again.
    services
        .bookings
        .create_booking(NewBooking::new("1", "2", slot("2025-01-20", "14:00")))
        .await
        .unwrap();
}

#[tokio::test]
async fn in_call_chat_gets_the_volunteer_reply() {
    let mut config = AppConfig::default();
    config.auto_reply.min_delay_ms = 0;
    config.auto_reply.max_delay_ms = 0;
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 20, 14, 0, 0).unwrap());
    let services = AppServices::in_memory(&config, Arc::new(clock)).unwrap();
    setup(&services).await;
    let booking = services
        .bookings
        .create_booking(
            NewBooking::new("1", "2", slot("2025-01-20", "14:00")).with_description("Usar Zoom"),
        )
        .await
        .unwrap();
    let handle = services.sessions.join_session(&booking.id).await.unwrap();

    let sent = services.sessions.send_in_call(&handle, "No veo la cámara").await.unwrap();
    sent.auto_reply.unwrap().await.unwrap();
    services.sessions.record_notes(&booking.id, "Permisos de cámara").await.unwrap();
    let completed = services.sessions.end_session(&handle).await.unwrap();

    let messages = services.sessions.in_call_messages(&booking.id).await.unwrap();
    let senders: Vec<_> = messages.iter().map(|m| m.sender_id.as_str()).collect();
    assert_eq!(senders, vec!["1", "2"]);
    assert!(services.conversations.list_conversations("1").await.unwrap().is_empty());

    let record = services.ratings.skip_rating(&completed).await.unwrap();
    assert_eq!(record.description.as_deref(), Some("Usar Zoom"));
    assert_eq!(record.notes.as_deref(), Some("Permisos de cámara"));
}
