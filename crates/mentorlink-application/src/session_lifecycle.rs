//! Live-session lifecycle: join, end and what happens during the call.
//!
//! A live session exists only in this controller's memory, between a
//! successful `join_session` and the matching `end_session`. At most one
//! live session exists per learner. A booking left `in-progress` by a
//! process that exited mid-call can be picked up again with
//! `resume_session`, or ended directly.

use crate::booking_manager::BookingLock;
use crate::conversation_service::{ConversationService, SentMessage};
use crate::events::LifecycleEvents;
use chrono::Duration;
use mentorlink_core::booking::{Booking, BookingAction, BookingRepository, BookingStatus};
use mentorlink_core::clock::Clock;
use mentorlink_core::conversation::{Conversation, Message, session_conversation_id};
use mentorlink_core::error::{MentorError, Result};
use mentorlink_core::session::{CompletedSession, LifecycleEvent, LiveSession, SessionHandle};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct SessionLifecycleController {
    bookings: Arc<dyn BookingRepository>,
    conversations: ConversationService,
    clock: Arc<dyn Clock>,
    events: LifecycleEvents,
    lock: BookingLock,
    /// Live sessions keyed by learner id.
    live: RwLock<HashMap<String, LiveSession>>,
}

impl SessionLifecycleController {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        conversations: ConversationService,
        clock: Arc<dyn Clock>,
        events: LifecycleEvents,
        lock: BookingLock,
    ) -> Self {
        Self {
            bookings,
            conversations,
            clock,
            events,
            lock,
            live: RwLock::new(HashMap::new()),
        }
    }

    /// Starts the call for a scheduled booking.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the booking does not exist
    /// - `InvalidState` if the booking is not `scheduled`, or its learner is
    ///   already in another live session
    pub async fn join_session(&self, booking_id: &str) -> Result<SessionHandle> {
        let _guard = self.lock.lock().await;

        let mut booking = self.find_booking(booking_id).await?;
        if booking.status != BookingStatus::Scheduled {
            return Err(MentorError::invalid_state(
                "booking",
                booking_id,
                format!("cannot join a booking that is {}", booking.status),
            ));
        }

        let mut live = self.live.write().await;
        if let Some(active) = live.get(&booking.learner_id) {
            return Err(MentorError::invalid_state(
                "session",
                booking_id,
                format!(
                    "learner {} is already in session {}",
                    booking.learner_id, active.booking_id
                ),
            ));
        }

        let now = self.clock.now();
        booking.apply(BookingAction::Join, now)?;
        self.bookings.save(&booking).await?;

        let session = LiveSession::start(&booking, now);
        let handle = session.handle();
        live.insert(booking.learner_id.clone(), session);
        drop(live);

        tracing::info!(booking_id = %booking.id, learner_id = %booking.learner_id, "Session started");
        self.events.publish(LifecycleEvent::SessionStarted {
            booking_id: booking.id.clone(),
            learner_id: booking.learner_id.clone(),
        });
        Ok(handle)
    }

    /// Picks up the call of an `in-progress` booking that this controller
    /// is not tracking, keeping its original start time. Resuming the
    /// learner's current live session returns its handle.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the booking does not exist
    /// - `InvalidState` if the booking is not `in-progress`, or its learner
    ///   is live in another session
    pub async fn resume_session(&self, booking_id: &str) -> Result<SessionHandle> {
        let _guard = self.lock.lock().await;

        let booking = self.find_booking(booking_id).await?;
        if booking.status != BookingStatus::InProgress {
            return Err(MentorError::invalid_state(
                "booking",
                booking_id,
                format!("cannot resume a booking that is {}", booking.status),
            ));
        }

        let mut live = self.live.write().await;
        if let Some(active) = live.get(&booking.learner_id) {
            if active.booking_id == booking.id {
                return Ok(active.handle());
            }
            return Err(MentorError::invalid_state(
                "session",
                booking_id,
                format!(
                    "learner {} is already in session {}",
                    booking.learner_id, active.booking_id
                ),
            ));
        }

        let session = LiveSession::resume(&booking).ok_or_else(|| {
            MentorError::invalid_state("booking", booking_id, "in progress without a start time")
        })?;
        let handle = session.handle();
        live.insert(booking.learner_id.clone(), session);

        tracing::info!(booking_id = %booking.id, learner_id = %booking.learner_id, "Session resumed");
        Ok(handle)
    }

    /// Ends the session named by `handle` and completes its booking.
    ///
    /// A handle whose booking is still `in-progress` for the same learner
    /// ends that booking even when this controller never saw the join.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if neither a live session nor an `in-progress`
    ///   booking matches the handle
    /// - `NotFound` if the booking disappeared while the call was live
    pub async fn end_session(&self, handle: &SessionHandle) -> Result<CompletedSession> {
        let _guard = self.lock.lock().await;

        let mut live = self.live.write().await;
        let tracked = live
            .get(&handle.learner_id)
            .is_some_and(|session| session.booking_id == handle.booking_id);

        let mut booking = match self.bookings.find_by_id(&handle.booking_id).await? {
            Some(booking) if tracked || is_orphaned_call(&booking, handle) => booking,
            None if tracked => return Err(MentorError::not_found("booking", &handle.booking_id)),
            _ => {
                return Err(MentorError::invalid_state(
                    "session",
                    &handle.booking_id,
                    "no live session for this handle",
                ));
            }
        };
        if !tracked {
            tracing::warn!(booking_id = %booking.id, "Ending a call no live session was tracking");
        }

        booking.apply(BookingAction::End, self.clock.now())?;
        let completed = CompletedSession::from_booking(&booking).ok_or_else(|| {
            MentorError::internal(format!("booking {} completed without timing", booking.id))
        })?;
        self.bookings.save(&booking).await?;
        if tracked {
            live.remove(&handle.learner_id);
        }
        drop(live);

        tracing::info!(
            booking_id = %completed.booking_id,
            duration_secs = completed.duration_secs,
            "Session ended"
        );
        self.events.publish(LifecycleEvent::SessionEnded {
            session: completed.clone(),
        });
        Ok(completed)
    }

    /// The learner's live session, if any.
    pub async fn live_session(&self, learner_id: &str) -> Option<LiveSession> {
        self.live.read().await.get(learner_id).cloned()
    }

    /// Elapsed time of the live session named by `handle`.
    pub async fn duration_tally(&self, handle: &SessionHandle) -> Result<Duration> {
        let session = self.live_for(handle).await?;
        Ok(session.duration_tally(self.clock.now()))
    }

    /// The in-call chat thread of the live session named by `handle`.
    pub async fn session_chat(&self, handle: &SessionHandle) -> Result<Conversation> {
        let session = self.live_for(handle).await?;
        self.conversations.get_or_create_session_thread(&session).await
    }

    /// Sends `text` from the learner to the in-call chat. The volunteer's
    /// auto-reply follows as for any other thread.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the session is not live
    /// - `Validation` if `text` is blank
    pub async fn send_in_call(&self, handle: &SessionHandle, text: &str) -> Result<SentMessage> {
        let thread = self.session_chat(handle).await?;
        self.conversations
            .send_message(&thread.id, &handle.learner_id, text)
            .await
    }

    /// Messages of the in-call chat of `booking_id`, oldest first. Stays
    /// readable after the call ends.
    pub async fn in_call_messages(&self, booking_id: &str) -> Result<Vec<Message>> {
        match self.conversations.list_messages(&session_conversation_id(booking_id)).await {
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            other => other,
        }
    }

    /// Replaces the notes of a call that is live or has ended but is not
    /// yet rated. Blank text clears them.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the booking does not exist (or was already archived)
    /// - `InvalidState` if the call has not started or was cancelled
    pub async fn record_notes(&self, booking_id: &str, notes: &str) -> Result<Booking> {
        let _guard = self.lock.lock().await;

        let mut booking = self.find_booking(booking_id).await?;
        booking.record_notes(notes, self.clock.now())?;
        self.bookings.save(&booking).await?;

        tracing::debug!(booking_id, "Call notes recorded");
        Ok(booking)
    }

    async fn live_for(&self, handle: &SessionHandle) -> Result<LiveSession> {
        self.live
            .read()
            .await
            .get(&handle.learner_id)
            .filter(|session| session.booking_id == handle.booking_id)
            .cloned()
            .ok_or_else(|| {
                MentorError::invalid_state("session", &handle.booking_id, "session is not live")
            })
    }

    async fn find_booking(&self, booking_id: &str) -> Result<Booking> {
        self.bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| MentorError::not_found("booking", booking_id))
    }
}

/// A booking left `in-progress` by a session this controller does not track.
fn is_orphaned_call(booking: &Booking, handle: &SessionHandle) -> bool {
    booking.status == BookingStatus::InProgress && booking.learner_id == handle.learner_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
    use mentorlink_core::clock::ManualClock;
    use mentorlink_core::config::AutoReplySettings;
    use mentorlink_infrastructure::{InMemoryBookingRepository, InMemoryConversationRepository};

    struct Fixture {
        controller: SessionLifecycleController,
        bookings: Arc<InMemoryBookingRepository>,
        conversations: ConversationService,
        clock: ManualClock,
    }

    fn fixture() -> Fixture {
        let bookings = Arc::new(InMemoryBookingRepository::new());
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 20, 14, 0, 0).unwrap());
        let conversations = ConversationService::new(
            Arc::new(InMemoryConversationRepository::new()),
            Arc::new(clock.clone()),
            AutoReplySettings {
                enabled: false,
                ..AutoReplySettings::default()
            },
        );
        let controller = controller_over(&bookings, &conversations, &clock);
        Fixture {
            controller,
            bookings,
            conversations,
            clock,
        }
    }

    /// A second controller over the same stores, as a later process would
    /// build it.
    fn controller_over(
        bookings: &Arc<InMemoryBookingRepository>,
        conversations: &ConversationService,
        clock: &ManualClock,
    ) -> SessionLifecycleController {
        SessionLifecycleController::new(
            bookings.clone(),
            conversations.clone(),
            Arc::new(clock.clone()),
            LifecycleEvents::new(),
            BookingLock::default(),
        )
    }

    fn booking(id: &str, learner: &str, status: BookingStatus) -> Booking {
        let now = Utc::now();
        Booking {
            id: id.to_string(),
            learner_id: learner.to_string(),
            volunteer_id: "vol-2".to_string(),
            volunteer_name: "Carlos Rodríguez".to_string(),
            topic: "Email".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
            time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            status,
            created_at: now,
            updated_at: now,
            started_at: None,
            ended_at: None,
            duration_secs: None,
            description: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_join_then_end_records_duration() {
        let f = fixture();
        f.bookings.save(&booking("b-1", "1", BookingStatus::Scheduled)).await.unwrap();

        let handle = f.controller.join_session("b-1").await.unwrap();
        assert_eq!(
            f.bookings.find_by_id("b-1").await.unwrap().unwrap().status,
            BookingStatus::InProgress
        );

        f.clock.advance(Duration::seconds(60));
        assert_eq!(
            f.controller.duration_tally(&handle).await.unwrap(),
            Duration::seconds(60)
        );

        let completed = f.controller.end_session(&handle).await.unwrap();
        assert_eq!(completed.duration_secs, 60);
        assert_eq!(
            f.bookings.find_by_id("b-1").await.unwrap().unwrap().status,
            BookingStatus::Completed
        );
        assert!(f.controller.live_session("1").await.is_none());
    }

    #[tokio::test]
    async fn test_join_unknown_booking_is_not_found() {
        let f = fixture();
        assert!(f.controller.join_session("nope").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_join_cancelled_booking_is_invalid_state() {
        let f = fixture();
        f.bookings.save(&booking("b-1", "1", BookingStatus::Cancelled)).await.unwrap();

        let err = f.controller.join_session("b-1").await.unwrap_err();

        assert!(err.is_invalid_state());
        assert_eq!(
            f.bookings.find_by_id("b-1").await.unwrap().unwrap().status,
            BookingStatus::Cancelled
        );
    }

    #[tokio::test]
    async fn test_second_live_session_per_learner_is_rejected() {
        let f = fixture();
        f.bookings.save(&booking("b-1", "1", BookingStatus::Scheduled)).await.unwrap();
        f.bookings.save(&booking("b-2", "1", BookingStatus::Scheduled)).await.unwrap();
        f.controller.join_session("b-1").await.unwrap();

        let err = f.controller.join_session("b-2").await.unwrap_err();

        assert!(err.is_invalid_state());
        assert_eq!(
            f.bookings.find_by_id("b-2").await.unwrap().unwrap().status,
            BookingStatus::Scheduled
        );
    }

    #[tokio::test]
    async fn test_end_with_stale_handle_is_invalid_state() {
        let f = fixture();
        f.bookings.save(&booking("b-1", "1", BookingStatus::Scheduled)).await.unwrap();
        let handle = f.controller.join_session("b-1").await.unwrap();
        f.controller.end_session(&handle).await.unwrap();

        let err = f.controller.end_session(&handle).await.unwrap_err();
        assert!(err.is_invalid_state());
    }

    #[tokio::test]
    async fn test_call_left_running_by_another_process_can_be_ended() {
        let f = fixture();
        f.bookings.save(&booking("b-1", "1", BookingStatus::Scheduled)).await.unwrap();
        let handle = f.controller.join_session("b-1").await.unwrap();
        let restarted = controller_over(&f.bookings, &f.conversations, &f.clock);
        f.clock.advance(Duration::minutes(20));

        let completed = restarted.end_session(&handle).await.unwrap();

        assert_eq!(completed.duration_secs, 20 * 60);
        assert_eq!(
            f.bookings.find_by_id("b-1").await.unwrap().unwrap().status,
            BookingStatus::Completed
        );
        assert!(restarted.end_session(&handle).await.unwrap_err().is_invalid_state());
    }

    #[tokio::test]
    async fn test_resume_keeps_the_original_start() {
        let f = fixture();
        f.bookings.save(&booking("b-1", "1", BookingStatus::Scheduled)).await.unwrap();
        let original = f.controller.join_session("b-1").await.unwrap();
        f.clock.advance(Duration::minutes(5));
        let restarted = controller_over(&f.bookings, &f.conversations, &f.clock);

        let handle = restarted.resume_session("b-1").await.unwrap();

        assert_eq!(handle, original);
        assert_eq!(restarted.duration_tally(&handle).await.unwrap(), Duration::minutes(5));
        assert_eq!(restarted.resume_session("b-1").await.unwrap(), handle);
    }

    #[tokio::test]
    async fn test_resume_needs_an_in_progress_booking() {
        let f = fixture();
        f.bookings.save(&booking("b-1", "1", BookingStatus::Scheduled)).await.unwrap();

        assert!(f.controller.resume_session("b-1").await.unwrap_err().is_invalid_state());
        assert!(f.controller.resume_session("nope").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_handle_of_another_learner_cannot_end_the_call() {
        let f = fixture();
        f.bookings.save(&booking("b-1", "1", BookingStatus::Scheduled)).await.unwrap();
        let mut handle = f.controller.join_session("b-1").await.unwrap();
        handle.learner_id = "7".to_string();

        assert!(f.controller.end_session(&handle).await.unwrap_err().is_invalid_state());
        assert_eq!(
            f.bookings.find_by_id("b-1").await.unwrap().unwrap().status,
            BookingStatus::InProgress
        );
    }

    #[tokio::test]
    async fn test_in_call_chat_only_while_live() {
        let f = fixture();
        f.bookings.save(&booking("b-1", "1", BookingStatus::Scheduled)).await.unwrap();
        let handle = f.controller.join_session("b-1").await.unwrap();

        f.controller.send_in_call(&handle, "¿Me escucha bien?").await.unwrap();
        let thread = f.controller.session_chat(&handle).await.unwrap();
        assert_eq!(thread.booking_id.as_deref(), Some("b-1"));
        assert!(f.conversations.list_conversations("1").await.unwrap().is_empty());

        f.controller.end_session(&handle).await.unwrap();

        let err = f.controller.send_in_call(&handle, "Gracias").await.unwrap_err();
        assert!(err.is_invalid_state());
        let messages = f.controller.in_call_messages("b-1").await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender_id, "1");
        assert!(f.controller.in_call_messages("b-2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_notes_during_and_after_the_call() {
        let f = fixture();
        f.bookings.save(&booking("b-1", "1", BookingStatus::Scheduled)).await.unwrap();
        assert!(f.controller.record_notes("b-1", "Traer cargador").await.unwrap_err().is_invalid_state());

        let handle = f.controller.join_session("b-1").await.unwrap();
        f.controller.record_notes("b-1", "Configuramos el correo").await.unwrap();
        let completed = f.controller.end_session(&handle).await.unwrap();
        assert_eq!(completed.notes.as_deref(), Some("Configuramos el correo"));

        let booking = f.controller.record_notes("b-1", "Repasar adjuntos").await.unwrap();
        assert_eq!(booking.notes.as_deref(), Some("Repasar adjuntos"));
    }
}
