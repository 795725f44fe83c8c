//! Post-session rating and archival.
//!
//! Rating and skipping both archive the booking: a history record is
//! appended and the booking leaves the active list. Whichever runs first
//! resolves the booking; any later attempt fails with `AlreadyResolved`.

use crate::booking_manager::BookingLock;
use crate::events::LifecycleEvents;
use chrono::{DateTime, Utc};
use mentorlink_core::booking::{BookingRepository, BookingStatus};
use mentorlink_core::clock::Clock;
use mentorlink_core::error::{MentorError, Result};
use mentorlink_core::rating::{
    HistoryRecord, HistoryRepository, HistoryStats, Rating, RatingRepository,
};
use mentorlink_core::session::{CompletedSession, LifecycleEvent};
use std::sync::Arc;

pub struct RatingCollector {
    bookings: Arc<dyn BookingRepository>,
    ratings: Arc<dyn RatingRepository>,
    history: Arc<dyn HistoryRepository>,
    clock: Arc<dyn Clock>,
    events: LifecycleEvents,
    lock: BookingLock,
}

impl RatingCollector {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        ratings: Arc<dyn RatingRepository>,
        history: Arc<dyn HistoryRepository>,
        clock: Arc<dyn Clock>,
        events: LifecycleEvents,
        lock: BookingLock,
    ) -> Self {
        Self {
            bookings,
            ratings,
            history,
            clock,
            events,
            lock,
        }
    }

    /// Rebuilds the completed-session summary for an unresolved booking.
    ///
    /// Lets a caller that only kept the booking id (e.g. a later CLI
    /// invocation) rate or skip.
    pub async fn completed_session(&self, booking_id: &str) -> Result<CompletedSession> {
        self.resolve(booking_id).await
    }

    /// Stores a rating for `session` and archives its booking.
    ///
    /// If an earlier attempt stored the rating but failed before archiving,
    /// the stored rating is kept and the archival is finished.
    ///
    /// # Errors
    ///
    /// - `AlreadyResolved` if the booking was already rated or skipped
    /// - `Validation` if `score` is outside 1..=5
    /// - `NotFound` / `InvalidState` if the booking is unknown or not completed
    pub async fn submit_rating(
        &self,
        session: &CompletedSession,
        score: u8,
        comment: Option<String>,
    ) -> Result<Rating> {
        let _guard = self.lock.lock().await;

        let session = self.resolve(&session.booking_id).await?;
        let now = self.clock.now();
        let rating = Rating::new(&session, score, comment, now)?;

        let rating = match self.ratings.find_by_booking(&session.booking_id).await? {
            Some(stored) => {
                tracing::warn!(booking_id = %session.booking_id, "Finishing an interrupted rating");
                stored
            }
            None => {
                self.ratings.insert(&rating).await?;
                rating
            }
        };
        self.archive(&session, Some(&rating), now).await?;

        tracing::info!(booking_id = %session.booking_id, score = rating.score, "Rating submitted");
        self.events.publish(LifecycleEvent::RatingSubmitted {
            booking_id: session.booking_id.clone(),
            score: rating.score,
        });
        Ok(rating)
    }

    /// Archives `session`'s booking without a rating.
    ///
    /// A booking that already has a rating is `AlreadyResolved`; if that
    /// rating was never archived, the archival is finished first.
    pub async fn skip_rating(&self, session: &CompletedSession) -> Result<HistoryRecord> {
        let _guard = self.lock.lock().await;

        let session = self.resolve(&session.booking_id).await?;
        let now = self.clock.now();
        if let Some(stored) = self.ratings.find_by_booking(&session.booking_id).await? {
            tracing::warn!(booking_id = %session.booking_id, "Finishing an interrupted rating");
            self.archive(&session, Some(&stored), now).await?;
            return Err(MentorError::already_resolved(&session.booking_id));
        }

        let record = self.archive(&session, None, now).await?;

        tracing::info!(booking_id = %session.booking_id, "Rating skipped");
        self.events.publish(LifecycleEvent::RatingSkipped {
            booking_id: session.booking_id.clone(),
        });
        Ok(record)
    }

    /// A learner's archived sessions, most recent first.
    pub async fn history(&self, learner_id: &str) -> Result<Vec<HistoryRecord>> {
        self.history.list_by_learner(learner_id).await
    }

    pub async fn history_stats(&self, learner_id: &str) -> Result<HistoryStats> {
        let records = self.history.list_by_learner(learner_id).await?;
        Ok(HistoryStats::from_records(&records))
    }

    /// Appends the history record, then drops the booking from the active
    /// list. The history record is what marks the booking resolved.
    async fn archive(
        &self,
        session: &CompletedSession,
        rating: Option<&Rating>,
        now: DateTime<Utc>,
    ) -> Result<HistoryRecord> {
        let record = HistoryRecord::from_session(session, rating, now);
        self.history.append(&record).await?;
        self.bookings.delete(&session.booking_id).await?;
        Ok(record)
    }

    /// Checks that the booking is completed and not yet archived, and
    /// returns its summary as stored.
    async fn resolve(&self, booking_id: &str) -> Result<CompletedSession> {
        if self.history.find_by_booking(booking_id).await?.is_some() {
            // Archived but still listed: the delete after the append failed.
            if self.bookings.find_by_id(booking_id).await?.is_some() {
                self.bookings.delete(booking_id).await?;
            }
            return Err(MentorError::already_resolved(booking_id));
        }

        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| MentorError::not_found("booking", booking_id))?;

        if booking.status != BookingStatus::Completed {
            return Err(MentorError::invalid_state(
                "booking",
                booking_id,
                format!("cannot rate a booking that is {}", booking.status),
            ));
        }

        CompletedSession::from_booking(&booking).ok_or_else(|| {
            MentorError::invalid_state("booking", booking_id, "completed without start and end times")
        })
    }
}
