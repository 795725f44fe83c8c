//! Rating and history repository traits.

use super::model::{HistoryRecord, Rating};
use crate::error::Result;
use async_trait::async_trait;

/// Persistence contract for ratings.
#[async_trait]
pub trait RatingRepository: Send + Sync {
    async fn find_by_booking(&self, booking_id: &str) -> Result<Option<Rating>>;

    /// Stores a new rating.
    ///
    /// Ratings are immutable: implementations must fail with
    /// `MentorError::AlreadyResolved` if one exists for the same booking.
    async fn insert(&self, rating: &Rating) -> Result<()>;

    /// Ratings received by a volunteer, oldest first.
    async fn list_by_rated_user(&self, user_id: &str) -> Result<Vec<Rating>>;
}

/// Persistence contract for the meeting history.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    async fn find_by_booking(&self, booking_id: &str) -> Result<Option<HistoryRecord>>;

    /// Appends a record.
    ///
    /// Each booking appears at most once: implementations must fail with
    /// `MentorError::AlreadyResolved` on a duplicate booking id.
    async fn append(&self, record: &HistoryRecord) -> Result<()>;

    /// All records, most recently archived first.
    async fn list_all(&self) -> Result<Vec<HistoryRecord>>;

    /// A learner's records, most recently archived first.
    async fn list_by_learner(&self, learner_id: &str) -> Result<Vec<HistoryRecord>> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .filter(|r| r.learner_id == learner_id)
            .collect())
    }

    /// A volunteer's records, most recently archived first.
    async fn list_by_volunteer(&self, volunteer_id: &str) -> Result<Vec<HistoryRecord>> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .filter(|r| r.volunteer_id == volunteer_id)
            .collect())
    }
}
