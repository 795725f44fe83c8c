//! TOML-backed rating and history repositories.

use crate::paths::Collection;
use crate::storage::TomlCollection;
use crate::storage_repository::StorageRepository;
use async_trait::async_trait;
use mentorlink_core::error::{MentorError, Result};
use mentorlink_core::rating::{HistoryRecord, HistoryRepository, Rating, RatingRepository};

/// Stores ratings in `ratings.toml`. Insert-only.
pub struct TomlRatingRepository {
    ratings: TomlCollection<Rating>,
}

impl StorageRepository for TomlRatingRepository {
    const COLLECTION: Collection = Collection::Ratings;
    const ENTITY_NAME: &'static str = "rating";
    type Item = Rating;

    fn from_collection(collection: TomlCollection<Rating>) -> Self {
        Self {
            ratings: collection,
        }
    }

    fn collection(&self) -> &TomlCollection<Rating> {
        &self.ratings
    }
}

#[async_trait]
impl RatingRepository for TomlRatingRepository {
    async fn find_by_booking(&self, booking_id: &str) -> Result<Option<Rating>> {
        Ok(self
            .ratings
            .read()
            .await?
            .into_iter()
            .find(|rating| rating.booking_id == booking_id))
    }

    async fn insert(&self, rating: &Rating) -> Result<()> {
        let rating = rating.clone();
        self.ratings
            .modify(move |ratings| {
                if ratings.iter().any(|r| r.booking_id == rating.booking_id) {
                    return Err(MentorError::already_resolved(rating.booking_id));
                }
                ratings.push(rating);
                Ok(())
            })
            .await
    }

    async fn list_by_rated_user(&self, user_id: &str) -> Result<Vec<Rating>> {
        let mut ratings: Vec<Rating> = self
            .ratings
            .read()
            .await?
            .into_iter()
            .filter(|rating| rating.rated_user_id == user_id)
            .collect();
        ratings.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(ratings)
    }
}

/// Stores the meeting history in `history.toml`. Append-only.
pub struct TomlHistoryRepository {
    records: TomlCollection<HistoryRecord>,
}

impl StorageRepository for TomlHistoryRepository {
    const COLLECTION: Collection = Collection::History;
    const ENTITY_NAME: &'static str = "history record";
    type Item = HistoryRecord;

    fn from_collection(collection: TomlCollection<HistoryRecord>) -> Self {
        Self {
            records: collection,
        }
    }

    fn collection(&self) -> &TomlCollection<HistoryRecord> {
        &self.records
    }
}

#[async_trait]
impl HistoryRepository for TomlHistoryRepository {
    async fn find_by_booking(&self, booking_id: &str) -> Result<Option<HistoryRecord>> {
        Ok(self
            .records
            .read()
            .await?
            .into_iter()
            .find(|record| record.booking_id == booking_id))
    }

    async fn append(&self, record: &HistoryRecord) -> Result<()> {
        let record = record.clone();
        self.records
            .modify(move |records| {
                if records.iter().any(|r| r.booking_id == record.booking_id) {
                    return Err(MentorError::already_resolved(record.booking_id));
                }
                records.push(record);
                Ok(())
            })
            .await
    }

    async fn list_all(&self) -> Result<Vec<HistoryRecord>> {
        let mut records = self.records.read().await?;
        records.reverse();
        records.sort_by(|a, b| b.archived_at.cmp(&a.archived_at));
        Ok(records)
    }
}
