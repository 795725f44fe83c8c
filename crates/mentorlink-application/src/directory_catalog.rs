//! Volunteer catalog derived from users and meeting history.

use async_trait::async_trait;
use mentorlink_core::catalog::{CatalogProvider, VolunteerListing};
use mentorlink_core::error::Result;
use mentorlink_core::rating::{HistoryRecord, HistoryRepository, HistoryStats};
use mentorlink_core::user::UserRepository;
use std::collections::HashMap;
use std::sync::Arc;

/// Projects every volunteer user into a [`VolunteerListing`], attaching
/// the rating aggregate from the history.
pub struct DirectoryCatalog {
    users: Arc<dyn UserRepository>,
    history: Arc<dyn HistoryRepository>,
}

impl DirectoryCatalog {
    pub fn new(users: Arc<dyn UserRepository>, history: Arc<dyn HistoryRepository>) -> Self {
        Self { users, history }
    }
}

#[async_trait]
impl CatalogProvider for DirectoryCatalog {
    async fn list_volunteers(&self) -> Result<Vec<VolunteerListing>> {
        let mut by_volunteer: HashMap<String, Vec<HistoryRecord>> = HashMap::new();
        for record in self.history.list_all().await? {
            by_volunteer
                .entry(record.volunteer_id.clone())
                .or_default()
                .push(record);
        }

        Ok(self
            .users
            .list_all()
            .await?
            .iter()
            .filter(|user| user.is_volunteer())
            .map(|user| {
                let records = by_volunteer.get(&user.id).map(Vec::as_slice).unwrap_or(&[]);
                VolunteerListing::project(user, &HistoryStats::from_records(records))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mentorlink_core::rating::Rating;
    use mentorlink_core::session::CompletedSession;
    use mentorlink_infrastructure::seed::seed_demo;
    use mentorlink_infrastructure::{InMemoryHistoryRepository, InMemoryUserRepository};

    fn completed(booking_id: &str, volunteer_id: &str) -> CompletedSession {
        let now = Utc::now();
        CompletedSession {
            booking_id: booking_id.to_string(),
            learner_id: "learner-1".to_string(),
            volunteer_id: volunteer_id.to_string(),
            volunteer_name: "María García".to_string(),
            topic: "WhatsApp".to_string(),
            date: now.date_naive(),
            time: now.time(),
            started_at: now,
            ended_at: now,
            duration_secs: 0,
            description: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_lists_only_volunteers_with_aggregates() {
        let users = Arc::new(InMemoryUserRepository::new());
        let history = Arc::new(InMemoryHistoryRepository::new());
        seed_demo(users.as_ref(), Utc::now()).await.unwrap();

        let now = Utc::now();
        for (id, score) in [("b-1", Some(5)), ("b-2", Some(4)), ("b-3", None)] {
            let session = completed(id, "vol-1");
            let rating = score.map(|s| Rating::new(&session, s, None, now).unwrap());
            history
                .append(&HistoryRecord::from_session(&session, rating.as_ref(), now))
                .await
                .unwrap();
        }

        let catalog = DirectoryCatalog::new(users, history);
        let listings = catalog.list_volunteers().await.unwrap();
        assert_eq!(listings.len(), 4);

        let maria = catalog.find_volunteer("vol-1").await.unwrap().unwrap();
        assert_eq!(maria.sessions, 3);
        assert_eq!(maria.rating, Some(4.5));

        let carlos = catalog.find_volunteer("vol-2").await.unwrap().unwrap();
        assert_eq!(carlos.rating, None);
        assert!(catalog.find_volunteer("learner-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_by_skill() {
        let users = Arc::new(InMemoryUserRepository::new());
        seed_demo(users.as_ref(), Utc::now()).await.unwrap();
        let catalog = DirectoryCatalog::new(users, Arc::new(InMemoryHistoryRepository::new()));

        let found = catalog.search_volunteers("yappy").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Ana Martínez");
    }
}
