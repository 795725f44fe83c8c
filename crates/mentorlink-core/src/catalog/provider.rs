//! Catalog provider trait.

use super::model::VolunteerListing;
use crate::error::Result;
use async_trait::async_trait;

/// Read-only source of volunteer listings.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn list_volunteers(&self) -> Result<Vec<VolunteerListing>>;

    async fn find_volunteer(&self, volunteer_id: &str) -> Result<Option<VolunteerListing>> {
        Ok(self
            .list_volunteers()
            .await?
            .into_iter()
            .find(|v| v.id == volunteer_id))
    }

    async fn search_volunteers(&self, query: &str) -> Result<Vec<VolunteerListing>> {
        Ok(self
            .list_volunteers()
            .await?
            .into_iter()
            .filter(|v| v.matches(query))
            .collect())
    }
}
