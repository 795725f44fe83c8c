//! User repository trait.

use super::model::User;
use crate::error::Result;
use async_trait::async_trait;

/// Persistence contract for users.
///
/// Users are never deleted, so there is no `delete`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Returns `Ok(None)` when no user has this id.
    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>>;

    /// Inserts or replaces the user with the same id.
    async fn save(&self, user: &User) -> Result<()>;

    /// Lists every user, ordered by creation time (oldest first).
    async fn list_all(&self) -> Result<Vec<User>>;
}
