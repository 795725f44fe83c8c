//! TOML-backed UserRepository implementation.

use crate::paths::Collection;
use crate::storage::TomlCollection;
use crate::storage_repository::StorageRepository;
use async_trait::async_trait;
use mentorlink_core::error::Result;
use mentorlink_core::user::{User, UserRepository};

/// Stores every user in `users.toml`.
pub struct TomlUserRepository {
    users: TomlCollection<User>,
}

impl StorageRepository for TomlUserRepository {
    const COLLECTION: Collection = Collection::Users;
    const ENTITY_NAME: &'static str = "user";
    type Item = User;

    fn from_collection(collection: TomlCollection<User>) -> Self {
        Self { users: collection }
    }

    fn collection(&self) -> &TomlCollection<User> {
        &self.users
    }
}

#[async_trait]
impl UserRepository for TomlUserRepository {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await?
            .into_iter()
            .find(|user| user.id == user_id))
    }

    async fn save(&self, user: &User) -> Result<()> {
        let user = user.clone();
        self.users
            .modify(move |users| {
                match users.iter_mut().find(|existing| existing.id == user.id) {
                    Some(existing) => *existing = user,
                    None => users.push(user),
                }
                Ok(())
            })
            .await
    }

    async fn list_all(&self) -> Result<Vec<User>> {
        let mut users = self.users.read().await?;
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users)
    }
}
