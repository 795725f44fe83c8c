//! Registration and profile edits.

use mentorlink_core::clock::Clock;
use mentorlink_core::error::{MentorError, Result};
use mentorlink_core::user::validation::{validate_new_user, validate_patch};
use mentorlink_core::user::{NewUser, ProfilePatch, User, UserRepository, UserRole};
use std::sync::Arc;
use uuid::Uuid;

pub struct ProfileService {
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl ProfileService {
    pub fn new(users: Arc<dyn UserRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { users, clock }
    }

    /// Creates a user after format validation.
    ///
    /// Offered slots are kept for volunteers only, sorted and deduplicated.
    pub async fn register_user(&self, new_user: NewUser) -> Result<User> {
        validate_new_user(&new_user)?;

        let mut availability = if new_user.role == UserRole::Volunteer {
            new_user.availability
        } else {
            Vec::new()
        };
        availability.sort();
        availability.dedup();

        let now = self.clock.now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            full_name: new_user.full_name.trim().to_string(),
            role: new_user.role,
            phone: new_user.phone.trim().to_string(),
            cedula: new_user.cedula.trim().to_string(),
            email: non_blank(new_user.email),
            location: non_blank(new_user.location),
            bio: non_blank(new_user.bio),
            profile_image: None,
            specialty: non_blank(new_user.specialty),
            interests: new_user.interests,
            skills: new_user.skills,
            availability,
            created_at: now,
            updated_at: now,
        };
        self.users.save(&user).await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(user)
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| MentorError::not_found("user", user_id))
    }

    /// Merges the editable fields of `patch`.
    ///
    /// A malformed phone or cedula fails with `Validation` and nothing is
    /// written.
    pub async fn update_profile(&self, user_id: &str, patch: ProfilePatch) -> Result<User> {
        let mut user = self.get_user(user_id).await?;
        validate_patch(&patch)?;
        if patch.is_empty() {
            return Ok(user);
        }

        user.apply_patch(patch, self.clock.now());
        self.users.save(&user).await?;

        tracing::info!(user_id, "Profile updated");
        Ok(user)
    }

    /// Same as [`update_profile`](Self::update_profile) for a JSON patch.
    /// Unknown fields are rejected.
    pub async fn update_profile_json(&self, user_id: &str, patch: &str) -> Result<User> {
        self.update_profile(user_id, ProfilePatch::from_json(patch)?).await
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
