//! User domain model.
//!
//! Users are created at registration, mutated by profile edits and never
//! hard-deleted.

use crate::error::{MentorError, Result};
use crate::slot::TimeSlot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The role chosen during onboarding.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UserRole {
    /// A learner receiving coaching.
    Elderly,
    /// A tutor offering coaching slots.
    Volunteer,
    /// A relative following a learner's progress.
    Family,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterestCategory {
    Social,
    Technical,
    SoftSkills,
    Hobbies,
}

/// An entry from the interest catalog (WhatsApp, Email, Reading, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interest {
    pub id: String,
    pub name: String,
    pub category: InterestCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub role: UserRole,
    pub phone: String,
    pub cedula: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    /// Headline topic for volunteers, used as the default booking topic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(default)]
    pub interests: Vec<Interest>,
    #[serde(default)]
    pub skills: Vec<String>,
    /// Slots a volunteer offers. Empty for other roles.
    #[serde(default)]
    pub availability: Vec<TimeSlot>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_volunteer(&self) -> bool {
        self.role == UserRole::Volunteer
    }

    pub fn offers(&self, slot: &TimeSlot) -> bool {
        self.availability.contains(slot)
    }

    /// Merges the permitted fields of `patch` into this user.
    ///
    /// The patch must already be validated.
    pub fn apply_patch(&mut self, patch: ProfilePatch, now: DateTime<Utc>) {
        if let Some(full_name) = patch.full_name {
            self.full_name = full_name.trim().to_string();
        }
        if let Some(phone) = patch.phone {
            self.phone = phone.trim().to_string();
        }
        if let Some(cedula) = patch.cedula {
            self.cedula = cedula.trim().to_string();
        }
        if let Some(profile_image) = patch.profile_image {
            self.profile_image = Some(profile_image).filter(|image| !image.is_empty());
        }
        if let Some(interests) = patch.interests {
            self.interests = interests;
        }
        if let Some(skills) = patch.skills {
            self.skills = skills;
        }
        self.updated_at = now;
    }
}

/// Registration input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub full_name: String,
    pub role: UserRole,
    pub phone: String,
    pub cedula: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub interests: Vec<Interest>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub availability: Vec<TimeSlot>,
}

/// A partial profile update.
///
/// Only these fields are editable; anything else in an incoming document is
/// rejected rather than silently dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfilePatch {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub cedula: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub interests: Option<Vec<Interest>>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
}

impl ProfilePatch {
    /// Parses a patch sent by the display layer as JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| MentorError::validation(format!("Invalid profile patch: {}", e)))
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_strings() {
        assert_eq!(UserRole::Volunteer.to_string(), "volunteer");
        assert_eq!("elderly".parse::<UserRole>().unwrap(), UserRole::Elderly);
        assert!("admin".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_patch_rejects_non_editable_fields() {
        let err = ProfilePatch::from_json(r#"{"role": "volunteer"}"#).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_patch_parses_permitted_fields() {
        let patch = ProfilePatch::from_json(r#"{"full_name": "Juan", "skills": ["Email"]}"#).unwrap();
        assert_eq!(patch.full_name.as_deref(), Some("Juan"));
        assert_eq!(patch.skills, Some(vec!["Email".to_string()]));
        assert!(patch.phone.is_none());
        assert!(!patch.is_empty());
    }
}
