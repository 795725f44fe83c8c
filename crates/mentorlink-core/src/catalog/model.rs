//! Volunteer listing: a read-only projection of a volunteer user.

use crate::rating::HistoryStats;
use crate::slot::TimeSlot;
use crate::user::User;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolunteerListing {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub offered_slots: Vec<TimeSlot>,
    /// Mean score over rated sessions, `None` until the first rating.
    pub rating: Option<f64>,
    /// Number of archived sessions.
    pub sessions: usize,
}

impl VolunteerListing {
    pub fn project(user: &User, stats: &HistoryStats) -> Self {
        let mut offered_slots = user.availability.clone();
        offered_slots.sort();
        Self {
            id: user.id.clone(),
            name: user.full_name.clone(),
            profile_image: user.profile_image.clone(),
            specialty: user.specialty.clone(),
            location: user.location.clone(),
            bio: user.bio.clone(),
            skills: user.skills.clone(),
            offered_slots,
            rating: stats.average_rating,
            sessions: stats.total_sessions,
        }
    }

    pub fn offers(&self, slot: &TimeSlot) -> bool {
        self.offered_slots.contains(slot)
    }

    /// Case-insensitive match on name, specialty or any skill.
    /// A blank query matches everything.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&query)
            || self
                .specialty
                .as_deref()
                .is_some_and(|s| s.to_lowercase().contains(&query))
            || self.skills.iter().any(|s| s.to_lowercase().contains(&query))
    }
}
