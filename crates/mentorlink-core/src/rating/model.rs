//! Rating and meeting-history records.

use crate::error::{MentorError, Result};
use crate::session::CompletedSession;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 5;

/// Post-session feedback. One per completed booking, immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub booking_id: String,
    /// Who rated (the learner).
    pub rater_id: String,
    /// Who was rated (the volunteer).
    pub rated_user_id: String,
    pub score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Rating {
    /// Builds a rating for `session`, checking the score range.
    ///
    /// Blank comments are stored as `None`.
    pub fn new(
        session: &CompletedSession,
        score: u8,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        validate_score(score)?;
        Ok(Self {
            booking_id: session.booking_id.clone(),
            rater_id: session.learner_id.clone(),
            rated_user_id: session.volunteer_id.clone(),
            score,
            comment: comment
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            created_at: now,
        })
    }
}

pub fn validate_score(score: u8) -> Result<()> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(MentorError::validation(format!(
            "Score must be between {} and {}, got {}",
            MIN_SCORE, MAX_SCORE, score
        )));
    }
    Ok(())
}

/// An archived session, with or without a rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub booking_id: String,
    pub learner_id: String,
    pub volunteer_id: String,
    pub volunteer_name: String,
    pub topic: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_secs: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub archived_at: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn from_session(
        session: &CompletedSession,
        rating: Option<&Rating>,
        archived_at: DateTime<Utc>,
    ) -> Self {
        Self {
            booking_id: session.booking_id.clone(),
            learner_id: session.learner_id.clone(),
            volunteer_id: session.volunteer_id.clone(),
            volunteer_name: session.volunteer_name.clone(),
            topic: session.topic.clone(),
            date: session.date,
            time: session.time,
            started_at: session.started_at,
            ended_at: session.ended_at,
            duration_secs: session.duration_secs,
            rating: rating.map(|r| r.score),
            comment: rating.and_then(|r| r.comment.clone()),
            description: session.description.clone(),
            notes: session.notes.clone(),
            archived_at,
        }
    }
}

/// Summary figures for a set of history records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total_sessions: usize,
    pub rated_sessions: usize,
    pub average_rating: Option<f64>,
    pub total_duration_secs: i64,
}

impl HistoryStats {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a HistoryRecord>) -> Self {
        let mut total_sessions = 0;
        let mut rated_sessions = 0;
        let mut score_sum = 0u32;
        let mut total_duration_secs = 0;

        for record in records {
            total_sessions += 1;
            total_duration_secs += record.duration_secs;
            if let Some(score) = record.rating {
                rated_sessions += 1;
                score_sum += u32::from(score);
            }
        }

        let average_rating =
            (rated_sessions > 0).then(|| f64::from(score_sum) / rated_sessions as f64);

        Self {
            total_sessions,
            rated_sessions,
            average_rating,
            total_duration_secs,
        }
    }
}
