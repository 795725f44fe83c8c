//! Conversation thread and message types.

use crate::error::{MentorError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A two-party thread, keyed by the unordered pair of participant ids.
///
/// A thread opened during a call belongs to that call's booking instead and
/// is kept apart from the pair's direct thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    /// Participant ids in ascending order.
    pub participants: [String; 2],
    /// Set for an in-call thread.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message_sender_id: Option<String>,
    /// Unread message count per participant id.
    #[serde(default)]
    pub unread: BTreeMap<String, u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Normalizes a pair of user ids so `(a, b)` and `(b, a)` map to the same key.
pub fn participant_key(user_a: &str, user_b: &str) -> [String; 2] {
    if user_a <= user_b {
        [user_a.to_string(), user_b.to_string()]
    } else {
        [user_b.to_string(), user_a.to_string()]
    }
}

pub fn session_conversation_id(booking_id: &str) -> String {
    format!("session-{}", booking_id)
}

impl Conversation {
    pub fn new(user_a: &str, user_b: &str, now: DateTime<Utc>) -> Result<Self> {
        if user_a.trim().is_empty() || user_b.trim().is_empty() {
            return Err(MentorError::validation("Participant id must not be empty"));
        }
        if user_a == user_b {
            return Err(MentorError::validation(
                "A conversation needs two distinct participants",
            ));
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            participants: participant_key(user_a, user_b),
            booking_id: None,
            last_message: None,
            last_message_time: None,
            last_message_sender_id: None,
            unread: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// The in-call thread of `booking_id`. Its id is derived from the
    /// booking, so every caller opens the same thread.
    pub fn for_session(
        booking_id: &str,
        learner_id: &str,
        volunteer_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let mut conversation = Self::new(learner_id, volunteer_id, now)?;
        conversation.id = session_conversation_id(booking_id);
        conversation.booking_id = Some(booking_id.to_string());
        Ok(conversation)
    }

    pub fn is_session_thread(&self) -> bool {
        self.booking_id.is_some()
    }

    pub fn has_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p == user_id)
    }

    pub fn other_participant(&self, user_id: &str) -> Option<&str> {
        match &self.participants {
            [a, b] if a == user_id => Some(b.as_str()),
            [a, b] if b == user_id => Some(a.as_str()),
            _ => None,
        }
    }

    /// Time of the last message, or creation time for an empty thread.
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_message_time.unwrap_or(self.created_at)
    }

    pub fn unread_for(&self, user_id: &str) -> u32 {
        self.unread.get(user_id).copied().unwrap_or(0)
    }

    /// Updates the denormalized last-message fields and the recipient's
    /// unread counter for a newly appended message.
    pub fn record_message(&mut self, message: &Message) {
        self.last_message = Some(message.text.clone());
        self.last_message_time = Some(message.timestamp);
        self.last_message_sender_id = Some(message.sender_id.clone());
        if let Some(recipient) = self.other_participant(&message.sender_id).map(str::to_string) {
            *self.unread.entry(recipient).or_insert(0) += 1;
        }
        self.updated_at = message.timestamp;
    }

    pub fn mark_read(&mut self, reader_id: &str, now: DateTime<Utc>) {
        self.unread.remove(reader_id);
        self.updated_at = now;
    }
}

/// A single chat message. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Creates a message, trimming `text` and rejecting it if nothing remains.
    pub fn new(
        conversation_id: &str,
        sender_id: &str,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(MentorError::validation("Message text must not be empty"));
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            conversation_id: conversation_id.to_string(),
            sender_id: sender_id.to_string(),
            text: text.to_string(),
            timestamp,
        })
    }
}
