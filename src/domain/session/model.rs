use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a flash message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

/// One-shot notice shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub text: String,
    /// Presentation tag for the template (`info` / `danger`).
    pub tags: String,
}

impl FlashMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            text: text.into(),
            tags: "info".to_string(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            text: text.into(),
            tags: "danger".to_string(),
        }
    }
}

/// Persisted session state.
///
/// `id` is the hex SHA-256 of the cookie token; the raw token is never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: String,
    pub user_id: Option<String>,
    pub flashes: Vec<FlashMessage>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(id: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            user_id: None,
            flashes: Vec::new(),
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Nothing worth persisting: anonymous and no pending messages.
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.flashes.is_empty()
    }
}
