use chrono::{DateTime, Utc};

/// User account
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Two handles refer to the same account when their ids match,
    /// regardless of how stale either copy is.
    pub fn is_same_account(&self, other: &User) -> bool {
        self.id == other.id
    }
}
