//! Account DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::User;

/// Account as exposed to templates. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserDto {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            created_at: u.created_at,
            updated_at: u.updated_at,
            last_login_at: u.last_login_at,
        }
    }
}

impl From<&User> for UserDto {
    fn from(u: &User) -> Self {
        Self::from(u.clone())
    }
}

/// `?next=` carried through the sign-in flow.
#[derive(Debug, Default, Deserialize)]
pub struct NextParams {
    pub next: Option<String>,
}
