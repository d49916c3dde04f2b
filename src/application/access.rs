//! Access checks shared by the HTTP gates.

use thiserror::Error;

use crate::domain::{FlashMessage, User};

pub const ACCESS_DENIED: &str = "Access Denied";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Access Denied")]
pub struct AccessDenied;

impl AccessDenied {
    pub fn flash(&self) -> FlashMessage {
        FlashMessage::error(ACCESS_DENIED)
    }
}

/// Pages for visitors that are not signed in (sign-up, sign-in).
pub fn require_anonymous(current: Option<&User>) -> Result<(), AccessDenied> {
    match current {
        Some(_) => Err(AccessDenied),
        None => Ok(()),
    }
}

/// The caller must be the account being acted on.
pub fn require_owner(current: Option<&User>, target: &User) -> Result<(), AccessDenied> {
    match current {
        Some(user) if user.is_same_account(target) => Ok(()),
        _ => Err(AccessDenied),
    }
}
