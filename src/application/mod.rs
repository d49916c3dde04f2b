//! Application layer: form validation, access checks, account use-cases
//! and request sessions.

pub mod access;
pub mod forms;
pub mod identity;
pub mod session;

pub use access::{require_anonymous, require_owner, AccessDenied, ACCESS_DENIED};
pub use identity::AccountService;
pub use session::{CookieAction, Session, SessionManager};
