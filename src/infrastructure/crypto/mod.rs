//! Password hashing and session token helpers

pub mod password;
pub mod token;

pub use password::PasswordHasher;
pub use token::{generate_session_token, hash_session_token};
