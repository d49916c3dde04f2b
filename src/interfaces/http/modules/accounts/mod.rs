//! Accounts module: sign-up, sign-in, sign-out, profile, update, delete

pub mod dto;
pub mod handlers;

#[cfg(test)]
mod tests;

pub use dto::*;
pub use handlers::*;
