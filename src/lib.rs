//! # Account Portal
//!
//! Server-rendered user-account lifecycle: sign-up, sign-in, sign-out,
//! profile view, profile update and account deletion.
//!
//! ## Architecture
//!
//! - **domain**: account and session aggregates, repository interfaces
//! - **application**: form validation, access checks, account service, sessions
//! - **infrastructure**: SeaORM persistence, in-memory storage, crypto
//! - **interfaces**: axum router, session middleware, gates and page handlers
//! - **shared**: error types and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod shared;

pub use config::{config_path, default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig};

// Re-export the HTTP entry points
pub use interfaces::http::{create_app, create_router, AppState};
