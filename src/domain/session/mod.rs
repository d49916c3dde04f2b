//! Session aggregate
//!
//! Server-side session records and the flash messages they carry.

pub mod model;
pub mod repository;

pub use model::{FlashLevel, FlashMessage, SessionRecord};
pub use repository::SessionRepositoryInterface;
