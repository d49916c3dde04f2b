//! Domain layer: account and session aggregates with their repository interfaces.

pub mod session;
pub mod user;

pub use session::{FlashLevel, FlashMessage, SessionRecord, SessionRepositoryInterface};
pub use user::{CreateUserDto, UpdateUserDto, User, UserRepositoryInterface};

pub use crate::shared::{DomainError, DomainResult};
