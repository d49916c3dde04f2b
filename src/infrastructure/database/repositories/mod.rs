//! SeaORM repository implementations

pub mod session_repository;
pub mod user_repository;

pub use session_repository::SessionRepository;
pub use user_repository::UserRepository;
