//! Database entities module

pub mod session;
pub mod user;

pub use session::Entity as Session;
pub use user::Entity as User;
