use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{CreateUserDto, UpdateUserDto, User};
use crate::shared::DomainResult;

#[async_trait]
pub trait UserRepositoryInterface: Send + Sync {
    /// Fails with `DomainError::Conflict` when the username is taken.
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User>;

    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> DomainResult<Option<User>>;

    /// Whether any account other than `excluding_id` holds `username`.
    async fn username_taken(&self, username: &str, excluding_id: Option<&str>)
        -> DomainResult<bool>;

    /// Returns `Ok(None)` when no account has this id.
    async fn update_user(&self, id: &str, dto: UpdateUserDto) -> DomainResult<Option<User>>;
    async fn record_login(&self, id: &str, at: DateTime<Utc>) -> DomainResult<()>;
    async fn delete_user(&self, id: &str) -> DomainResult<()>;
}
