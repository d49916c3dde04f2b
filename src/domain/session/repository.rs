use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::SessionRecord;
use crate::shared::DomainResult;

#[async_trait]
pub trait SessionRepositoryInterface: Send + Sync {
    async fn get_session(&self, id: &str) -> DomainResult<Option<SessionRecord>>;

    /// Insert or replace the record stored under `record.id`.
    async fn save_session(&self, record: &SessionRecord) -> DomainResult<()>;

    /// Deleting an unknown id is not an error.
    async fn delete_session(&self, id: &str) -> DomainResult<()>;

    /// Drop every session belonging to `user_id`; returns how many were removed.
    async fn delete_user_sessions(&self, user_id: &str) -> DomainResult<u64>;

    async fn delete_expired(&self, now: DateTime<Utc>) -> DomainResult<u64>;
}
