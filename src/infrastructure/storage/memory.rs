//! In-memory storage for development and testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::domain::{
    CreateUserDto, DomainError, DomainResult, SessionRecord, SessionRepositoryInterface,
    UpdateUserDto, User, UserRepositoryInterface,
};

/// Accounts keyed by id.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: DashMap<String, User>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn find_by_username(&self, username: &str) -> Option<User> {
        self.users
            .iter()
            .find(|entry| entry.username == username)
            .map(|entry| entry.value().clone())
    }

    fn taken(&self, username: &str, excluding_id: Option<&str>) -> bool {
        self.users
            .iter()
            .any(|entry| entry.username == username && Some(entry.id.as_str()) != excluding_id)
    }
}

#[async_trait]
impl UserRepositoryInterface for InMemoryUserRepository {
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User> {
        if self.taken(&dto.username, None) {
            return Err(DomainError::Conflict(
                "This username already exists.".to_string(),
            ));
        }

        let now = Utc::now();
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            username: dto.username,
            email: dto.email,
            password_hash: dto.password_hash,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };
        self.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        Ok(self.users.get(id).map(|entry| entry.value().clone()))
    }

    async fn get_user_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        Ok(self.find_by_username(username))
    }

    async fn username_taken(
        &self,
        username: &str,
        excluding_id: Option<&str>,
    ) -> DomainResult<bool> {
        Ok(self.taken(username, excluding_id))
    }

    async fn update_user(&self, id: &str, dto: UpdateUserDto) -> DomainResult<Option<User>> {
        if self.taken(&dto.username, Some(id)) {
            return Err(DomainError::Conflict(
                "This username already exists.".to_string(),
            ));
        }

        let Some(mut entry) = self.users.get_mut(id) else {
            return Ok(None);
        };
        entry.username = dto.username;
        entry.email = dto.email;
        entry.updated_at = Utc::now();
        Ok(Some(entry.value().clone()))
    }

    async fn record_login(&self, id: &str, at: DateTime<Utc>) -> DomainResult<()> {
        let mut entry = self
            .users
            .get_mut(id)
            .ok_or_else(|| DomainError::user_not_found("id", id))?;
        entry.last_login_at = Some(at);
        Ok(())
    }

    async fn delete_user(&self, id: &str) -> DomainResult<()> {
        self.users
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DomainError::user_not_found("id", id))
    }
}

/// Sessions keyed by token hash.
#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: DashMap<String, SessionRecord>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionRepositoryInterface for InMemorySessionRepository {
    async fn get_session(&self, id: &str) -> DomainResult<Option<SessionRecord>> {
        Ok(self.sessions.get(id).map(|entry| entry.value().clone()))
    }

    async fn save_session(&self, record: &SessionRecord) -> DomainResult<()> {
        self.sessions.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn delete_session(&self, id: &str) -> DomainResult<()> {
        self.sessions.remove(id);
        Ok(())
    }

    async fn delete_user_sessions(&self, user_id: &str) -> DomainResult<u64> {
        let mut removed = 0;
        self.sessions.retain(|_, record| {
            let keep = record.user_id.as_deref() != Some(user_id);
            removed += u64::from(!keep);
            keep
        });
        Ok(removed)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> DomainResult<u64> {
        let mut removed = 0;
        self.sessions.retain(|_, record| {
            let keep = !record.is_expired(now);
            removed += u64::from(!keep);
            keep
        });
        Ok(removed)
    }
}
