//! Account service: application-layer orchestration
//!
//! All account-related business logic lives here. Password hashing runs on
//! the blocking pool since bcrypt is deliberately slow.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::application::forms::NewAccount;
use crate::domain::{
    CreateUserDto, DomainError, DomainResult, SessionRepositoryInterface, UpdateUserDto, User,
    UserRepositoryInterface,
};
use crate::infrastructure::crypto::PasswordHasher;
use crate::shared::InfraError;

pub struct AccountService {
    users: Arc<dyn UserRepositoryInterface>,
    sessions: Arc<dyn SessionRepositoryInterface>,
    hasher: PasswordHasher,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepositoryInterface>,
        sessions: Arc<dyn SessionRepositoryInterface>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            users,
            sessions,
            hasher,
        }
    }

    pub fn users(&self) -> &dyn UserRepositoryInterface {
        self.users.as_ref()
    }

    // ── Registration ────────────────────────────────────────────

    /// Create an account from validated sign-up data.
    pub async fn register(&self, account: NewAccount) -> DomainResult<User> {
        let password_hash = self.hash_password(account.password).await?;
        let user = self
            .users
            .create_user(CreateUserDto {
                username: account.username,
                email: account.email,
                password_hash,
            })
            .await?;

        metrics::counter!("account_events_total", "event" => "sign_up").increment(1);
        info!(user_id = %user.id, username = %user.username, "New account registered");
        Ok(user)
    }

    // ── Authentication ──────────────────────────────────────────

    /// Check credentials. `Ok(None)` means unknown username or wrong password;
    /// the two are not distinguished to the caller.
    pub async fn authenticate(&self, username: &str, password: &str) -> DomainResult<Option<User>> {
        let Some(mut user) = self.users.get_user_by_username(username).await? else {
            // Same bcrypt work as a real check so timing does not reveal usernames.
            self.hash_password(password.to_string()).await?;
            warn!(username, "Sign-in attempt for unknown username");
            metrics::counter!("account_events_total", "event" => "sign_in_failed").increment(1);
            return Ok(None);
        };

        if !self.verify_password(password, &user).await? {
            warn!(user_id = %user.id, username = %user.username, "Sign-in with wrong password");
            metrics::counter!("account_events_total", "event" => "sign_in_failed").increment(1);
            return Ok(None);
        }

        let now = Utc::now();
        self.users.record_login(&user.id, now).await?;
        user.last_login_at = Some(now);

        metrics::counter!("account_events_total", "event" => "sign_in").increment(1);
        info!(user_id = %user.id, username = %user.username, "User signed in");
        Ok(Some(user))
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Public profile lookup; unknown usernames are `NotFound`.
    pub async fn profile(&self, username: &str) -> DomainResult<User> {
        self.users
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| DomainError::user_not_found("username", username))
    }

    // ── Mutations ───────────────────────────────────────────────

    pub async fn update_profile(&self, account: &User, dto: UpdateUserDto) -> DomainResult<User> {
        let updated = self
            .users
            .update_user(&account.id, dto)
            .await?
            .ok_or_else(|| DomainError::user_not_found("id", account.id.clone()))?;

        metrics::counter!("account_events_total", "event" => "update").increment(1);
        info!(
            user_id = %updated.id,
            old_username = %account.username,
            username = %updated.username,
            "Account updated"
        );
        Ok(updated)
    }

    /// Remove the account and every session signed in as it.
    pub async fn delete_account(&self, account: &User) -> DomainResult<()> {
        // Sessions go first: the database would only null their user_id.
        let dropped = self.sessions.delete_user_sessions(&account.id).await?;
        self.users.delete_user(&account.id).await?;

        metrics::counter!("account_events_total", "event" => "delete").increment(1);
        info!(
            user_id = %account.id,
            username = %account.username,
            sessions = dropped,
            "Account deleted"
        );
        Ok(())
    }

    async fn hash_password(&self, password: String) -> DomainResult<String> {
        let hasher = self.hasher;
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| InfraError::Crypto(e.to_string()))?
            .map_err(|e| InfraError::Crypto(e.to_string()).into())
    }

    async fn verify_password(&self, password: &str, user: &User) -> DomainResult<bool> {
        let hasher = self.hasher;
        let password = password.to_string();
        let hash = user.password_hash.clone();
        let result = tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| InfraError::Crypto(e.to_string()))?;

        match result {
            Ok(valid) => Ok(valid),
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "Stored password hash is unreadable");
                Ok(false)
            }
        }
    }
}
