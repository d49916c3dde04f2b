//! Request sessions
//!
//! A [`Session`] is the per-request view of a server-side [`SessionRecord`]:
//! who is signed in and which flash messages are pending. Handlers mutate it
//! freely; [`SessionManager::commit`] writes the result back once the
//! response is ready and tells the HTTP layer what to do with the cookie.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{Duration, Utc};
use tracing::debug;

use crate::domain::{
    DomainResult, FlashMessage, SessionRecord, SessionRepositoryInterface, User,
    UserRepositoryInterface,
};
use crate::infrastructure::crypto::{generate_session_token, hash_session_token};

/// What the response must do with the session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieAction {
    Keep,
    Set(String),
    Clear,
}

#[derive(Debug)]
struct SessionState {
    /// Id of the stored record this session was loaded from.
    stored_id: Option<String>,
    record: SessionRecord,
    user: Option<User>,
    modified: bool,
    /// Login and logout move the session to a new token.
    cycle: bool,
    /// The request carried a token that no longer maps to a live record.
    stale_cookie: bool,
}

/// Shared handle to the current request's session.
#[derive(Debug, Clone)]
pub struct Session {
    state: Arc<Mutex<SessionState>>,
}

impl Session {
    fn from_state(state: SessionState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn fresh(ttl: Duration, stale_cookie: bool) -> Self {
        Self::from_state(SessionState {
            stored_id: None,
            record: SessionRecord::new(String::new(), ttl),
            user: None,
            modified: false,
            cycle: false,
            stale_cookie,
        })
    }

    /// Session with nobody signed in and nothing stored.
    pub fn anonymous() -> Self {
        Self::fresh(Duration::zero(), false)
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn user(&self) -> Option<User> {
        self.state().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().user.is_some()
    }

    /// Sign `user` in. Pending flash messages survive the token change.
    pub fn login(&self, user: &User) {
        let mut state = self.state();
        state.record.user_id = Some(user.id.clone());
        state.user = Some(user.clone());
        state.modified = true;
        state.cycle = true;
    }

    /// Sign out and discard everything the session held.
    pub fn logout(&self) {
        let mut state = self.state();
        state.record.user_id = None;
        state.record.flashes.clear();
        state.user = None;
        state.modified = true;
        state.cycle = true;
    }

    pub fn push_flash(&self, message: FlashMessage) {
        let mut state = self.state();
        state.record.flashes.push(message);
        state.modified = true;
    }

    /// Drain pending flash messages; each is handed out once.
    pub fn take_flashes(&self) -> Vec<FlashMessage> {
        let mut state = self.state();
        if state.record.flashes.is_empty() {
            return Vec::new();
        }
        state.modified = true;
        std::mem::take(&mut state.record.flashes)
    }
}

/// Loads sessions from cookie tokens and persists them after each request.
pub struct SessionManager {
    sessions: Arc<dyn SessionRepositoryInterface>,
    users: Arc<dyn UserRepositoryInterface>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(
        sessions: Arc<dyn SessionRepositoryInterface>,
        users: Arc<dyn UserRepositoryInterface>,
        ttl: Duration,
    ) -> Self {
        Self {
            sessions,
            users,
            ttl,
        }
    }

    /// Session for a request carrying `token` (the raw cookie value).
    pub async fn resolve(&self, token: Option<&str>) -> DomainResult<Session> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(Session::fresh(self.ttl, false));
        };

        let id = hash_session_token(token);
        let Some(record) = self.sessions.get_session(&id).await? else {
            return Ok(Session::fresh(self.ttl, true));
        };

        if record.is_expired(Utc::now()) {
            debug!("Session expired");
            self.sessions.delete_session(&id).await?;
            return Ok(Session::fresh(self.ttl, true));
        }

        let mut modified = false;
        let mut record = record;
        let user = match record.user_id.as_deref() {
            Some(user_id) => {
                let user = self.users.get_user_by_id(user_id).await?;
                if user.is_none() {
                    record.user_id = None;
                    modified = true;
                }
                user
            }
            None => None,
        };

        Ok(Session::from_state(SessionState {
            stored_id: Some(id),
            record,
            user,
            modified,
            cycle: false,
            stale_cookie: false,
        }))
    }

    /// Persist `session` and report the cookie change the response needs.
    pub async fn commit(&self, session: &Session) -> DomainResult<CookieAction> {
        let (stored_id, mut record, cycle, stale_cookie) = {
            let mut state = session.state();
            if !state.modified {
                return Ok(if state.stale_cookie {
                    CookieAction::Clear
                } else {
                    CookieAction::Keep
                });
            }
            state.modified = false;
            (
                state.stored_id.clone(),
                state.record.clone(),
                state.cycle,
                state.stale_cookie,
            )
        };

        if record.is_empty() {
            if let Some(id) = &stored_id {
                self.sessions.delete_session(id).await?;
            }
            let mut state = session.state();
            state.stored_id = None;
            state.cycle = false;
            return Ok(if stored_id.is_some() || stale_cookie {
                CookieAction::Clear
            } else {
                CookieAction::Keep
            });
        }

        if let (Some(id), false) = (&stored_id, cycle) {
            self.sessions.save_session(&record).await?;
            debug!(session = %id, "Session saved");
            return Ok(CookieAction::Keep);
        }

        let token = generate_session_token()?;
        let now = Utc::now();
        record.id = hash_session_token(&token);
        record.created_at = now;
        record.expires_at = now + self.ttl;
        self.sessions.save_session(&record).await?;
        if let Some(old) = &stored_id {
            self.sessions.delete_session(old).await?;
        }

        let mut state = session.state();
        state.stored_id = Some(record.id.clone());
        state.record.id = record.id;
        state.record.created_at = record.created_at;
        state.record.expires_at = record.expires_at;
        state.cycle = false;
        state.stale_cookie = false;
        Ok(CookieAction::Set(token))
    }

    /// Remove every expired record; run at start-up.
    pub async fn purge_expired(&self) -> DomainResult<u64> {
        self.sessions.delete_expired(Utc::now()).await
    }
}
