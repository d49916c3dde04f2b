//! Shared handler state

use std::sync::Arc;

use axum::http::header::InvalidHeaderValue;
use axum::http::HeaderValue;

use super::render::TemplateRenderer;
use crate::application::{AccountService, SessionManager};

/// Session cookie attributes.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    pub name: String,
    pub max_age_seconds: i64,
    pub secure: bool,
}

impl SessionCookie {
    /// `HttpOnly` cookie carrying the raw session token.
    pub fn set(&self, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.name, token, self.max_age_seconds
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }

    pub fn clear(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie = format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", self.name);
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub sessions: Arc<SessionManager>,
    pub renderer: Arc<dyn TemplateRenderer>,
    pub cookie: SessionCookie,
}
