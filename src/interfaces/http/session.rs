//! Session cookie middleware
//!
//! Resolves the session before the handler runs, exposes it to extractors
//! through request extensions and persists it once the response is built.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::error;

use super::error::WebError;
use super::state::AppState;
use crate::application::{CookieAction, Session};

/// Value of cookie `name`, if the request carries one.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = read_cookie(request.headers(), &state.cookie.name);
    let session = match state.sessions.resolve(token.as_deref()).await {
        Ok(session) => session,
        Err(e) => return WebError::from(e).into_response(),
    };
    request.extensions_mut().insert(session.clone());

    let mut response = next.run(request).await;

    let cookie = match state.sessions.commit(&session).await {
        Ok(CookieAction::Keep) => return response,
        Ok(CookieAction::Set(token)) => state.cookie.set(&token),
        Ok(CookieAction::Clear) => state.cookie.clear(),
        Err(e) => {
            error!("Failed to save session: {}", e);
            return WebError::from(e).into_response();
        }
    };
    match cookie {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(e) => error!("Invalid session cookie header: {}", e),
    }
    response
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| WebError::Internal("session middleware is not installed".into()))
    }
}
