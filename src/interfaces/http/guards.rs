//! Access gates as route middleware
//!
//! Stack order on a route: `login_required` outermost, then `owner_required`.

use axum::extract::{FromRequestParts, Path, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::warn;

use super::error::WebError;
use super::routes::{sign_in_with_next, HOME};
use super::state::AppState;
use crate::application::{require_anonymous, require_owner, Session};
use crate::domain::User;

/// Signed-in callers are sent home with "Access Denied".
pub async fn anonymous_required(session: Session, request: Request, next: Next) -> Response {
    let current = session.user();
    if let Err(denied) = require_anonymous(current.as_ref()) {
        session.push_flash(denied.flash());
        return Redirect::to(HOME).into_response();
    }
    next.run(request).await
}

/// Anonymous callers are sent to sign-in, coming back here afterwards.
pub async fn login_required(session: Session, request: Request, next: Next) -> Response {
    if session.is_authenticated() {
        return next.run(request).await;
    }
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or(HOME);
    Redirect::to(&sign_in_with_next(target)).into_response()
}

/// Resolves `{username}` and lets only its owner through. The account is
/// handed to the handler as [`OwnedAccount`].
pub async fn owner_required(
    State(state): State<AppState>,
    session: Session,
    Path(username): Path<String>,
    mut request: Request,
    next: Next,
) -> Result<Response, WebError> {
    let target = state.accounts.profile(&username).await?;
    let current = session.user();
    if let Err(denied) = require_owner(current.as_ref(), &target) {
        warn!(
            caller = current.as_ref().map(|u| u.username.as_str()).unwrap_or("-"),
            target = %target.username,
            "Access denied to another account"
        );
        session.push_flash(denied.flash());
        return Ok(Redirect::to(HOME).into_response());
    }
    request.extensions_mut().insert(OwnedAccount(target));
    Ok(next.run(request).await)
}

/// Account the caller was verified to own.
#[derive(Debug, Clone)]
pub struct OwnedAccount(pub User);

impl<S> FromRequestParts<S> for OwnedAccount
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<OwnedAccount>()
            .cloned()
            .ok_or_else(|| WebError::Internal("owner gate is not installed".into()))
    }
}
