//! Account page handlers
//!
//! Each handler is one straight line: validate, one persistence call,
//! one flash message, then a redirect or a re-rendered form.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};

use super::dto::{NextParams, UserDto};
use crate::application::forms::{
    CleanError, DeleteForm, FormErrors, SignInForm, SignUpForm, UpdateForm, USERNAME_TAKEN,
};
use crate::application::Session;
use crate::domain::{DomainError, FlashMessage, User};
use crate::interfaces::http::common::ValidatedForm;
use crate::interfaces::http::error::WebError;
use crate::interfaces::http::guards::OwnedAccount;
use crate::interfaces::http::render::{
    Page, INDEX_TEMPLATE, SIGN_IN_TEMPLATE, SIGN_UP_TEMPLATE, USER_DELETE_TEMPLATE,
    USER_PAGE_TEMPLATE, USER_UPDATE_TEMPLATE,
};
use crate::interfaces::http::routes::{safe_next, sign_in_with_next, Route, HOME, SIGN_IN};
use crate::interfaces::http::state::AppState;

pub const SIGNED_UP: &str = "Successfully signed up";
pub const SIGNED_IN: &str = "Successfully signed in";
pub const BAD_CREDENTIALS: &str = "Incorrect Username or Password";
pub const SIGNED_OUT: &str = "Successfully signed out";
pub const UPDATED: &str = "Successfully updated account";
pub const DELETED: &str = "Successfully deleted account";
pub const WRONG_CONFIRMATION: &str = "Incorrect Username";

fn redirect(to: &str) -> Response {
    Redirect::to(to).into_response()
}

/// Single-message error set for a username taken between validation and write.
fn username_taken() -> FormErrors {
    let mut errors = FormErrors::default();
    errors.add("username", USERNAME_TAKEN);
    errors
}

pub async fn home(State(state): State<AppState>, session: Session) -> Result<Response, WebError> {
    Page::new(INDEX_TEMPLATE).render(state.renderer.as_ref(), &session)
}

// ── Sign-up ─────────────────────────────────────────────────────

fn sign_up_form(
    state: &AppState,
    session: &Session,
    form: &SignUpForm,
    errors: &FormErrors,
) -> Result<Response, WebError> {
    Page::new(SIGN_UP_TEMPLATE)
        .insert("form", form)?
        .insert("errors", errors)?
        .render(state.renderer.as_ref(), session)
}

pub async fn sign_up_page(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, WebError> {
    sign_up_form(&state, &session, &SignUpForm::default(), &FormErrors::default())
}

pub async fn sign_up(
    State(state): State<AppState>,
    session: Session,
    ValidatedForm { form, errors }: ValidatedForm<SignUpForm>,
) -> Result<Response, WebError> {
    let account = match form.clean(errors, state.accounts.users()).await {
        Ok(account) => account,
        Err(CleanError::Invalid(errors)) => return sign_up_form(&state, &session, &form, &errors),
        Err(CleanError::Domain(e)) => return Err(e.into()),
    };

    match state.accounts.register(account).await {
        Ok(_) => {}
        Err(DomainError::Conflict(_)) => {
            return sign_up_form(&state, &session, &form, &username_taken())
        }
        Err(e) => return Err(e.into()),
    }

    session.push_flash(FlashMessage::success(SIGNED_UP));
    Ok(redirect(SIGN_IN))
}

// ── Sign-in / sign-out ──────────────────────────────────────────

fn sign_in_form(
    state: &AppState,
    session: &Session,
    form: &SignInForm,
    errors: &FormErrors,
    next: Option<&str>,
) -> Result<Response, WebError> {
    Page::new(SIGN_IN_TEMPLATE)
        .insert("form", form)?
        .insert("errors", errors)?
        .insert("next", &next)?
        .render(state.renderer.as_ref(), session)
}

pub async fn sign_in_page(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<NextParams>,
) -> Result<Response, WebError> {
    let next = safe_next(params.next.as_deref());
    sign_in_form(&state, &session, &SignInForm::default(), &FormErrors::default(), next)
}

pub async fn sign_in(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<NextParams>,
    ValidatedForm { form, errors }: ValidatedForm<SignInForm>,
) -> Result<Response, WebError> {
    let next = safe_next(params.next.as_deref());
    if !errors.is_empty() {
        return sign_in_form(&state, &session, &form, &errors, next);
    }

    let Some(user) = state
        .accounts
        .authenticate(&form.username, &form.password)
        .await?
    else {
        session.push_flash(FlashMessage::error(BAD_CREDENTIALS));
        let back = match next {
            Some(next) => sign_in_with_next(next),
            None => SIGN_IN.to_string(),
        };
        return Ok(redirect(&back));
    };

    session.login(&user);
    session.push_flash(FlashMessage::success(SIGNED_IN));
    Ok(redirect(next.unwrap_or(HOME)))
}

pub async fn sign_out(session: Session) -> Response {
    session.logout();
    session.push_flash(FlashMessage::success(SIGNED_OUT));
    redirect(HOME)
}

// ── Profile ─────────────────────────────────────────────────────

pub async fn user_page(
    State(state): State<AppState>,
    session: Session,
    Path(username): Path<String>,
) -> Result<Response, WebError> {
    let profile = state.accounts.profile(&username).await?;
    Page::new(USER_PAGE_TEMPLATE)
        .insert("profile", &UserDto::from(profile))?
        .render(state.renderer.as_ref(), &session)
}

fn update_form(
    state: &AppState,
    session: &Session,
    account: &User,
    form: &UpdateForm,
    errors: &FormErrors,
) -> Result<Response, WebError> {
    Page::new(USER_UPDATE_TEMPLATE)
        .insert("profile", &UserDto::from(account))?
        .insert("form", form)?
        .insert("errors", errors)?
        .render(state.renderer.as_ref(), session)
}

pub async fn update_page(
    State(state): State<AppState>,
    session: Session,
    OwnedAccount(account): OwnedAccount,
) -> Result<Response, WebError> {
    let form = UpdateForm::for_account(&account);
    update_form(&state, &session, &account, &form, &FormErrors::default())
}

pub async fn update(
    State(state): State<AppState>,
    session: Session,
    OwnedAccount(account): OwnedAccount,
    ValidatedForm { form, errors }: ValidatedForm<UpdateForm>,
) -> Result<Response, WebError> {
    let dto = match form.clean(errors, &account, state.accounts.users()).await {
        Ok(dto) => dto,
        Err(CleanError::Invalid(errors)) => {
            return update_form(&state, &session, &account, &form, &errors)
        }
        Err(CleanError::Domain(e)) => return Err(e.into()),
    };

    let updated = match state.accounts.update_profile(&account, dto).await {
        Ok(updated) => updated,
        Err(DomainError::Conflict(_)) => {
            return update_form(&state, &session, &account, &form, &username_taken())
        }
        Err(e) => return Err(e.into()),
    };

    session.push_flash(FlashMessage::success(UPDATED));
    Ok(redirect(&Route::UserPage(&updated.username).path()))
}

// ── Delete ──────────────────────────────────────────────────────

fn delete_form(
    state: &AppState,
    session: &Session,
    account: &User,
    form: &DeleteForm,
    errors: &FormErrors,
) -> Result<Response, WebError> {
    Page::new(USER_DELETE_TEMPLATE)
        .insert("profile", &UserDto::from(account))?
        .insert("form", form)?
        .insert("errors", errors)?
        .render(state.renderer.as_ref(), session)
}

pub async fn delete_page(
    State(state): State<AppState>,
    session: Session,
    OwnedAccount(account): OwnedAccount,
) -> Result<Response, WebError> {
    delete_form(&state, &session, &account, &DeleteForm::default(), &FormErrors::default())
}

pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    OwnedAccount(account): OwnedAccount,
    ValidatedForm { form, errors }: ValidatedForm<DeleteForm>,
) -> Result<Response, WebError> {
    if !errors.is_empty() {
        return delete_form(&state, &session, &account, &form, &errors);
    }
    if !form.confirms(&account) {
        session.push_flash(FlashMessage::error(WRONG_CONFIRMATION));
        return Ok(redirect(&Route::UserDelete(&account.username).path()));
    }

    state.accounts.delete_account(&account).await?;
    session.logout();
    session.push_flash(FlashMessage::success(DELETED));
    Ok(redirect(HOME))
}
