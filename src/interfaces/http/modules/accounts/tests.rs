//! Router-level tests for the account pages, driven through `oneshot`
//! with in-memory repositories.

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chrono::Duration;
use serde_json::Value;
use tower::ServiceExt;

use super::handlers::*;
use crate::application::forms::{
    PASSWORDS_MISMATCH, REQUIRED, USERNAME_PATTERN_MESSAGE, USERNAME_TAKEN,
};
use crate::application::{AccountService, SessionManager, ACCESS_DENIED};
use crate::domain::{SessionRepositoryInterface, UserRepositoryInterface};
use crate::infrastructure::crypto::{hash_session_token, PasswordHasher};
use crate::infrastructure::{InMemorySessionRepository, InMemoryUserRepository};
use crate::interfaces::http::render::{SIGN_UP_TEMPLATE, USER_PAGE_TEMPLATE, USER_UPDATE_TEMPLATE};
use crate::interfaces::http::{create_router, AppState, JsonPageRenderer, SessionCookie};

const COOKIE_NAME: &str = "sessionid";

struct Harness {
    router: Router,
    users: Arc<InMemoryUserRepository>,
    sessions: Arc<InMemorySessionRepository>,
}

fn harness() -> Harness {
    let users = Arc::new(InMemoryUserRepository::new());
    let sessions = Arc::new(InMemorySessionRepository::new());
    let state = AppState {
        accounts: Arc::new(AccountService::new(
            users.clone(),
            sessions.clone(),
            PasswordHasher::new(4),
        )),
        sessions: Arc::new(SessionManager::new(
            sessions.clone(),
            users.clone(),
            Duration::hours(1),
        )),
        renderer: Arc::new(JsonPageRenderer),
        cookie: SessionCookie {
            name: COOKIE_NAME.into(),
            max_age_seconds: 3600,
            secure: false,
        },
    };
    Harness {
        router: create_router(state),
        users,
        sessions,
    }
}

/// Browser stand-in that keeps the session cookie between requests.
struct Client {
    router: Router,
    token: Option<String>,
}

impl Client {
    fn new(harness: &Harness) -> Self {
        Self {
            router: harness.router.clone(),
            token: None,
        }
    }

    async fn send(&mut self, mut builder: axum::http::request::Builder, body: Body) -> Response {
        if let Some(token) = &self.token {
            builder = builder.header(COOKIE, format!("{COOKIE_NAME}={token}"));
        }
        let resp = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        if let Some(cookie) = resp.headers().get(SET_COOKIE) {
            let pair = cookie.to_str().unwrap().split(';').next().unwrap();
            let value = pair.strip_prefix(&format!("{COOKIE_NAME}=")).unwrap();
            self.token = (!value.is_empty()).then(|| value.to_string());
        }
        resp
    }

    async fn get(&mut self, uri: &str) -> Response {
        self.send(Request::builder().uri(uri), Body::empty()).await
    }

    async fn post(&mut self, uri: &str, fields: &[(&str, &str)]) -> Response {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send(builder, Body::from(body)).await
    }

    async fn sign_up(&mut self, username: &str, password: &str) -> Response {
        self.post(
            "/accounts/sign-up/",
            &[
                ("username", username),
                ("email", &format!("{username}@example.com")),
                ("password1", password),
                ("password2", password),
            ],
        )
        .await
    }

    async fn sign_in(&mut self, username: &str, password: &str) -> Response {
        self.post(
            "/accounts/sign-in/",
            &[("username", username), ("password", password)],
        )
        .await
    }

    /// Sign up and sign in, then drop the pending flashes.
    async fn signed_in(harness: &Harness, username: &str) -> Self {
        let mut client = Self::new(harness);
        client.sign_up(username, "pw-secret").await;
        let resp = client.sign_in(username, "pw-secret").await;
        assert_eq!(location(&resp), "/");
        client.get("/").await;
        client
    }

    /// Flash texts shown on the home page (consuming them).
    async fn messages(&mut self) -> Vec<String> {
        let page = page(self.get("/").await).await;
        page["context"]["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["text"].as_str().unwrap().to_string())
            .collect()
    }
}

fn location(resp: &Response) -> String {
    assert_eq!(resp.status(), StatusCode::SEE_OTHER, "expected a redirect");
    resp.headers()[LOCATION].to_str().unwrap().to_string()
}

async fn page(resp: Response) -> Value {
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ── Sign-up ─────────────────────────────────────────────────────

#[tokio::test]
async fn sign_up_then_sign_in_creates_a_session() {
    let h = harness();
    let mut client = Client::new(&h);

    let resp = client.sign_up("alice", "pw-secret").await;
    assert_eq!(location(&resp), "/accounts/sign-in/");

    let sign_in = page(client.get("/accounts/sign-in/").await).await;
    assert_eq!(sign_in["context"]["messages"][0]["text"], SIGNED_UP);
    assert_eq!(sign_in["context"]["messages"][0]["tags"], "info");

    let resp = client.sign_in("alice", "pw-secret").await;
    assert_eq!(location(&resp), "/");

    let home = page(client.get("/").await).await;
    assert_eq!(home["context"]["user"]["username"], "alice");
    assert!(home["context"]["user"].get("password_hash").is_none());
    assert_eq!(home["context"]["messages"][0]["text"], SIGNED_IN);

    let token = client.token.clone().unwrap();
    let record = h
        .sessions
        .get_session(&hash_session_token(&token))
        .await
        .unwrap()
        .unwrap();
    assert!(record.user_id.is_some());
}

#[tokio::test]
async fn uppercase_username_is_rejected() {
    let h = harness();
    let mut client = Client::new(&h);

    let form = page(client.sign_up("Alice", "pw").await).await;
    assert_eq!(form["template"], SIGN_UP_TEMPLATE);
    assert_eq!(
        form["context"]["errors"]["fields"]["username"][0],
        USERNAME_PATTERN_MESSAGE
    );
    assert!(h.users.get_user_by_username("Alice").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let h = harness();
    let mut client = Client::new(&h);
    client.sign_up("alice", "pw").await;

    let form = page(client.sign_up("alice", "other").await).await;
    assert_eq!(form["context"]["errors"]["fields"]["username"][0], USERNAME_TAKEN);
}

#[tokio::test]
async fn mismatched_passwords_are_rejected_and_not_echoed() {
    let h = harness();
    let mut client = Client::new(&h);

    let resp = client
        .post(
            "/accounts/sign-up/",
            &[
                ("username", "alice"),
                ("email", "alice@example.com"),
                ("password1", "one"),
                ("password2", "two"),
            ],
        )
        .await;
    let form = page(resp).await;
    assert_eq!(form["context"]["errors"]["non_field"][0], PASSWORDS_MISMATCH);
    assert_eq!(form["context"]["form"]["username"], "alice");
    assert!(form["context"]["form"].get("password1").is_none());
    assert!(h.users.get_user_by_username("alice").await.unwrap().is_none());
}

#[tokio::test]
async fn whitespace_only_password_is_rejected() {
    let h = harness();
    let mut client = Client::new(&h);

    let form = page(client.sign_up("alice", "   ").await).await;
    assert_eq!(form["template"], SIGN_UP_TEMPLATE);
    assert_eq!(form["context"]["errors"]["fields"]["password1"][0], REQUIRED);
    assert_eq!(form["context"]["errors"]["fields"]["password2"][0], REQUIRED);
    assert!(h.users.get_user_by_username("alice").await.unwrap().is_none());
}

#[tokio::test]
async fn non_form_body_is_a_bad_request() {
    let h = harness();
    let mut client = Client::new(&h);
    let builder = Request::builder()
        .method("POST")
        .uri("/accounts/sign-up/")
        .header(CONTENT_TYPE, "application/json");
    let resp = client.send(builder, Body::from("{}")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ── Gates ───────────────────────────────────────────────────────

#[tokio::test]
async fn signed_in_user_is_turned_away_from_sign_up_and_sign_in() {
    let h = harness();
    let mut client = Client::signed_in(&h, "alice").await;

    for uri in ["/accounts/sign-up/", "/accounts/sign-in/"] {
        let resp = client.get(uri).await;
        assert_eq!(location(&resp), "/");
        assert_eq!(client.messages().await, vec![ACCESS_DENIED]);
    }
}

#[tokio::test]
async fn anonymous_visitor_is_sent_to_sign_in_with_next() {
    let h = harness();
    let mut client = Client::new(&h);

    let resp = client.get("/accounts/alice/update/").await;
    assert_eq!(
        location(&resp),
        "/accounts/sign-in/?next=%2Faccounts%2Falice%2Fupdate%2F"
    );
    let resp = client.get("/accounts/sign-out/").await;
    assert!(location(&resp).starts_with("/accounts/sign-in/?next="));
    let resp = client.get("/accounts/alice/").await;
    assert!(location(&resp).starts_with("/accounts/sign-in/?next="));
}

#[tokio::test]
async fn sign_in_returns_to_next() {
    let h = harness();
    let mut client = Client::new(&h);
    client.sign_up("alice", "pw").await;

    let resp = client
        .post(
            "/accounts/sign-in/?next=%2Faccounts%2Falice%2F",
            &[("username", "alice"), ("password", "pw")],
        )
        .await;
    assert_eq!(location(&resp), "/accounts/alice/");

    let mut other = Client::new(&h);
    let resp = other
        .post(
            "/accounts/sign-in/?next=https%3A%2F%2Fevil.example",
            &[("username", "alice"), ("password", "pw")],
        )
        .await;
    assert_eq!(location(&resp), "/");
}

#[tokio::test]
async fn next_with_control_characters_goes_home() {
    let h = harness();
    let mut client = Client::new(&h);
    client.sign_up("alice", "pw").await;

    let resp = client
        .post(
            "/accounts/sign-in/?next=%2F%09%2Fevil.example",
            &[("username", "alice"), ("password", "pw")],
        )
        .await;
    assert_eq!(location(&resp), "/");
}

#[tokio::test]
async fn long_passwords_are_compared_in_full() {
    let h = harness();
    let mut client = Client::new(&h);
    let stem = "a".repeat(72);
    client.sign_up("alice", &format!("{stem}X")).await;

    let resp = client.sign_in("alice", &format!("{stem}DIFFERENT")).await;
    assert_eq!(location(&resp), "/accounts/sign-in/");
    let home = page(client.get("/").await).await;
    assert_eq!(home["context"]["user"], Value::Null);

    let resp = client.sign_in("alice", &format!("{stem}X")).await;
    assert_eq!(location(&resp), "/");
}

#[tokio::test]
async fn wrong_password_flashes_an_error() {
    let h = harness();
    let mut client = Client::new(&h);
    client.sign_up("alice", "pw").await;

    let resp = client.sign_in("alice", "nope").await;
    assert_eq!(location(&resp), "/accounts/sign-in/");

    let sign_in = page(client.get("/accounts/sign-in/").await).await;
    let messages = sign_in["context"]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1]["text"], BAD_CREDENTIALS);
    assert_eq!(messages[1]["tags"], "danger");
    assert_eq!(sign_in["context"]["user"], Value::Null);
}

#[tokio::test]
async fn non_owner_cannot_update_or_delete() {
    let h = harness();
    let mut alice = Client::signed_in(&h, "alice").await;
    let _bob = Client::signed_in(&h, "bob").await;

    let resp = alice.get("/accounts/bob/update/").await;
    assert_eq!(location(&resp), "/");
    assert_eq!(alice.messages().await, vec![ACCESS_DENIED]);

    let resp = alice
        .post("/accounts/bob/delete/", &[("username", "bob")])
        .await;
    assert_eq!(location(&resp), "/");
    assert_eq!(alice.messages().await, vec![ACCESS_DENIED]);
    assert!(h.users.get_user_by_username("bob").await.unwrap().is_some());
}

#[tokio::test]
async fn unknown_accounts_are_not_found() {
    let h = harness();
    let mut client = Client::signed_in(&h, "alice").await;

    assert_eq!(client.get("/accounts/ghost/").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        client.get("/accounts/ghost/update/").await.status(),
        StatusCode::NOT_FOUND
    );
}

// ── Session lifecycle ───────────────────────────────────────────

#[tokio::test]
async fn sign_out_clears_authentication() {
    let h = harness();
    let mut client = Client::signed_in(&h, "alice").await;
    let before = client.token.clone().unwrap();

    let resp = client.get("/accounts/sign-out/").await;
    assert_eq!(location(&resp), "/");

    let home = page(client.get("/").await).await;
    assert_eq!(home["context"]["user"], Value::Null);
    assert_eq!(home["context"]["messages"][0]["text"], SIGNED_OUT);
    assert!(h
        .sessions
        .get_session(&hash_session_token(&before))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn flash_messages_are_shown_once() {
    let h = harness();
    let mut client = Client::new(&h);
    client.sign_up("alice", "pw").await;

    assert_eq!(client.messages().await, vec![SIGNED_UP]);
    assert!(client.messages().await.is_empty());
}

#[tokio::test]
async fn session_token_is_stored_hashed_and_rotated_on_login() {
    let h = harness();
    let mut client = Client::new(&h);
    client.sign_up("alice", "pw").await;
    let anonymous = client.token.clone().expect("flash needs a session");

    client.sign_in("alice", "pw").await;
    let signed_in = client.token.clone().unwrap();
    assert_ne!(anonymous, signed_in);

    assert!(h.sessions.get_session(&signed_in).await.unwrap().is_none());
    assert!(h
        .sessions
        .get_session(&hash_session_token(&signed_in))
        .await
        .unwrap()
        .is_some());
    assert!(h
        .sessions
        .get_session(&hash_session_token(&anonymous))
        .await
        .unwrap()
        .is_none());
}

// ── Profile ─────────────────────────────────────────────────────

#[tokio::test]
async fn profile_page_shows_the_account() {
    let h = harness();
    let mut alice = Client::signed_in(&h, "alice").await;
    let _bob = Client::signed_in(&h, "bob").await;

    let profile = page(alice.get("/accounts/bob/").await).await;
    assert_eq!(profile["template"], USER_PAGE_TEMPLATE);
    assert_eq!(profile["context"]["profile"]["username"], "bob");
    assert_eq!(profile["context"]["user"]["username"], "alice");
}

#[tokio::test]
async fn update_form_is_prefilled() {
    let h = harness();
    let mut client = Client::signed_in(&h, "alice").await;

    let form = page(client.get("/accounts/alice/update/").await).await;
    assert_eq!(form["template"], USER_UPDATE_TEMPLATE);
    assert_eq!(form["context"]["form"]["username"], "alice");
    assert_eq!(form["context"]["form"]["email"], "alice@example.com");
}

#[tokio::test]
async fn update_keeping_own_username_succeeds() {
    let h = harness();
    let mut client = Client::signed_in(&h, "alice").await;

    let resp = client
        .post(
            "/accounts/alice/update/",
            &[("username", "alice"), ("email", "new@example.com")],
        )
        .await;
    assert_eq!(location(&resp), "/accounts/alice/");
    assert_eq!(client.messages().await, vec![UPDATED]);

    let stored = h.users.get_user_by_username("alice").await.unwrap().unwrap();
    assert_eq!(stored.email, "new@example.com");
}

#[tokio::test]
async fn update_to_another_accounts_username_is_rejected() {
    let h = harness();
    let mut alice = Client::signed_in(&h, "alice").await;
    let _bob = Client::signed_in(&h, "bob").await;

    let resp = alice
        .post(
            "/accounts/alice/update/",
            &[("username", "bob"), ("email", "alice@example.com")],
        )
        .await;
    let form = page(resp).await;
    assert_eq!(form["context"]["errors"]["fields"]["username"][0], USERNAME_TAKEN);
    assert_eq!(form["context"]["form"]["username"], "bob");
}

#[tokio::test]
async fn rename_redirects_to_new_profile() {
    let h = harness();
    let mut client = Client::signed_in(&h, "alice").await;

    let resp = client
        .post(
            "/accounts/alice/update/",
            &[("username", "alice.v2"), ("email", "alice@example.com")],
        )
        .await;
    assert_eq!(location(&resp), "/accounts/alice.v2/");

    let home = page(client.get("/").await).await;
    assert_eq!(home["context"]["user"]["username"], "alice.v2");
    assert_eq!(
        client.get("/accounts/alice.v2/update/").await.status(),
        StatusCode::OK
    );
}

// ── Delete ──────────────────────────────────────────────────────

#[tokio::test]
async fn delete_requires_exact_username() {
    let h = harness();
    let mut client = Client::signed_in(&h, "alice").await;

    let resp = client
        .post("/accounts/alice/delete/", &[("username", "Alice")])
        .await;
    assert_eq!(location(&resp), "/accounts/alice/delete/");

    let form = page(client.get("/accounts/alice/delete/").await).await;
    assert_eq!(form["context"]["messages"][0]["text"], WRONG_CONFIRMATION);
    assert_eq!(form["context"]["messages"][0]["tags"], "danger");
    assert!(h.users.get_user_by_username("alice").await.unwrap().is_some());
}

#[tokio::test]
async fn delete_removes_account_and_signs_out() {
    let h = harness();
    let mut client = Client::signed_in(&h, "alice").await;

    let resp = client
        .post("/accounts/alice/delete/", &[("username", "alice")])
        .await;
    assert_eq!(location(&resp), "/");

    let home = page(client.get("/").await).await;
    assert_eq!(home["context"]["user"], Value::Null);
    assert_eq!(home["context"]["messages"][0]["text"], DELETED);
    assert!(h.users.get_user_by_username("alice").await.unwrap().is_none());

    let resp = client.sign_in("alice", "pw-secret").await;
    assert_eq!(location(&resp), "/accounts/sign-in/");
}
