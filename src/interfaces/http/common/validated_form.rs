//! Validated form extractor for Axum
//!
//! `ValidatedForm<T>` works like `axum::Form<T>`, but additionally runs
//! [`validate_form`] on the deserialized value. Unlike a JSON API the page
//! handlers need the submitted values back to re-render the form, so field
//! errors do not reject the request: they are handed to the handler next to
//! the form. Only an unreadable body is rejected, with 400.

use axum::extract::{FromRequest, Request};
use axum::Form;
use serde::de::DeserializeOwned;

use crate::application::forms::{validate_form, FormErrors, FormFields};
use crate::interfaces::http::error::WebError;

pub struct ValidatedForm<T> {
    pub form: T,
    pub errors: FormErrors,
}

impl<S, T> FromRequest<S> for ValidatedForm<T>
where
    T: DeserializeOwned + FormFields,
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(mut form) = Form::<T>::from_request(req, state)
            .await
            .map_err(|rejection| WebError::BadRequest(format!("Invalid form: {}", rejection)))?;

        let errors = validate_form(&mut form);
        Ok(ValidatedForm { form, errors })
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use tower::ServiceExt;

    use crate::application::forms::{SignInForm, REQUIRED};

    async fn handler(ValidatedForm { form, errors }: ValidatedForm<SignInForm>) -> String {
        format!("{}|{}", form.username, errors.field("password").join(","))
    }

    fn app() -> Router {
        Router::new().route("/test", post(handler))
    }

    async fn body_text(resp: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn form_errors_reach_the_handler() {
        let req = Request::builder()
            .method("POST")
            .uri("/test")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("username=+alice+"))
            .unwrap();

        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_text(resp).await, format!("alice|{}", REQUIRED));
    }

    #[tokio::test]
    async fn non_form_body_returns_400() {
        let req = Request::builder()
            .method("POST")
            .uri("/test")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"username":"alice"}"#))
            .unwrap();

        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
