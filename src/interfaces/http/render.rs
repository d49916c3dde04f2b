//! Page rendering
//!
//! Handlers name a template and fill a context; a [`TemplateRenderer`] turns
//! that into a response body. Every page context also carries the signed-in
//! `user` and the pending flash `messages`.

use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use super::error::WebError;
use super::modules::accounts::UserDto;
use crate::application::Session;

pub const INDEX_TEMPLATE: &str = "base/index.html";
pub const SIGN_UP_TEMPLATE: &str = "account/sign-up.html";
pub const SIGN_IN_TEMPLATE: &str = "account/sign-in.html";
pub const USER_PAGE_TEMPLATE: &str = "account/user-page.html";
pub const USER_UPDATE_TEMPLATE: &str = "account/user-update.html";
pub const USER_DELETE_TEMPLATE: &str = "account/user-delete.html";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template {template} failed: {message}")]
    Template { template: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub trait TemplateRenderer: Send + Sync {
    fn content_type(&self) -> &'static str;

    fn render(&self, template: &str, context: &Value) -> Result<String, RenderError>;
}

/// Emits `{"template": ..., "context": {...}}`. Used when no HTML engine is
/// plugged in, and by the tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonPageRenderer;

impl TemplateRenderer for JsonPageRenderer {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn render(&self, template: &str, context: &Value) -> Result<String, RenderError> {
        Ok(serde_json::to_string(&json!({
            "template": template,
            "context": context,
        }))?)
    }
}

/// A template name plus its view-specific context.
pub struct Page {
    template: &'static str,
    context: Map<String, Value>,
}

impl Page {
    pub fn new(template: &'static str) -> Self {
        Self {
            template,
            context: Map::new(),
        }
    }

    pub fn insert<T: Serialize>(mut self, key: &str, value: &T) -> Result<Self, WebError> {
        let value = serde_json::to_value(value).map_err(RenderError::from)?;
        self.context.insert(key.to_string(), value);
        Ok(self)
    }

    /// Render with the session's user and drain its flash messages.
    pub fn render(
        mut self,
        renderer: &dyn TemplateRenderer,
        session: &Session,
    ) -> Result<Response, WebError> {
        let user = session.user().map(UserDto::from);
        let messages = session.take_flashes();
        self = self.insert("user", &user)?.insert("messages", &messages)?;

        let body = renderer.render(self.template, &Value::Object(self.context))?;
        Ok(([(CONTENT_TYPE, renderer.content_type())], body).into_response())
    }
}
