//! HTTP-facing errors

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use super::common::ApiResponse;
use super::render::RenderError;
use crate::shared::DomainError;

#[derive(Debug, Error)]
pub enum WebError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for WebError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { .. } => Self::NotFound(err.to_string()),
            DomainError::Validation(_) | DomainError::Conflict(_) => {
                Self::BadRequest(err.to_string())
            }
            DomainError::Storage(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<RenderError> for WebError {
    fn from(err: RenderError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Internal(detail) => {
                error!("Internal error: {}", detail);
                "Internal server error".to_string()
            }
            Self::NotFound(message) | Self::BadRequest(message) => message,
        };
        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}
