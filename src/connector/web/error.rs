//! Error type for the HTTP surface.
//!
//! Handlers return `Result<T, WebError>`, which implements
//! [`axum::response::IntoResponse`] so errors become a JSON body with an
//! appropriate status code. Internal failures are logged in full but only a
//! generic message reaches the browser.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::domain::DomainError;

#[derive(Debug, Error)]
pub enum WebError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("render error: {0}")]
    Render(#[from] minijinja::Error),

    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            WebError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            WebError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            WebError::Domain(DomainError::NotConnected) => {
                (StatusCode::CONFLICT, DomainError::NotConnected.to_string())
            }
            WebError::Domain(DomainError::InvalidInput(m)) => (StatusCode::BAD_REQUEST, m.clone()),
            WebError::Domain(e) => {
                error!(error = %e, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
            }
            WebError::Render(e) => {
                error!(error = %e, "failed to render page");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}
