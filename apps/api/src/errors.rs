use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::MalformedInputError;
use crate::render::TemplateError;
use crate::templates::TemplateNotFound;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    MalformedInput(#[from] MalformedInputError),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl From<TemplateNotFound> for AppError {
    fn from(e: TemplateNotFound) -> Self {
        AppError::NotFound(e.to_string())
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::MalformedInput(_) => (StatusCode::UNPROCESSABLE_ENTITY, "MALFORMED_INPUT"),
            AppError::Template(TemplateError::Syntax { .. }) => {
                (StatusCode::BAD_REQUEST, "TEMPLATE_SYNTAX_ERROR")
            }
            AppError::Template(TemplateError::Binding { .. }) => {
                (StatusCode::BAD_REQUEST, "TEMPLATE_BINDING_ERROR")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();
        match &self {
            AppError::NotFound(_) => {}
            AppError::MalformedInput(e) => tracing::warn!("Rejected document input: {e}"),
            AppError::Template(e) => tracing::warn!("Template rejected: {e}"),
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string()
            }
        }));

        (status, body).into_response()
    }
}
