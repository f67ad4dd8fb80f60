use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::validation::ValidationErrors;

/// Failure reported by the content store (network, timeout, schema error).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// Another row of the same table already uses the slug.
    #[error("slug already in use")]
    SlugTaken,
}

/// Failure reported by the hosted Session Store.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid login credentials")]
    InvalidCredentials,
    #[error("session store rejected the request: {0}")]
    Upstream(String),
    #[error("session store unreachable: {0}")]
    Http(#[from] reqwest::Error),
}

/// ApiError
///
/// Error taxonomy surfaced at the HTTP boundary. Not-found, authorization and
/// validation failures carry their own status; store and session failures are logged
/// server-side and collapse into a generic 500.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Not authenticated")]
    Unauthorized,
    #[error("Unauthorized")]
    Forbidden,
    #[error("Validation failed")]
    Validation(ValidationErrors),
    #[error(transparent)]
    Store(StoreError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Session(SessionError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            ApiError::Store(_) | ApiError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            // A slug clash is the admin's to fix, reported like any other form error.
            StoreError::SlugTaken => {
                let mut errors = ValidationErrors::default();
                errors.add("slug", "Slug already in use");
                ApiError::Validation(errors)
            }
            other => ApiError::Store(other),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Validation(errors) => json!({
                "error": self.to_string(),
                "fields": errors.fields(),
            }),
            ApiError::Session(SessionError::InvalidCredentials) => {
                json!({ "error": self.to_string() })
            }
            ApiError::Store(e) => {
                tracing::error!(error = %e, "content store failure");
                json!({ "error": "Internal server error" })
            }
            ApiError::Session(e) => {
                tracing::error!(error = %e, "session store failure");
                json!({ "error": "Internal server error" })
            }
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
