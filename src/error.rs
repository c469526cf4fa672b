use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::backend::BackendError;
use crate::csv_import::ImportError;
use crate::mailer::MailError;

/// Failure while building application state at startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Failure surfaced to the caller as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Internal(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

impl From<BackendError> for ApiError {
    fn from(value: BackendError) -> Self {
        match value {
            BackendError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            BackendError::NotFound(msg) => ApiError::NotFound(msg),
            BackendError::Api { status, message, .. } if status.is_client_error() => {
                ApiError::BadRequest(message)
            }
            BackendError::Api { message, .. } => {
                error!("backend error: {message}");
                ApiError::Internal(message)
            }
            BackendError::Http(err) => {
                error!("HTTP error: {err}");
                ApiError::Internal("Failed to reach backend".into())
            }
            BackendError::Url(err) => {
                error!("URL error: {err}");
                ApiError::Internal("Backend is misconfigured".into())
            }
        }
    }
}

impl From<MailError> for ApiError {
    fn from(value: MailError) -> Self {
        match value {
            MailError::MissingApiKey => ApiError::Internal(value.to_string()),
            MailError::Provider { ref message, .. } => {
                error!("join-request error: {value}");
                ApiError::Internal(message.clone())
            }
            MailError::Http(err) => {
                error!("join-request error: {err}");
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(value: ImportError) -> Self {
        ApiError::BadRequest(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode as ReqwestStatus;

    use super::*;

    #[test]
    fn test_backend_client_error_is_bad_request() {
        let err: ApiError = BackendError::Api {
            status: ReqwestStatus::CONFLICT,
            code: Some("23505".into()),
            message: "duplicate key".into(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "duplicate key");
    }

    #[test]
    fn test_backend_server_error_is_internal() {
        let err: ApiError = BackendError::Api {
            status: ReqwestStatus::BAD_GATEWAY,
            code: None,
            message: "upstream".into(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_missing_key_message() {
        let err: ApiError = MailError::MissingApiKey.into();
        assert_eq!(err.message(), "Missing RESEND_API_KEY secret in project.");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
