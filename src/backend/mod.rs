//! Client for the hosted backend: PostgREST tables, object storage and
//! passwordless auth, all reached over HTTP with the project's anon key.

pub mod auth;
pub mod content;
pub mod storage;
pub mod tables;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub use tables::{Order, TableQuery};

const REQUEST_TIMEOUT_SECS: u64 = 30;
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Postgres "undefined_table".
pub const UNDEFINED_TABLE: &str = "42P01";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid backend URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("backend returned {status}: {message}")]
    Api {
        status: StatusCode,
        code: Option<String>,
        message: String,
    },
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("not found: {0}")]
    NotFound(String),
}

/// Error body shape shared by PostgREST, storage and auth responses.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    code: Option<serde_json::Value>,
    message: Option<String>,
    msg: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl BackendError {
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let code = parsed.code.map(|c| match c {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        });
        let message = parsed
            .message
            .or(parsed.msg)
            .or(parsed.error_description)
            .or(parsed.error)
            .unwrap_or_else(|| truncate_body(body));

        match status {
            StatusCode::UNAUTHORIZED => BackendError::Unauthorized(message),
            _ => BackendError::Api {
                status,
                code,
                message,
            },
        }
    }

    /// True when the queried relation has not been created yet.
    pub fn is_missing_table(&self) -> bool {
        match self {
            BackendError::Api { code, message, .. } => {
                code.as_deref() == Some(UNDEFINED_TABLE)
                    || (message.to_lowercase().contains("relation")
                        && message.to_lowercase().contains("does not exist"))
            }
            _ => false,
        }
    }
}

fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
}

#[derive(Clone)]
pub struct SupabaseClient {
    client: reqwest::Client,
    base_url: Arc<Url>,
    anon_key: Arc<str>,
    bucket: Arc<str>,
}

impl SupabaseClient {
    pub fn new(base_url: Url, anon_key: &str, bucket: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: Arc::new(base_url),
            anon_key: Arc::from(anon_key),
            bucket: Arc::from(bucket),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Joins `path` onto the project URL, keeping any path prefix the base carries.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        let mut base = self.base_url.as_ref().clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        Ok(base.join(path.trim_start_matches('/'))?)
    }

    /// Attaches the anon key plus either the caller's access token or the anon key as bearer.
    pub(crate) fn authorize(&self, request: RequestBuilder, session: Option<&str>) -> RequestBuilder {
        let bearer = session.unwrap_or(self.anon_key.as_ref());
        request
            .header("apikey", self.anon_key.as_ref())
            .bearer_auth(bearer)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.client
    }

    pub(crate) async fn check(response: Response) -> Result<Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(BackendError::from_status(status, &body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> SupabaseClient {
        SupabaseClient::new(Url::parse(base).unwrap(), "anon", "gallery").unwrap()
    }

    #[test]
    fn test_endpoint_keeps_prefix() {
        let c = client("https://example.com/proxy");
        assert_eq!(
            c.endpoint("/rest/v1/events").unwrap().as_str(),
            "https://example.com/proxy/rest/v1/events"
        );
        let c = client("https://abc.supabase.co");
        assert_eq!(
            c.endpoint("rest/v1/events").unwrap().as_str(),
            "https://abc.supabase.co/rest/v1/events"
        );
    }

    #[test]
    fn test_from_status_postgrest_body() {
        let err = BackendError::from_status(
            StatusCode::NOT_FOUND,
            r#"{"code":"42P01","details":null,"hint":null,"message":"relation \"public.admin_emails\" does not exist"}"#,
        );
        assert!(err.is_missing_table());
        assert!(err.to_string().contains("admin_emails"));
    }

    #[test]
    fn test_from_status_message_only() {
        let err = BackendError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"message":"relation public.photos does not exist"}"#,
        );
        assert!(err.is_missing_table());

        let err = BackendError::from_status(StatusCode::BAD_REQUEST, "plain failure");
        assert!(!err.is_missing_table());
        assert!(err.to_string().contains("plain failure"));
    }

    #[test]
    fn test_from_status_unauthorized() {
        let err = BackendError::from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"msg":"invalid JWT"}"#,
        );
        assert!(matches!(err, BackendError::Unauthorized(ref m) if m == "invalid JWT"));
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(MAX_ERROR_BODY_LENGTH + 10);
        let truncated = truncate_body(&long);
        assert!(truncated.contains("truncated"));
        assert!(truncated.len() < long.len() + 40);
    }
}
