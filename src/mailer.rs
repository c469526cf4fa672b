use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::models::JoinRequest;

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Missing RESEND_API_KEY secret in project.")]
    MissingApiKey,
    #[error("email provider returned {status}: {message}")]
    Provider { status: StatusCode, message: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
struct OutgoingEmail<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: String,
}

#[derive(Debug, Deserialize)]
struct SentEmail {
    id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ProviderError {
    message: Option<String>,
}

/// Sends transactional mail through the Resend HTTP API.
#[derive(Clone)]
pub struct ResendMailer {
    client: reqwest::Client,
    base_url: Arc<Url>,
    api_key: Option<Arc<str>>,
    from: Arc<str>,
    to: Arc<str>,
}

impl ResendMailer {
    pub fn new(
        base_url: Url,
        api_key: Option<&str>,
        from: &str,
        to: &str,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: Arc::new(base_url),
            api_key: api_key.filter(|k| !k.is_empty()).map(Arc::from),
            from: Arc::from(from),
            to: Arc::from(to),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Emails the organization about a new join request and returns the provider's message id.
    pub async fn send_join_request(&self, request: &JoinRequest) -> Result<Option<String>, MailError> {
        let api_key = self.api_key.as_deref().ok_or(MailError::MissingApiKey)?;
        let url = format!("{}/emails", self.base_url.as_str().trim_end_matches('/'));

        let email = OutgoingEmail {
            from: self.from.as_ref(),
            to: vec![self.to.as_ref()],
            subject: "New Join Request",
            html: join_request_html(request),
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(&email)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let parsed: ProviderError = serde_json::from_str(&body).unwrap_or_default();
            return Err(MailError::Provider {
                status,
                message: parsed.message.unwrap_or(body),
            });
        }

        let sent: SentEmail = response.json().await?;
        info!(id = ?sent.id, "join request email sent");
        Ok(sent.id)
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn join_request_html(request: &JoinRequest) -> String {
    let notes = request
        .message
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .map(|m| format!("<p><strong>Notes:</strong> {}</p>\n", escape_html(m)))
        .unwrap_or_default();
    format!(
        "<h2>New Join Request</h2>\n\
         <p><strong>Name:</strong> {}</p>\n\
         <p><strong>Email:</strong> {}</p>\n\
         {notes}\
         <p style=\"color:#666\">Sent from boosters website</p>\n",
        escape_html(&request.name),
        escape_html(&request.email),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(message: Option<&str>) -> JoinRequest {
        JoinRequest {
            name: "Pat <Parent>".to_string(),
            email: "pat@example.com".to_string(),
            message: message.map(str::to_string),
        }
    }

    #[test]
    fn test_html_includes_notes() {
        let html = join_request_html(&request(Some("Can help with uniforms & props")));
        assert!(html.contains("<h2>New Join Request</h2>"));
        assert!(html.contains("<strong>Name:</strong> Pat &lt;Parent&gt;"));
        assert!(html.contains("<strong>Email:</strong> pat@example.com"));
        assert!(html.contains("<strong>Notes:</strong> Can help with uniforms &amp; props"));
        assert!(html.contains("Sent from boosters website"));
    }

    #[test]
    fn test_html_without_notes() {
        let html = join_request_html(&request(None));
        assert!(!html.contains("Notes"));
        let html = join_request_html(&request(Some("   ")));
        assert!(!html.contains("Notes"));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let mailer = ResendMailer::new(
            Url::parse("http://localhost:1").unwrap(),
            Some(""),
            "from@example.com",
            "to@example.com",
        )
        .unwrap();
        assert!(!mailer.is_configured());
        let err = mailer.send_join_request(&request(None)).await.unwrap_err();
        assert!(matches!(err, MailError::MissingApiKey));
    }
}
