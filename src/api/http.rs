//! HTTP utilities for CRM REST and GraphQL calls

use reqwest::{Client, Method};
use serde_json::Value;
use thiserror::Error;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Failure of a single call against the CRM API
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("API request failed with status {status}")]
    Status { status: u16, body: String },
    #[error("failed to send request: {0}")]
    Request(#[from] reqwest::Error),
    #[error("failed to parse response JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("no API key configured")]
    MissingCredentials,
    #[error("GraphQL request returned errors: {}", .0.join("; "))]
    GraphQl(Vec<String>),
}

impl TransportError {
    /// HTTP status code, when the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            TransportError::Request(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Short, user-facing suggestion for the error
    pub fn hint(&self) -> Option<&'static str> {
        if matches!(self, TransportError::MissingCredentials) {
            return Some("Set CRM_API_KEY, pass --api-key, or run 'crmctl config set api-key <KEY>'.");
        }
        match self.status()? {
            401 => Some("Authentication failed. Check that your API key is valid."),
            403 => Some("Permission denied. Your API key lacks access to this resource."),
            404 => Some("Resource not found."),
            409 => Some("Resource conflict. The record may already exist."),
            429 => Some("Rate limit exceeded. Please try again later."),
            400 | 422 => Some("Invalid request. Check your parameters and payload."),
            500..=599 => Some("CRM service temporarily unavailable. Please try again."),
            _ => None,
        }
    }
}

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// HTTP client wrapper for CRM API calls
#[derive(Clone, Debug)]
pub struct ApiHttpClient {
    client: Client,
}

impl ApiHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(concat!("crmctl/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// Send a request and decode the JSON response.
    /// An empty success body decodes to `Value::Null`.
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        token: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value, TransportError> {
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method, url).bearer_auth(token);

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;

        let status = response.status();
        let response_body = response.text().await?;

        if !status.is_success() {
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&response_body));
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: response_body,
            });
        }

        if response_body.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&response_body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.contains("[truncated, 500 bytes total]"));
        assert!(sanitized.len() < body.len());
    }

    #[test]
    fn test_sanitize_strips_control_characters() {
        assert_eq!(sanitize_for_log("a\nb\tc d"), "abc d");
    }

    #[test]
    fn test_hint_by_status() {
        let err = TransportError::Status {
            status: 401,
            body: String::new(),
        };
        assert!(err.hint().unwrap().contains("API key"));

        let err = TransportError::Status {
            status: 503,
            body: String::new(),
        };
        assert!(err.hint().unwrap().contains("unavailable"));

        let err = TransportError::Status {
            status: 418,
            body: String::new(),
        };
        assert!(err.hint().is_none());
    }

    #[test]
    fn test_missing_credentials_hint() {
        assert!(TransportError::MissingCredentials
            .hint()
            .unwrap()
            .contains("CRM_API_KEY"));
    }
}
