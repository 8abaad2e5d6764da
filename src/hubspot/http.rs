//! Lightweight HubSpot HTTP client
//!
//! Thin wrapper over reqwest that resolves paths against the API base URL,
//! applies the request timeout and turns non-success responses into
//! [`StatusError`]s.

use crate::config::mask_secret;
use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// HubSpot answered with a non-success status
#[derive(Debug, Error)]
#[error("HubSpot request failed ({status}): {body}")]
pub struct StatusError {
    pub status: u16,
    pub body: String,
}

impl StatusError {
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }
}

/// HubSpot HTTP client
#[derive(Clone)]
pub struct HubSpotHttpClient {
    http_client: Client,
    api_base_url: String,
}

impl HubSpotHttpClient {
    /// Create a client for `api_base_url` with a fixed per-request timeout
    pub fn new(api_base_url: &str, timeout: Duration) -> Result<Self> {
        debug!(
            "Creating HubSpot HTTP client for {} (timeout {:?})",
            api_base_url, timeout
        );
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }

    /// POST a form-encoded body and parse the JSON response
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<Value> {
        let url = self.url(path);
        debug!("POST {}", url);
        let request = self
            .http_client
            .post(&url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .form(form);
        self.send(request, &url).await
    }

    /// GET a JSON document with a bearer token
    pub async fn get_json(&self, path: &str, access_token: &str) -> Result<Value> {
        let url = self.url(path);
        debug!("GET {}", url);
        let request = self.http_client.get(&url).bearer_auth(access_token);
        self.send(request, &url).await
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Value> {
        let response = request
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;
        let status = response.status();
        let text = response.text().await?;

        debug!("Response status: {}", status);
        trace!(
            "Response body (first 2000 chars): {}",
            redact_body(&text).chars().take(2000).collect::<String>()
        );

        if !status.is_success() {
            warn!(
                "HubSpot request failed: status={}, body={}",
                status,
                text.chars().take(500).collect::<String>()
            );
            return Err(StatusError {
                status: status.as_u16(),
                body: text,
            }
            .into());
        }

        serde_json::from_str(&text).with_context(|| format!("Invalid JSON from {}", url))
    }
}

/// Fields of a JSON body that carry credentials
const SECRET_FIELDS: &[&str] = &["access_token", "refresh_token", "id_token"];

/// Body text safe for logging: credential fields of a JSON object are masked
fn redact_body(text: &str) -> String {
    let Ok(Value::Object(mut body)) = serde_json::from_str::<Value>(text) else {
        return text.to_string();
    };
    let mut masked = false;
    for field in SECRET_FIELDS {
        if let Some(Value::String(secret)) = body.get_mut(*field) {
            *secret = mask_secret(secret);
            masked = true;
        }
    }
    if masked {
        Value::Object(body).to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_trimmed() {
        let client = HubSpotHttpClient::new("https://api.hubapi.com/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.api_base_url(), "https://api.hubapi.com");
        assert_eq!(
            client.url("/crm/v3/objects/deals"),
            "https://api.hubapi.com/crm/v3/objects/deals"
        );
    }

    #[test]
    fn test_redact_body_masks_tokens() {
        let body = r#"{"access_token":"ACCESSTOKEN123456","refresh_token":"REFRESHTOKEN987","expires_in":1800}"#;
        let redacted = redact_body(body);
        assert!(!redacted.contains("ACCESSTOKEN123456"));
        assert!(!redacted.contains("REFRESHTOKEN987"));
        assert!(redacted.contains("ACCE...3456"));
        assert!(redacted.contains("1800"));
    }

    #[test]
    fn test_redact_body_leaves_other_bodies() {
        assert_eq!(redact_body(r#"{"results":[]}"#), r#"{"results":[]}"#);
        assert_eq!(redact_body("<html>oops</html>"), "<html>oops</html>");
    }

    #[test]
    fn test_status_error_classification() {
        let err = StatusError {
            status: 401,
            body: "{}".to_string(),
        };
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "HubSpot request failed (401): {}");

        let err = StatusError {
            status: 502,
            body: String::new(),
        };
        assert!(!err.is_client_error());
    }
}
