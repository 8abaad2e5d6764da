//! HubSpot application configuration
//!
//! Loaded from environment variables:
//! - HUBSPOT_CLIENT_ID, HUBSPOT_CLIENT_SECRET, HUBSPOT_REDIRECT_URI (required)
//! - HUBSPOT_AUTH_BASE_URL, HUBSPOT_API_BASE_URL (optional, for sandboxes/tests)

use crate::error::{IntegrationError, Result};
use std::env;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_AUTH_BASE_URL: &str = "https://app.hubspot.com";
pub const DEFAULT_API_BASE_URL: &str = "https://api.hubapi.com";

/// Timeout for every request to HubSpot
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// How long an authorization state stays valid
pub const STATE_TTL: Duration = Duration::from_secs(600);
/// How long exchanged credentials wait to be collected
pub const CREDENTIALS_TTL: Duration = Duration::from_secs(600);

/// OAuth client settings and API endpoints
#[derive(Clone)]
pub struct HubSpotConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_base_url: String,
    pub api_base_url: String,
    pub request_timeout: Duration,
}

impl HubSpotConfig {
    pub fn new(client_id: &str, client_secret: &str, redirect_uri: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            redirect_uri: redirect_uri.to_string(),
            auth_base_url: DEFAULT_AUTH_BASE_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: REQUEST_TIMEOUT,
        }
    }

    /// Load from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| IntegrationError::Configuration(format!("{} is not set", key)))
        };

        let client_id = required("HUBSPOT_CLIENT_ID")?;
        let client_secret = required("HUBSPOT_CLIENT_SECRET")?;
        let redirect_uri = required("HUBSPOT_REDIRECT_URI")?;

        let mut config = Self::new(&client_id, &client_secret, &redirect_uri);
        if let Some(url) = lookup("HUBSPOT_AUTH_BASE_URL") {
            config = config.with_auth_base_url(&url);
        }
        if let Some(url) = lookup("HUBSPOT_API_BASE_URL") {
            config = config.with_api_base_url(&url);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_auth_base_url(mut self, url: &str) -> Self {
        self.auth_base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_base_url(mut self, url: &str) -> Self {
        self.api_base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Check that every URL setting parses
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("HUBSPOT_REDIRECT_URI", &self.redirect_uri),
            ("HUBSPOT_AUTH_BASE_URL", &self.auth_base_url),
            ("HUBSPOT_API_BASE_URL", &self.api_base_url),
        ] {
            url::Url::parse(value).map_err(|e| {
                IntegrationError::Configuration(format!("{} is not a valid URL: {}", name, e))
            })?;
        }
        Ok(())
    }
}

/// Mask sensitive values for logging
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

impl fmt::Debug for HubSpotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HubSpotConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &mask_secret(&self.client_secret))
            .field("redirect_uri", &self.redirect_uri)
            .field("auth_base_url", &self.auth_base_url)
            .field("api_base_url", &self.api_base_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
