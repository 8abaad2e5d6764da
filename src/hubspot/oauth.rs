//! HubSpot OAuth 2.0 authorization code flow
//!
//! 1. `authorize` stores a random state and returns the consent URL
//! 2. `handle_callback` checks the returned state, exchanges the code and
//!    parks the token response in the cache
//! 3. `get_credentials` hands the token response out once

use super::http::{HubSpotHttpClient, StatusError};
use crate::cache::KeyValueCache;
use crate::config::{mask_secret, HubSpotConfig, CREDENTIALS_TTL, STATE_TTL};
use crate::error::{IntegrationError, Result};
use crate::mapping::{HUBSPOT_OPTIONAL_SCOPES, HUBSPOT_SCOPES};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

const TOKEN_PATH: &str = "/oauth/v1/token";

/// Page returned to the popup window after a successful callback
pub const CLOSE_WINDOW_HTML: &str = r#"<html>
    <script>
        window.close();
    </script>
</html>"#;

/// State carried through the provider redirect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuthState {
    pub state: String,
    pub user_id: String,
    pub org_id: String,
}

impl OAuthState {
    /// New state with 32 random bytes, URL-safe base64 encoded
    pub fn generate(user_id: &str, org_id: &str) -> Self {
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);
        Self {
            state: URL_SAFE_NO_PAD.encode(bytes),
            user_id: user_id.to_string(),
            org_id: org_id.to_string(),
        }
    }
}

/// Query parameters HubSpot sends to the redirect URI
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

pub fn state_key(org_id: &str, user_id: &str) -> String {
    format!("hubspot_state:{}:{}", org_id, user_id)
}

pub fn credentials_key(org_id: &str, user_id: &str) -> String {
    format!("hubspot_credentials:{}:{}", org_id, user_id)
}

/// Drives the OAuth handshake against HubSpot
pub struct HubSpotOAuth {
    config: Arc<HubSpotConfig>,
    cache: Arc<dyn KeyValueCache>,
    http: HubSpotHttpClient,
}

impl HubSpotOAuth {
    pub fn new(config: Arc<HubSpotConfig>, cache: Arc<dyn KeyValueCache>) -> Result<Self> {
        let http = HubSpotHttpClient::new(&config.api_base_url, config.request_timeout)?;
        Ok(Self {
            config,
            cache,
            http,
        })
    }

    /// Consent URL without the state parameter
    pub fn authorization_url(&self) -> String {
        let join_scopes = |scopes: &[&str]| {
            scopes
                .iter()
                .map(|s| urlencoding::encode(s).into_owned())
                .collect::<Vec<_>>()
                .join("%20")
        };

        format!(
            "{}/oauth/authorize?client_id={}&redirect_uri={}&scope={}&optional_scopes={}",
            self.config.auth_base_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            join_scopes(HUBSPOT_SCOPES),
            join_scopes(HUBSPOT_OPTIONAL_SCOPES),
        )
    }

    /// Start the flow for a user and return the URL to send them to
    pub async fn authorize(&self, user_id: &str, org_id: &str) -> Result<String> {
        let state = OAuthState::generate(user_id, org_id);
        let encoded_state = serde_json::to_string(&state).map_err(anyhow::Error::from)?;

        self.cache
            .set(&state_key(org_id, user_id), encoded_state.clone(), STATE_TTL)
            .await?;
        debug!("Stored OAuth state for org={}, user={}", org_id, user_id);

        Ok(format!(
            "{}&state={}",
            self.authorization_url(),
            urlencoding::encode(&encoded_state)
        ))
    }

    /// Complete the flow from the redirect parameters.
    ///
    /// Returns the HTML page that closes the popup.
    pub async fn handle_callback(&self, params: &CallbackParams) -> Result<String> {
        if let Some(error) = &params.error {
            warn!("HubSpot returned an authorization error: {}", error);
            return Err(IntegrationError::Authorization(error.clone()));
        }

        let code = params
            .code
            .as_deref()
            .ok_or_else(|| IntegrationError::BadRequest("Missing code.".to_string()))?;
        let encoded_state = params
            .state
            .as_deref()
            .ok_or_else(|| IntegrationError::BadRequest("Missing state.".to_string()))?;
        let returned: OAuthState = serde_json::from_str(encoded_state)
            .map_err(|e| IntegrationError::BadRequest(format!("Malformed state: {}", e)))?;

        let key = state_key(&returned.org_id, &returned.user_id);
        let saved = self
            .cache
            .get(&key)
            .await?
            .and_then(|s| serde_json::from_str::<OAuthState>(&s).ok());

        match saved {
            Some(saved) if saved.state == returned.state => {}
            _ => {
                warn!(
                    "OAuth state mismatch for org={}, user={}",
                    returned.org_id, returned.user_id
                );
                return Err(IntegrationError::StateMismatch);
            }
        }

        let form = [
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code", code),
        ];
        debug!(
            "Exchanging code {} for org={}, user={}",
            mask_secret(code),
            returned.org_id,
            returned.user_id
        );

        let (token, deleted) = tokio::join!(
            self.http.post_form(TOKEN_PATH, &form),
            self.cache.delete(&key)
        );
        deleted?;
        let token = token.map_err(token_exchange_error)?;

        self.cache
            .set(
                &credentials_key(&returned.org_id, &returned.user_id),
                token.to_string(),
                CREDENTIALS_TTL,
            )
            .await?;
        info!(
            "HubSpot authorization complete for org={}, user={}",
            returned.org_id, returned.user_id
        );

        Ok(CLOSE_WINDOW_HTML.to_string())
    }

    /// Take the stored token response; a second call finds nothing
    pub async fn get_credentials(&self, user_id: &str, org_id: &str) -> Result<Value> {
        let key = credentials_key(org_id, user_id);
        let stored = self
            .cache
            .get(&key)
            .await?
            .ok_or(IntegrationError::MissingCredentials)?;
        let credentials: Value = serde_json::from_str(&stored).map_err(anyhow::Error::from)?;
        self.cache.delete(&key).await?;
        Ok(credentials)
    }
}

fn token_exchange_error(err: anyhow::Error) -> IntegrationError {
    match err.downcast_ref::<StatusError>() {
        Some(status) if status.is_client_error() => {
            IntegrationError::Authorization(format!("Token exchange rejected: {}", status.body))
        }
        _ => IntegrationError::Other(err),
    }
}
