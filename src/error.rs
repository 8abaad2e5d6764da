//! Error types for the HubSpot integration

use thiserror::Error;

/// Failures surfaced to callers of the integration
#[derive(Debug, Error)]
pub enum IntegrationError {
    /// HubSpot redirected back with an `error` parameter, or refused the code
    #[error("{0}")]
    Authorization(String),

    #[error("State does not match.")]
    StateMismatch,

    #[error("No credentials found.")]
    MissingCredentials,

    /// Malformed input from the caller (callback parameters, credentials JSON)
    #[error("{0}")]
    BadRequest(String),

    #[error("unknown item field '{0}'")]
    UnknownField(String),

    #[error("invalid field mapping: {0}")]
    InvalidMapping(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl IntegrationError {
    /// Whether the failure was caused by the request rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            IntegrationError::Authorization(_)
                | IntegrationError::StateMismatch
                | IntegrationError::MissingCredentials
                | IntegrationError::BadRequest(_)
        )
    }
}

pub type Result<T, E = IntegrationError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert!(IntegrationError::StateMismatch.is_client_error());
        assert!(IntegrationError::MissingCredentials.is_client_error());
        assert!(IntegrationError::Authorization("access_denied".into()).is_client_error());
        assert!(!IntegrationError::Configuration("x".into()).is_client_error());
        assert!(!IntegrationError::Other(anyhow::anyhow!("boom")).is_client_error());
    }

    #[test]
    fn test_messages() {
        assert_eq!(IntegrationError::StateMismatch.to_string(), "State does not match.");
        assert_eq!(
            IntegrationError::MissingCredentials.to_string(),
            "No credentials found."
        );
    }
}
