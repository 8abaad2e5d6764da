//! HubSpot OAuth flow and collection loading

pub mod fetch;
pub mod http;
pub mod oauth;

pub use fetch::HubSpotFetcher;
pub use http::{HubSpotHttpClient, StatusError};
pub use oauth::{CallbackParams, HubSpotOAuth, OAuthState, CLOSE_WINDOW_HTML};
