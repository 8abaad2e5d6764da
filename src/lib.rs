//! HubSpot integration bridge
//!
//! OAuth2 authorization against HubSpot, transient credential hand-off, and
//! loading of CRM/CMS collections normalized into [`NormalizedItem`]s through
//! declarative field mappings.

pub mod cache;
pub mod config;
pub mod error;
pub mod hubspot;
pub mod item;
pub mod mapping;
pub mod server;

pub use cache::{KeyValueCache, MemoryCache};
pub use config::HubSpotConfig;
pub use error::{IntegrationError, Result};
pub use hubspot::{HubSpotFetcher, HubSpotOAuth};
pub use item::NormalizedItem;
pub use mapping::{hubspot_mappings, MappingRegistry};
