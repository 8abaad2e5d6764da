//! Parallel collection fetch and normalization
//!
//! One GET per configured collection is issued concurrently. Each response's
//! `results` list is normalized with the mapping for its object type and the
//! items are concatenated in collection order. A collection that fails to
//! load or normalize contributes no items; the others are unaffected.

use super::http::HubSpotHttpClient;
use crate::config::HubSpotConfig;
use crate::error::{IntegrationError, Result};
use crate::item::NormalizedItem;
use crate::mapping::path_extractor::{extract_list, path};
use crate::mapping::{normalize_items, MappingRegistry, ResourceCollection, RESOURCE_COLLECTIONS};
use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fetches HubSpot collections and normalizes them into items
pub struct HubSpotFetcher {
    http: HubSpotHttpClient,
    registry: Arc<MappingRegistry>,
    collections: Vec<ResourceCollection>,
}

impl HubSpotFetcher {
    pub fn new(config: &HubSpotConfig, registry: Arc<MappingRegistry>) -> Result<Self> {
        let http = HubSpotHttpClient::new(&config.api_base_url, config.request_timeout)?;
        Ok(Self {
            http,
            registry,
            collections: RESOURCE_COLLECTIONS.to_vec(),
        })
    }

    /// Restrict or reorder the fetched collections
    pub fn with_collections(mut self, collections: Vec<ResourceCollection>) -> Self {
        self.collections = collections;
        self
    }

    /// Load every collection using a credentials JSON document (the token
    /// response produced by the OAuth flow)
    pub async fn get_items(&self, credentials: &str) -> Result<Vec<NormalizedItem>> {
        let credentials: Value = serde_json::from_str(credentials)
            .map_err(|e| IntegrationError::BadRequest(format!("Malformed credentials: {}", e)))?;
        let access_token = credentials
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                IntegrationError::BadRequest("Credentials have no access_token.".to_string())
            })?;

        let fetches = self
            .collections
            .iter()
            .map(|collection| self.fetch_collection(*collection, access_token));
        let results = join_all(fetches).await;

        let mut items = Vec::new();
        for (collection, objects) in results {
            if objects.is_empty() {
                continue;
            }
            match self.registry.get(collection.object_type) {
                Some(mapping) => match normalize_items(&objects, mapping) {
                    Ok(normalized) => items.extend(normalized),
                    Err(e) => warn!("Failed to normalize {}: {}", collection.object_type, e),
                },
                None => {
                    debug!("No mapping for {}, using default items", collection.object_type);
                    items.extend(objects.iter().map(|_| NormalizedItem::default()));
                }
            }
        }

        info!("Loaded {} HubSpot items", items.len());
        Ok(items)
    }

    /// Fetch the raw objects of one collection; failures yield an empty list
    pub async fn fetch_collection(
        &self,
        collection: ResourceCollection,
        access_token: &str,
    ) -> (ResourceCollection, Vec<Value>) {
        match self
            .http
            .get_json(&collection.endpoint_path(), access_token)
            .await
        {
            Ok(body) => {
                let objects = extract_list(&body, &path(["results"]));
                debug!("Fetched {} {}", objects.len(), collection.object_type);
                (collection, objects)
            }
            Err(e) => {
                warn!("HTTP error fetching {}: {:#}", collection.object_type, e);
                (collection, Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{hubspot_mappings, FieldConfig, FieldMapping};
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::{routing::get, Json, Router};
    use serde_json::json;

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(|v| v == "Bearer good-token")
            .unwrap_or(false)
    }

    async fn spawn_api(companies_status: StatusCode) -> String {
        let app = Router::new()
            .route(
                "/crm/v3/objects/contacts",
                get(|headers: HeaderMap| async move {
                    if !authorized(&headers) {
                        return StatusCode::UNAUTHORIZED.into_response();
                    }
                    Json(json!({
                        "results": [{
                            "id": "1",
                            "properties": {"firstname": "Ada", "lastname": "Lovelace", "email": "a@b.com"},
                            "createdAt": "t1",
                            "updatedAt": "t2",
                            "archived": false
                        }]
                    }))
                    .into_response()
                }),
            )
            .route(
                "/crm/v3/objects/companies",
                get(move || async move {
                    (companies_status, Json(json!({"results": [{"id": "10"}]}))).into_response()
                }),
            )
            .route(
                "/crm/v3/objects/deals",
                get(|| async {
                    Json(json!({
                        "results": [
                            {"id": "20", "properties": {"dealname": "First"}, "archived": false},
                            {"id": "21", "properties": {"dealname": "Second"}, "archived": true}
                        ]
                    }))
                }),
            )
            .route(
                "/cms/v3/pages/site-pages",
                get(|| async { Json(json!({"total": 0})) }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn fetcher(base: &str) -> HubSpotFetcher {
        let config = HubSpotConfig::new("id", "secret", "http://localhost/cb").with_api_base_url(base);
        HubSpotFetcher::new(&config, Arc::new(hubspot_mappings().clone())).unwrap()
    }

    #[tokio::test]
    async fn test_get_items_in_collection_order() {
        let base = spawn_api(StatusCode::OK).await;
        let items = fetcher(&base)
            .get_items(r#"{"access_token": "good-token"}"#)
            .await
            .unwrap();

        let ids: Vec<_> = items.iter().filter_map(|i| i.id.as_deref()).collect();
        assert_eq!(ids, vec!["1", "10", "20", "21"]);

        assert_eq!(items[0].name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(items[0].url.as_deref(), Some("mailto:a@b.com"));
        assert_eq!(items[1].item_type.as_deref(), Some("Company"));
        assert_eq!(items[3].visibility, Some(false));
    }

    #[tokio::test]
    async fn test_failed_collection_is_skipped() {
        let base = spawn_api(StatusCode::INTERNAL_SERVER_ERROR).await;
        let items = fetcher(&base)
            .get_items(r#"{"access_token": "good-token"}"#)
            .await
            .unwrap();

        let types: Vec<_> = items.iter().filter_map(|i| i.item_type.as_deref()).collect();
        assert_eq!(types, vec!["Contact", "Deal", "Deal"]);
    }

    #[tokio::test]
    async fn test_unauthorized_collection_is_skipped() {
        let base = spawn_api(StatusCode::OK).await;
        let items = fetcher(&base)
            .get_items(r#"{"access_token": "stale-token"}"#)
            .await
            .unwrap();
        assert!(items.iter().all(|i| i.item_type.as_deref() != Some("Contact")));
        assert_eq!(items.len(), 3);
    }

    #[tokio::test]
    async fn test_unreachable_api_yields_no_items() {
        // nothing listens on port 9 locally
        let items = fetcher("http://127.0.0.1:9")
            .get_items(r#"{"access_token": "good-token"}"#)
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_unmapped_collection_gives_default_items() {
        let base = spawn_api(StatusCode::OK).await;
        let items = fetcher(&base)
            .with_collections(vec![ResourceCollection::new("crm", "objects/deals")])
            .get_items(r#"{"access_token": "good-token"}"#)
            .await
            .unwrap();
        assert_eq!(items.len(), 2);

        let config = HubSpotConfig::new("id", "secret", "http://localhost/cb").with_api_base_url(&base);
        let bare = HubSpotFetcher::new(&config, Arc::new(MappingRegistry::default()))
            .unwrap()
            .with_collections(vec![ResourceCollection::new("crm", "objects/deals")]);
        let items = bare.get_items(r#"{"access_token": "x"}"#).await.unwrap();
        assert_eq!(items, vec![NormalizedItem::default(), NormalizedItem::default()]);
    }

    #[tokio::test]
    async fn test_broken_mapping_only_drops_its_collection() {
        let base = spawn_api(StatusCode::OK).await;
        let mut deals = FieldMapping::new();
        deals.insert("id".to_string(), FieldConfig::path(["id"]));
        deals.insert("owner".to_string(), FieldConfig::path(["ownerId"]));
        let registry = hubspot_mappings().clone().with_overrides(MappingRegistry::new(
            [("objects/deals".to_string(), deals)].into_iter().collect(),
        ));

        let config = HubSpotConfig::new("id", "secret", "http://localhost/cb").with_api_base_url(&base);
        let items = HubSpotFetcher::new(&config, Arc::new(registry))
            .unwrap()
            .get_items(r#"{"access_token": "good-token"}"#)
            .await
            .unwrap();

        let ids: Vec<_> = items.iter().filter_map(|i| i.id.as_deref()).collect();
        assert_eq!(ids, vec!["1", "10"]);
    }

    #[tokio::test]
    async fn test_malformed_credentials() {
        let f = fetcher("http://127.0.0.1:9");
        let err = f.get_items("not json").await.unwrap_err();
        assert!(matches!(err, IntegrationError::BadRequest(_)));

        let err = f.get_items(r#"{"refresh_token": "r"}"#).await.unwrap_err();
        assert!(matches!(err, IntegrationError::BadRequest(_)));
    }
}
