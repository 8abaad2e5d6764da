//! HTTP surface for the integration
//!
//! Routes:
//! - POST /integrations/hubspot/authorize        (form: user_id, org_id)
//! - GET  /integrations/hubspot/oauth2callback   (query: code, state, error)
//! - POST /integrations/hubspot/credentials      (form: user_id, org_id)
//! - POST /integrations/hubspot/load             (form: credentials)

use crate::error::IntegrationError;
use crate::hubspot::{CallbackParams, HubSpotFetcher, HubSpotOAuth};
use crate::item::NormalizedItem;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub oauth: Arc<HubSpotOAuth>,
    pub fetcher: Arc<HubSpotFetcher>,
}

impl AppState {
    pub fn new(oauth: HubSpotOAuth, fetcher: HubSpotFetcher) -> Self {
        Self {
            oauth: Arc::new(oauth),
            fetcher: Arc::new(fetcher),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UserForm {
    pub user_id: String,
    pub org_id: String,
}

#[derive(Debug, Deserialize)]
pub struct LoadForm {
    pub credentials: String,
}

impl IntoResponse for IntegrationError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            error!("Request failed: {:#}", self);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/integrations/hubspot/authorize", post(authorize))
        .route("/integrations/hubspot/oauth2callback", get(oauth2callback))
        .route("/integrations/hubspot/credentials", post(credentials))
        .route("/integrations/hubspot/load", post(load))
        .with_state(state)
}

async fn authorize(
    State(state): State<AppState>,
    Form(form): Form<UserForm>,
) -> Result<Json<String>, IntegrationError> {
    let url = state.oauth.authorize(&form.user_id, &form.org_id).await?;
    Ok(Json(url))
}

async fn oauth2callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<Html<String>, IntegrationError> {
    let page = state.oauth.handle_callback(&params).await?;
    Ok(Html(page))
}

async fn credentials(
    State(state): State<AppState>,
    Form(form): Form<UserForm>,
) -> Result<Json<Value>, IntegrationError> {
    let credentials = state
        .oauth
        .get_credentials(&form.user_id, &form.org_id)
        .await?;
    Ok(Json(credentials))
}

async fn load(
    State(state): State<AppState>,
    Form(form): Form<LoadForm>,
) -> Result<Json<Vec<NormalizedItem>>, IntegrationError> {
    let items = state.fetcher.get_items(&form.credentials).await?;
    Ok(Json(items))
}
