//! HTTP API for the Herald node.
//!
//! Assembles the router from the catalog and real-time route sets and maps
//! catalog failures onto HTTP statuses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use herald_catalog::{CatalogError, CatalogStore};
use herald_realtime::{Hub, Notifier, SessionConfig};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use crate::catalog_api::catalog_routes;
use crate::config::NodeConfig;
use crate::observability::{metrics_handler, metrics_layer, request_id_layer};
use crate::realtime_api::realtime_routes;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Category and item store.
    pub catalog: Arc<CatalogStore>,
    /// Connected WebSocket clients.
    pub hub: Arc<Hub>,
    /// Background broadcast of catalog changes.
    pub notifier: Notifier,
    /// Settings applied to each WebSocket session.
    pub session: SessionConfig,
}

impl AppState {
    /// Build the state from configuration and start the notifier task.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn from_config(config: &NodeConfig) -> (Self, JoinHandle<()>) {
        let hub = Arc::new(Hub::new(config.hub()));
        let (notifier, task) = Notifier::spawn(hub.clone(), config.notifier_capacity);

        let state = Self {
            catalog: Arc::new(CatalogStore::new()),
            hub,
            notifier,
            session: config.session(),
        };
        (state, task)
    }
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Catalog(CatalogError::CategoryNotFound { .. })
            | ApiError::Catalog(CatalogError::ItemNotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Catalog(CatalogError::DuplicateCategory { .. }) => StatusCode::CONFLICT,
            ApiError::Catalog(CatalogError::Validation(_)) => StatusCode::BAD_REQUEST,
        };

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Creates the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .merge(catalog_routes())
        .merge(realtime_routes())
        .layer(TraceLayer::new_for_http())
        .layer(metrics_layer())
        .layer(request_id_layer())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
