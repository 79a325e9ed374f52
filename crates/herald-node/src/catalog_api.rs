//! Catalog CRUD endpoints.
//!
//! - `/categories`, `/categories/{id}`
//! - `/items`, `/items/{id}`
//!
//! Each successful create, update or delete schedules one broadcast to every
//! connected WebSocket client. The response is returned without waiting for
//! that broadcast; failed requests announce nothing.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use herald_catalog::{CategoryUpdate, ItemUpdate, NewItem, Page};
use herald_realtime::{EntityEvent, EntityKind};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::{ApiError, AppState};
use crate::observability::METRICS;
use crate::validation::ValidatedJson;

/// Create the catalog routes.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category)
                .patch(update_category)
                .delete(delete_category),
        )
        .route("/items", get(list_items).post(create_item))
        .route(
            "/items/{id}",
            get(get_item).patch(update_item).delete(delete_item),
        )
}

// ==================== Request Types ====================

/// Request to create a category.
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// Request to update a category.
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
}

/// Request to create an item.
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub category_id: u64,
}

/// Request to update an item.
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct UpdateItemRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub category_id: Option<u64>,
}

// ==================== Categories ====================

async fn create_category(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state.catalog.create_category(&req.name)?;

    announce(
        &state,
        EntityEvent::Added {
            kind: EntityKind::Category,
            name: category.name.clone(),
        },
    );

    Ok((StatusCode::CREATED, Json(category)))
}

async fn list_categories(
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> impl IntoResponse {
    Json(state.catalog.list_categories(page))
}

async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.catalog.get_category(id)?))
}

async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    ValidatedJson(req): ValidatedJson<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .catalog
        .update_category(id, CategoryUpdate { name: req.name })?;

    announce(
        &state,
        EntityEvent::Updated {
            kind: EntityKind::Category,
            name: category.name.clone(),
        },
    );

    Ok(Json(category))
}

async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state.catalog.delete_category(id)?;

    announce(
        &state,
        EntityEvent::Deleted {
            kind: EntityKind::Category,
            id: category.id,
        },
    );

    Ok(Json(category))
}

// ==================== Items ====================

async fn create_item(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state.catalog.create_item(NewItem {
        name: req.name,
        category_id: req.category_id,
    })?;

    announce(
        &state,
        EntityEvent::Added {
            kind: EntityKind::Item,
            name: item.name.clone(),
        },
    );

    Ok((StatusCode::CREATED, Json(item)))
}

async fn list_items(
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> impl IntoResponse {
    Json(state.catalog.list_items(page))
}

async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.catalog.get_item(id)?))
}

async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    ValidatedJson(req): ValidatedJson<UpdateItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state.catalog.update_item(
        id,
        ItemUpdate {
            name: req.name,
            category_id: req.category_id,
        },
    )?;

    announce(
        &state,
        EntityEvent::Updated {
            kind: EntityKind::Item,
            name: item.name.clone(),
        },
    );

    Ok(Json(item))
}

async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state.catalog.delete_item(id)?;

    announce(
        &state,
        EntityEvent::Deleted {
            kind: EntityKind::Item,
            id: item.id,
        },
    );

    Ok(Json(item))
}

/// Hand a committed change to the notifier without waiting for delivery.
///
/// Commit and enqueue are separate steps, so concurrent changes may be
/// announced in a different order than they were committed.
fn announce(state: &AppState, event: EntityEvent) {
    let entity = match event.kind() {
        EntityKind::Category => "category",
        EntityKind::Item => "item",
    };
    tracing::info!(entity, change = %event, "Catalog changed");

    let queued = state.notifier.notify(&event);
    METRICS.record_notification(entity, queued);
}
