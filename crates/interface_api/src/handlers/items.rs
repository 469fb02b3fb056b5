//! Item handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use core_kernel::ItemId;

use crate::auth::CurrentUser;
use crate::dto::items::*;
use crate::error::ApiError;
use crate::extract::{IdempotencyKeyHeader, ValidatedJson};
use crate::state::AppState;

fn parse_item_id(raw: &str) -> Result<ItemId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound("Item not found".to_string()))
}

/// Reports a lost or found item
pub async fn create_item(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ValidatedJson(request): ValidatedJson<CreateItemRequest>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiError> {
    let item = state.catalog.report(&actor, request.into()).await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

/// Lists items, newest first
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ListItemsQuery>,
) -> Result<Json<Vec<ItemResponse>>, ApiError> {
    let filter = query.into_filter()?;
    let items = state.catalog.list(&filter).await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

/// Lists the caller's own reports
pub async fn list_my_items(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<Vec<ItemResponse>>, ApiError> {
    let items = state.catalog.list_mine(&actor).await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

/// Gets an item by ID
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ItemResponse>, ApiError> {
    let id = parse_item_id(&id)?;
    let details = state.catalog.get_by_id(id).await?;
    Ok(Json(details.into()))
}

/// Edits an item's descriptive fields
pub async fn update_item(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateItemRequest>,
) -> Result<Json<ItemResponse>, ApiError> {
    let id = parse_item_id(&id)?;
    let details = state.catalog.update(&actor, id, request.into()).await?;
    Ok(Json(details.into()))
}

/// Deletes an item
pub async fn delete_item(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_item_id(&id)?;
    state.catalog.delete(&actor, id).await?;
    Ok(Json(MessageResponse {
        message: "Item deleted successfully".to_string(),
    }))
}

/// Claims an available item
pub async fn claim_item(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    IdempotencyKeyHeader(key): IdempotencyKeyHeader,
    Path(id): Path<String>,
) -> Result<Json<ItemResponse>, ApiError> {
    let id = parse_item_id(&id)?;
    let item = state.workflow.submit_claim(id, &actor, key).await?;
    Ok(Json(item.into()))
}

/// Approves or rejects a pending claim
pub async fn process_claim(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    IdempotencyKeyHeader(key): IdempotencyKeyHeader,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<ProcessClaimRequest>,
) -> Result<Json<ItemResponse>, ApiError> {
    let id = parse_item_id(&id)?;
    let item = state
        .workflow
        .resolve_claim(id, &actor, request.approve, key)
        .await?;
    Ok(Json(item.into()))
}
