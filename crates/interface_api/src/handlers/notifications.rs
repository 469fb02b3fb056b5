//! Notification inbox handlers

use axum::{
    extract::{Path, State},
    Json,
};

use core_kernel::NotificationId;

use crate::auth::CurrentUser;
use crate::dto::notifications::*;
use crate::error::ApiError;
use crate::state::AppState;

/// Lists the caller's notifications, newest first
pub async fn list_notifications(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<Vec<NotificationResponse>>, ApiError> {
    let notifications = state.inbox.list_for(&actor).await?;
    Ok(Json(notifications.into_iter().map(Into::into).collect()))
}

/// Marks one notification as read
pub async fn mark_read(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<NotificationResponse>, ApiError> {
    let id: NotificationId = id
        .parse()
        .map_err(|_| ApiError::NotFound("Notification not found".to_string()))?;
    let notification = state.inbox.mark_read(&actor, id).await?;
    Ok(Json(notification.into()))
}

/// Marks all of the caller's notifications as read
pub async fn mark_all_read(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<MarkAllReadResponse>, ApiError> {
    let updated = state.inbox.mark_all_read(&actor).await?;
    Ok(Json(MarkAllReadResponse {
        message: "All notifications marked as read".to_string(),
        updated,
    }))
}
