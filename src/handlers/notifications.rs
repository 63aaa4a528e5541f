// In-app notification handlers

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    app::AppState, handlers::ApiResponse, middleware::auth::AuthenticatedUser,
    utils::service_error::ServiceError,
};

#[derive(Debug, Deserialize)]
pub struct NotificationListQuery {
    #[serde(default)]
    pub unread_only: bool,
}

/// GET /api/notifications?unread_only=
pub async fn list(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<NotificationListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let notifications = state
        .notifications
        .list(auth_user.user_id, query.unread_only)
        .await?;
    Ok(ApiResponse::ok(notifications, "Notifications retrieved"))
}

/// PUT /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(notification_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let notification = state
        .notifications
        .mark_read(auth_user.user_id, notification_id)
        .await?;
    Ok(ApiResponse::ok(notification, "Notification marked as read"))
}
