// Scout invitation handlers

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    app::AppState,
    handlers::ApiResponse,
    middleware::auth::AuthenticatedUser,
    models::ScoutStatus,
    services::scout::SendScoutRequest,
    utils::service_error::ServiceError,
};

#[derive(Debug, Deserialize)]
pub struct ScoutListQuery {
    pub status: Option<ScoutStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RejectScoutRequest {
    pub reason: Option<String>,
}

/// POST /api/scouts
pub async fn send_scout(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<SendScoutRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let scout = state
        .scouts
        .send_scout_invitation(auth_user.actor(), payload)
        .await?;
    Ok(ApiResponse::created(scout, "Scout invitation sent"))
}

/// GET /api/scouts/received?status=
pub async fn received(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<ScoutListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let scouts = state
        .scouts
        .received_scouts(auth_user.actor(), query.status)
        .await?;
    Ok(ApiResponse::ok(scouts, "Scout invitations retrieved"))
}

/// GET /api/scouts/sent?status=
pub async fn sent(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<ScoutListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let scouts = state.scouts.sent_scouts(auth_user.actor(), query.status).await?;
    Ok(ApiResponse::ok(scouts, "Sent scouts retrieved"))
}

/// PUT /api/scouts/{id}/accept
pub async fn accept(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(scout_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let acceptance = state.scouts.accept_scout(auth_user.actor(), scout_id).await?;
    Ok(ApiResponse::ok(acceptance, "Scout invitation accepted"))
}

/// PUT /api/scouts/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(scout_id): Path<Uuid>,
    payload: Option<Json<RejectScoutRequest>>,
) -> Result<impl IntoResponse, ServiceError> {
    let Json(payload) = payload.unwrap_or_default();
    let scout = state
        .scouts
        .reject_scout(auth_user.actor(), scout_id, payload.reason)
        .await?;
    Ok(ApiResponse::ok(scout, "Scout invitation rejected"))
}
