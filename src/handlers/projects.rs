// Project (campaign) handlers

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    app::AppState,
    handlers::ApiResponse,
    middleware::auth::AuthenticatedUser,
    models::ProjectStatus,
    services::project::CreateProjectRequest,
    utils::service_error::ServiceError,
};

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ProjectStatus,
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let project = state.projects.create_project(auth_user.actor(), payload).await?;
    Ok(ApiResponse::created(project, "Project created"))
}

/// GET /api/projects
pub async fn list_projects(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let projects = state.projects.list_projects(auth_user.actor()).await?;
    Ok(ApiResponse::ok(projects, "Projects retrieved"))
}

/// GET /api/projects/{id}
pub async fn get_project(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(project_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let project = state.projects.get_project(auth_user.actor(), project_id).await?;
    Ok(ApiResponse::ok(project, "Project retrieved"))
}

/// PUT /api/projects/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let project = state
        .projects
        .update_status(auth_user.actor(), project_id, payload.status)
        .await?;
    Ok(ApiResponse::ok(project, "Project status updated"))
}
