// Onboarding checklist handlers

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    app::AppState, handlers::ApiResponse, middleware::auth::AuthenticatedUser,
    models::OnboardingStep, utils::service_error::ServiceError,
};

/// GET /api/onboarding/progress
pub async fn get_progress(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let view = state
        .onboarding
        .progress(auth_user.user_id, auth_user.role)
        .await?;
    Ok(ApiResponse::ok(view, "Onboarding progress"))
}

/// GET /api/onboarding/steps
pub async fn get_steps(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> impl IntoResponse {
    ApiResponse::ok(state.onboarding.steps(auth_user.role), "Onboarding steps")
}

/// POST /api/onboarding/steps/{step}/complete
pub async fn complete_step(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(step): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let step: OnboardingStep = step.parse().map_err(ServiceError::BadRequest)?;
    let view = state
        .onboarding
        .complete_step(auth_user.user_id, auth_user.role, step)
        .await?;
    Ok(ApiResponse::ok(view, format!("Step {} completed", step)))
}

/// POST /api/onboarding/skip
pub async fn skip(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let view = state.onboarding.skip(auth_user.user_id, auth_user.role).await?;
    Ok(ApiResponse::ok(view, "Onboarding skipped"))
}
