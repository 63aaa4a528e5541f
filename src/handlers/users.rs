use axum::{extract::State, response::IntoResponse};

use crate::{
    app::AppState, handlers::ApiResponse, middleware::auth::AuthenticatedUser,
    utils::service_error::ServiceError,
};

/// GET /api/users/me/export
pub async fn export_my_data(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let export = state.export.export_user_data(auth_user.user_id).await?;
    Ok(ApiResponse::ok(export, "Data export"))
}
