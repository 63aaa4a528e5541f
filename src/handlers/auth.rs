// Authentication handlers: registration, login, email verification

use axum::{
    body::Bytes,
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::{
    app::AppState,
    handlers::ApiResponse,
    middleware::auth::AuthenticatedUser,
    services::account::{LoginRequest, RegisterRequest},
    utils::service_error::ServiceError,
};

#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct ResendVerificationRequest {
    #[serde(default)]
    pub email: String,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let account = state.accounts.register(payload).await?;
    Ok(ApiResponse::created(
        account,
        "Registration successful. Please check your email to verify your account.",
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let response = state.accounts.login(payload).await?;
    Ok(ApiResponse::ok(response, "Login successful"))
}

/// GET /api/auth/me
pub async fn get_current_user(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let overview = state.accounts.overview(auth_user.user_id).await?;
    Ok(ApiResponse::ok(overview, "Current user"))
}

/// GET /api/auth/verify-email?token=
///
/// Unknown, expired and used tokens are all client errors.
pub async fn verify_email(
    State(state): State<AppState>,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let verified = state
        .email_verification
        .verify(&query.token)
        .await
        .map_err(|e| match e {
            ServiceError::NotFound(_) => {
                ServiceError::BadRequest("Invalid verification token".to_string())
            },
            other => other,
        })?;

    Ok(ApiResponse::ok(verified, "Email verified successfully"))
}

/// POST /api/auth/resend-verification
///
/// Always answers 200, whatever the body, so the endpoint cannot reveal
/// which accounts exist.
pub async fn resend_verification(
    State(state): State<AppState>,
    body: Bytes,
) -> impl IntoResponse {
    match serde_json::from_slice::<ResendVerificationRequest>(&body) {
        Ok(payload) if !payload.email.trim().is_empty() => {
            state.email_verification.resend_for_email(&payload.email).await;
        },
        Ok(_) => tracing::debug!("Verification resend requested without an email"),
        Err(e) => tracing::debug!("Ignoring unreadable verification resend body: {}", e),
    }

    ApiResponse::message(
        "If an unverified account exists for this email, a new verification link has been sent.",
    )
}
