// HTTP handlers. Every module returns the `ApiResponse` envelope on success
// and `ServiceError` on failure.

pub mod admin;
pub mod auth;
pub mod health;
pub mod invoices;
pub mod notifications;
pub mod onboarding;
pub mod projects;
pub mod scouts;
pub mod users;
pub mod verification;

use crate::{app::AppState, middleware::auth_middleware};
use axum::{
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: message.into(),
        })
    }

    pub fn created(data: T, message: impl Into<String>) -> (StatusCode, Json<Self>) {
        (StatusCode::CREATED, Self::ok(data, message))
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data: None,
            message: message.into(),
        })
    }
}

// Authentication routes; only `/me` needs a token
pub fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(auth::get_current_user))
        .route_layer(from_fn_with_state(state, auth_middleware))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/verify-email", get(auth::verify_email))
        .route("/resend-verification", post(auth::resend_verification))
}

pub fn verification_routes() -> Router<AppState> {
    Router::new()
        .route("/company/documents", post(verification::submit_company_documents))
        .route(
            "/documents",
            post(verification::upload_document).get(verification::list_my_documents),
        )
        .route("/status", get(verification::verification_status))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/verification/documents", get(admin::list_documents))
        .route("/companies/{id}/approve", put(admin::approve_company))
        .route("/companies/{id}/reject", put(admin::reject_company))
        .route("/documents/{id}/approve", put(admin::approve_document))
        .route("/documents/{id}/reject", put(admin::reject_document))
        .route("/invoices/{id}/overdue", put(admin::mark_invoice_overdue))
        .route("/users/{id}/suspend", put(admin::suspend_user))
}

pub fn onboarding_routes() -> Router<AppState> {
    Router::new()
        .route("/progress", get(onboarding::get_progress))
        .route("/steps", get(onboarding::get_steps))
        .route("/steps/{step}/complete", post(onboarding::complete_step))
        .route("/skip", post(onboarding::skip))
}

pub fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(projects::create_project).get(projects::list_projects))
        .route("/{id}", get(projects::get_project))
        .route("/{id}/status", put(projects::update_status))
}

pub fn scout_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(scouts::send_scout))
        .route("/received", get(scouts::received))
        .route("/sent", get(scouts::sent))
        .route("/{id}/accept", put(scouts::accept))
        .route("/{id}/reject", put(scouts::reject))
}

pub fn invoice_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(invoices::create_invoice).get(invoices::list_invoices))
        .route("/summary", get(invoices::summary))
        .route("/{id}", get(invoices::get_invoice))
        .route("/{id}/paid", put(invoices::mark_paid))
}

pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(notifications::list))
        .route("/{id}/read", put(notifications::mark_read))
}

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/me/export", get(users::export_my_data))
}

/// Everything under `/api`
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .nest("/verification", verification_routes())
        .nest("/admin", admin_routes())
        .nest("/onboarding", onboarding_routes())
        .nest("/projects", project_routes())
        .nest("/scouts", scout_routes())
        .nest("/invoices", invoice_routes())
        .nest("/notifications", notification_routes())
        .nest("/users", user_routes())
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/auth", auth_routes(state))
        .merge(protected)
}
