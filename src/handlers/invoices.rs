// Invoice handlers

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    app::AppState, handlers::ApiResponse, middleware::auth::AuthenticatedUser,
    services::billing::CreateInvoiceRequest, utils::service_error::ServiceError,
};

/// POST /api/invoices
pub async fn create_invoice(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<CreateInvoiceRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let invoice = state.billing.create_invoice(auth_user.actor(), payload).await?;
    Ok(ApiResponse::created(invoice, "Invoice created"))
}

/// GET /api/invoices
pub async fn list_invoices(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let invoices = state.billing.list_invoices(auth_user.actor()).await?;
    Ok(ApiResponse::ok(invoices, "Invoices retrieved"))
}

/// GET /api/invoices/summary
pub async fn summary(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let summary = state.billing.summary(auth_user.actor()).await?;
    Ok(ApiResponse::ok(summary, "Earnings summary"))
}

/// GET /api/invoices/{id}
pub async fn get_invoice(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(invoice_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let invoice = state.billing.get_invoice(auth_user.actor(), invoice_id).await?;
    Ok(ApiResponse::ok(invoice, "Invoice retrieved"))
}

/// PUT /api/invoices/{id}/paid
pub async fn mark_paid(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(invoice_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let invoice = state.billing.mark_as_paid(auth_user.actor(), invoice_id).await?;
    Ok(ApiResponse::ok(invoice, "Invoice marked as paid"))
}
