// Admin moderation: document review, company verification, suspensions

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::{
    app::AppState,
    handlers::ApiResponse,
    middleware::auth::AdminUser,
    models::DocumentStatus,
    utils::service_error::ServiceError,
};

#[derive(Debug, Deserialize)]
pub struct DocumentListQuery {
    pub status: Option<DocumentStatus>,
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    #[serde(default)]
    pub reason: String,
}

/// GET /api/admin/verification/documents?status=
pub async fn list_documents(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<DocumentListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let status = query.status.unwrap_or(DocumentStatus::Pending);
    let documents = state.documents.list_documents(status).await?;
    Ok(ApiResponse::ok(documents, format!("{} documents", status)))
}

/// PUT /api/admin/companies/{id}/approve
pub async fn approve_company(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(company_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let company = state.documents.approve_company_verification(company_id).await?;
    info!("Admin {} approved company {}", admin.user_id, company.id);
    Ok(ApiResponse::ok(company, "Company verified"))
}

/// PUT /api/admin/companies/{id}/reject
pub async fn reject_company(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(company_id): Path<Uuid>,
    Json(payload): Json<RejectRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let company = state
        .documents
        .reject_company_verification(company_id, &payload.reason)
        .await?;
    info!("Admin {} rejected company {}", admin.user_id, company.id);
    Ok(ApiResponse::ok(company, "Company verification rejected"))
}

/// PUT /api/admin/documents/{id}/approve
pub async fn approve_document(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(document_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let document = state
        .documents
        .approve_verification_document(document_id)
        .await?;
    Ok(ApiResponse::ok(document, "Document approved"))
}

/// PUT /api/admin/documents/{id}/reject
pub async fn reject_document(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(document_id): Path<Uuid>,
    Json(payload): Json<RejectRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let document = state
        .documents
        .reject_verification_document(document_id, &payload.reason)
        .await?;
    Ok(ApiResponse::ok(document, "Document rejected"))
}

/// PUT /api/admin/invoices/{id}/overdue
pub async fn mark_invoice_overdue(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(invoice_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let invoice = state.billing.mark_as_overdue(invoice_id).await?;
    Ok(ApiResponse::ok(invoice, "Invoice marked overdue"))
}

/// PUT /api/admin/users/{id}/suspend
pub async fn suspend_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let user = state.accounts.suspend_user(user_id).await?;
    info!("Admin {} suspended user {}", admin.user_id, user.id);
    Ok(ApiResponse::ok(user, "User suspended"))
}
