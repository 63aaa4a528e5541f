// Document submission and verification status for the calling user

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;

use crate::{
    app::AppState,
    handlers::ApiResponse,
    middleware::auth::AuthenticatedUser,
    models::{DocumentDescriptor, UserRole},
    utils::service_error::ServiceError,
};

#[derive(Debug, Deserialize)]
pub struct SubmitDocumentsRequest {
    pub documents: Vec<DocumentDescriptor>,
}

/// POST /api/verification/company/documents
pub async fn submit_company_documents(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<SubmitDocumentsRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    if auth_user.role != UserRole::Company {
        return Err(ServiceError::Forbidden(
            "Only companies can submit business documents".to_string(),
        ));
    }

    let documents = state
        .documents
        .submit_for_user(auth_user.user_id, payload.documents)
        .await?;
    Ok(ApiResponse::created(
        documents,
        "Documents submitted for review",
    ))
}

/// POST /api/verification/documents
pub async fn upload_document(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(descriptor): Json<DocumentDescriptor>,
) -> Result<impl IntoResponse, ServiceError> {
    if auth_user.is_admin() {
        return Err(ServiceError::Forbidden(
            "Admins do not upload verification documents".to_string(),
        ));
    }

    let document = state
        .documents
        .upload_verification_document(auth_user.user_id, descriptor)
        .await?;
    Ok(ApiResponse::created(document, "Document uploaded"))
}

/// GET /api/verification/documents
pub async fn list_my_documents(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let documents = state.documents.list_user_documents(auth_user.user_id).await?;
    Ok(ApiResponse::ok(documents, "Documents retrieved"))
}

/// GET /api/verification/status
pub async fn verification_status(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let overview = state.documents.overview(auth_user.user_id).await?;
    Ok(ApiResponse::ok(overview, "Verification status"))
}
