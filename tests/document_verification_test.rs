// Integration tests for company and document verification

use axum::http::StatusCode;
use marketplace_backend::{
    models::{
        CompanyVerificationStatus, DocumentDescriptor, DocumentStatus, NotificationKind,
        UserStatus, VerificationType,
    },
    utils::service_error::ServiceError,
};
use serde_json::{json, Value};
use uuid::Uuid;

mod common;
use common::TestApp;

fn descriptor(document_type: &str) -> DocumentDescriptor {
    DocumentDescriptor {
        document_type: document_type.to_string(),
        document_url: format!("https://files.example.com/{}.pdf", document_type.to_lowercase()),
        file_name: format!("{}.pdf", document_type.to_lowercase()),
        file_size: 4096,
    }
}

#[tokio::test]
async fn test_submission_creates_pending_documents() {
    let app = TestApp::new();
    let (account, company) = app.register_company("Submit Co").await;

    let documents = app
        .state
        .documents
        .submit_verification_documents(
            company.id,
            vec![descriptor("BUSINESS_REGISTRATION"), descriptor("TAX_CERTIFICATE")],
        )
        .await
        .unwrap();

    assert_eq!(documents.len(), 2);
    assert!(documents.iter().all(|d| d.status == DocumentStatus::Pending));
    assert!(documents.iter().all(|d| d.company_id == Some(company.id)));

    let user = app.store.find_user(account.user.id).await.unwrap().unwrap();
    assert_eq!(user.status, UserStatus::VerificationPending);
    let company = app.store.find_company(company.id).await.unwrap().unwrap();
    assert_eq!(company.verification_status, CompanyVerificationStatus::Pending);
}

#[tokio::test]
async fn test_submission_for_unknown_company_is_not_found() {
    let app = TestApp::new();
    let result = app
        .state
        .documents
        .submit_verification_documents(Uuid::new_v4(), vec![descriptor("BUSINESS_REGISTRATION")])
        .await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_invalid_batches_are_rejected() {
    let app = TestApp::new();
    let (_, company) = app.register_company("Batch Co").await;

    let empty = app
        .state
        .documents
        .submit_verification_documents(company.id, Vec::new())
        .await;
    assert!(matches!(empty, Err(ServiceError::Validation(_))));

    let mut bad = descriptor("BUSINESS_REGISTRATION");
    bad.document_url = "ftp://files.example.com/reg.pdf".to_string();
    let bad_url = app
        .state
        .documents
        .submit_verification_documents(company.id, vec![bad])
        .await;
    assert!(matches!(bad_url, Err(ServiceError::Validation(_))));

    let too_many = (0..11).map(|i| descriptor(&format!("DOC_{}", i))).collect();
    let result = app
        .state
        .documents
        .submit_verification_documents(company.id, too_many)
        .await;
    assert!(matches!(result, Err(ServiceError::Validation(_))));
}

#[tokio::test]
async fn test_company_approval_cascades() {
    let app = TestApp::new();
    let (account, company) = app.register_company("Approve Co").await;
    app.state
        .documents
        .submit_verification_documents(company.id, vec![descriptor("BUSINESS_REGISTRATION")])
        .await
        .unwrap();

    let approved = app
        .state
        .documents
        .approve_company_verification(company.id)
        .await
        .unwrap();
    assert!(approved.is_verified);
    assert!(approved.verified_at.is_some());
    assert_eq!(approved.verification_status, CompanyVerificationStatus::Verified);

    let user = app.store.find_user(account.user.id).await.unwrap().unwrap();
    assert_eq!(user.status, UserStatus::Verified);

    let documents = app.store.list_documents_for_user(account.user.id).await.unwrap();
    assert!(documents.iter().all(|d| d.status == DocumentStatus::Approved));

    let records = app
        .store
        .list_verification_records(account.user.id)
        .await
        .unwrap();
    assert!(records
        .iter()
        .any(|r| r.verification_type == VerificationType::Business));

    let notifications = app
        .state
        .notifications
        .list(account.user.id, false)
        .await
        .unwrap();
    assert!(notifications
        .iter()
        .any(|n| n.notification_type == NotificationKind::VerificationApproved));
}

#[tokio::test]
async fn test_company_rejection_reverts_user_to_provisional() {
    let app = TestApp::new();
    let (account, company) = app.register_company("Reject Co").await;
    app.state
        .documents
        .submit_verification_documents(company.id, vec![descriptor("BUSINESS_REGISTRATION")])
        .await
        .unwrap();

    let before = app.store.find_user(account.user.id).await.unwrap().unwrap();
    assert_eq!(before.status, UserStatus::VerificationPending);

    let rejected = app
        .state
        .documents
        .reject_company_verification(company.id, "Registration number is unreadable")
        .await
        .unwrap();
    assert_eq!(rejected.verification_status, CompanyVerificationStatus::Rejected);

    let user = app.store.find_user(account.user.id).await.unwrap().unwrap();
    assert_eq!(user.status, UserStatus::Provisional);

    let documents = app.store.list_documents_for_user(account.user.id).await.unwrap();
    assert!(documents.iter().all(|d| {
        d.status == DocumentStatus::Rejected
            && d.rejection_reason.as_deref() == Some("Registration number is unreadable")
    }));
}

#[tokio::test]
async fn test_company_rejection_requires_a_reason() {
    let app = TestApp::new();
    let (_, company) = app.register_company("Reasonless Co").await;
    let result = app
        .state
        .documents
        .reject_company_verification(company.id, "   ")
        .await;
    assert!(matches!(result, Err(ServiceError::Validation(_))));
}

#[tokio::test]
async fn test_resubmission_supersedes_rejected_documents() {
    let app = TestApp::new();
    let (account, company) = app.register_company("Retry Co").await;
    app.state
        .documents
        .submit_verification_documents(company.id, vec![descriptor("BUSINESS_REGISTRATION")])
        .await
        .unwrap();
    app.state
        .documents
        .reject_company_verification(company.id, "Expired certificate")
        .await
        .unwrap();

    app.state
        .documents
        .submit_verification_documents(company.id, vec![descriptor("BUSINESS_REGISTRATION")])
        .await
        .unwrap();

    let documents = app.store.list_documents_for_user(account.user.id).await.unwrap();
    assert_eq!(documents.len(), 2);
    assert_eq!(
        documents
            .iter()
            .filter(|d| d.status == DocumentStatus::Resubmit)
            .count(),
        1
    );
    assert_eq!(
        documents
            .iter()
            .filter(|d| d.status == DocumentStatus::Pending)
            .count(),
        1
    );
}

#[tokio::test]
async fn test_influencer_identity_document_review() {
    let app = TestApp::new();
    let (account, influencer) = app.register_influencer("Id Creator").await;

    let document = app
        .state
        .documents
        .upload_verification_document(account.user.id, descriptor("IDENTITY_CARD"))
        .await
        .unwrap();
    assert_eq!(document.influencer_id, Some(influencer.id));
    assert_eq!(document.status, DocumentStatus::Pending);

    let approved = app
        .state
        .documents
        .approve_verification_document(document.id)
        .await
        .unwrap();
    assert_eq!(approved.status, DocumentStatus::Approved);
    assert!(approved.reviewed_at.is_some());

    let influencer = app.store.find_influencer(influencer.id).await.unwrap().unwrap();
    assert!(influencer.is_verified);

    let user = app.store.find_user(account.user.id).await.unwrap().unwrap();
    assert_eq!(user.status, account.user.status);
    let records = app
        .store
        .list_verification_records(account.user.id)
        .await
        .unwrap();
    assert!(records.is_empty());

    let again = app
        .state
        .documents
        .reject_verification_document(document.id, "Too late")
        .await;
    assert!(matches!(again, Err(ServiceError::Conflict(_))));
}

#[tokio::test]
async fn test_admin_endpoints_require_admin_role() {
    let app = TestApp::new();
    let (account, company) = app.register_company("Sneaky Co").await;
    let uri = format!("/api/admin/companies/{}/approve", company.id);

    let response = app.put(&uri).bearer(&account.token).send().await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let anonymous = app.put(&uri).send().await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_reviews_submitted_documents_over_http() {
    let app = TestApp::new();
    let admin = app.create_admin().await;
    let (account, company) = app.register_company("Http Co").await;

    let response = app
        .post("/api/verification/company/documents")
        .bearer(&account.token)
        .json(&json!({
            "documents": [{
                "document_type": "BUSINESS_REGISTRATION",
                "document_url": "https://files.example.com/reg.pdf",
                "file_name": "reg.pdf",
                "file_size": 1024
            }]
        }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let pending = app
        .get("/api/admin/verification/documents?status=PENDING")
        .bearer(&admin.token)
        .send()
        .await;
    assert_eq!(pending.status(), StatusCode::OK);
    let body: Value = pending.json().await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let approve = app
        .put(&format!("/api/admin/companies/{}/approve", company.id))
        .bearer(&admin.token)
        .send()
        .await;
    assert_eq!(approve.status(), StatusCode::OK);

    let status = app
        .get("/api/verification/status")
        .bearer(&account.token)
        .send()
        .await;
    let body: Value = status.json().await;
    assert_eq!(body["data"]["status"], "VERIFIED");
    assert_eq!(body["data"]["company_status"], "VERIFIED");
}
