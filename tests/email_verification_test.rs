// Integration tests for email verification tokens

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use marketplace_backend::{
    models::{NewEmailVerificationToken, UserStatus, VerificationStatus, VerificationType},
    services::email_verification::hash_token,
    utils::service_error::ServiceError,
};
use serde_json::{json, Value};
use uuid::Uuid;

mod common;
use common::TestApp;

#[tokio::test]
async fn test_issued_token_expires_after_24_hours() {
    let app = TestApp::new();
    let (account, _) = app.register_influencer("Ttl Creator").await;

    let issued = app
        .state
        .email_verification
        .resend(account.user.id)
        .await
        .unwrap();

    let ttl = issued.expires_at - issued.created_at;
    assert!((ttl - Duration::hours(24)).num_seconds().abs() <= 1);
}

#[tokio::test]
async fn test_verifying_moves_user_to_verification_pending() {
    let app = TestApp::new();
    let (account, _) = app.register_influencer("Scenario A").await;
    assert_eq!(account.user.status, UserStatus::Provisional);

    let issued = app
        .state
        .email_verification
        .resend(account.user.id)
        .await
        .unwrap();
    let verified = app.state.email_verification.verify(&issued.token).await.unwrap();

    assert_eq!(verified.user_id, account.user.id);
    assert_eq!(verified.email, account.user.email);
    assert_eq!(verified.status, UserStatus::VerificationPending);

    let user = app.store.find_user(account.user.id).await.unwrap().unwrap();
    assert!(user.email_verified_at.is_some());

    let records = app
        .store
        .list_verification_records(account.user.id)
        .await
        .unwrap();
    let email_record = records
        .iter()
        .find(|r| r.verification_type == VerificationType::Email)
        .expect("EMAIL record should exist");
    assert_eq!(email_record.status, VerificationStatus::Approved);
}

#[tokio::test]
async fn test_token_can_only_be_used_once() {
    let app = TestApp::new();
    let (account, _) = app.register_influencer("Once Only").await;

    let issued = app
        .state
        .email_verification
        .resend(account.user.id)
        .await
        .unwrap();
    app.state.email_verification.verify(&issued.token).await.unwrap();

    let second = app.state.email_verification.verify(&issued.token).await;
    assert!(matches!(second, Err(ServiceError::AlreadyUsed)));
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = TestApp::new();
    let (account, _) = app.register_influencer("Late Clicker").await;

    let now = Utc::now();
    app.store
        .insert_email_token(NewEmailVerificationToken {
            id: Uuid::new_v4(),
            user_id: account.user.id,
            token_hash: hash_token("stale-token"),
            expires_at: now - Duration::minutes(1),
            created_at: now - Duration::hours(25),
        })
        .await
        .unwrap();

    let result = app.state.email_verification.verify("stale-token").await;
    assert!(matches!(result, Err(ServiceError::Expired)));

    let user = app.store.find_user(account.user.id).await.unwrap().unwrap();
    assert_eq!(user.status, UserStatus::Provisional);
    assert!(user.email_verified_at.is_none());
}

#[tokio::test]
async fn test_unknown_token_is_not_found() {
    let app = TestApp::new();
    let result = app.state.email_verification.verify("never-issued").await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_resend_leaves_exactly_one_unused_token() {
    let app = TestApp::new();
    let (account, _) = app.register_company("Resend Co").await;

    for _ in 0..3 {
        app.state
            .email_verification
            .resend(account.user.id)
            .await
            .unwrap();
    }

    let tokens = app.store.list_email_tokens(account.user.id).await.unwrap();
    let unused = tokens.iter().filter(|t| !t.is_used()).count();
    assert_eq!(unused, 1);
}

#[tokio::test]
async fn test_resend_for_verified_user_is_a_conflict() {
    let app = TestApp::new();
    let (account, _) = app.register_influencer("Already Done").await;

    let issued = app
        .state
        .email_verification
        .resend(account.user.id)
        .await
        .unwrap();
    app.state.email_verification.verify(&issued.token).await.unwrap();

    let result = app.state.email_verification.resend(account.user.id).await;
    assert!(matches!(result, Err(ServiceError::Conflict(_))));
}

#[tokio::test]
async fn test_verify_email_endpoint_maps_token_errors_to_bad_request() {
    let app = TestApp::new();
    let (account, _) = app.register_influencer("Http Verifier").await;
    let issued = app
        .state
        .email_verification
        .resend(account.user.id)
        .await
        .unwrap();

    let uri = format!("/api/auth/verify-email?token={}", issued.token);
    let response = app.get(&uri).send().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await;
    assert_eq!(body["data"]["status"], "VERIFICATION_PENDING");

    let reused = app.get(&uri).send().await;
    assert_eq!(reused.status(), StatusCode::BAD_REQUEST);
    let body: Value = reused.json().await;
    assert_eq!(body["code"], "TOKEN_ALREADY_USED");

    let unknown = app.get("/api/auth/verify-email?token=bogus").send().await;
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_resend_endpoint_never_reveals_accounts() {
    let app = TestApp::new();

    let response = app
        .post("/api/auth/resend-verification")
        .json(&json!({ "email": "nobody@example.com" }))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await;
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_resend_endpoint_accepts_missing_and_malformed_bodies() {
    let app = TestApp::new();

    let missing = app.post("/api/auth/resend-verification").send().await;
    assert_eq!(missing.status(), StatusCode::OK);

    let malformed = app
        .post("/api/auth/resend-verification")
        .raw_json("{not json")
        .send()
        .await;
    assert_eq!(malformed.status(), StatusCode::OK);
    let body: Value = malformed.json().await;
    assert_eq!(body["success"], true);

    let no_email = app
        .post("/api/auth/resend-verification")
        .json(&json!({}))
        .send()
        .await;
    assert_eq!(no_email.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_resend_endpoint_reissues_for_unverified_accounts() {
    let app = TestApp::new();
    let (account, _) = app.register_influencer("Lost Link").await;
    let before = app.store.list_email_tokens(account.user.id).await.unwrap();

    let response = app
        .post("/api/auth/resend-verification")
        .json(&json!({ "email": account.user.email }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let after = app.store.list_email_tokens(account.user.id).await.unwrap();
    assert_eq!(after.len(), 1);
    assert!(before.iter().all(|old| old.id != after[0].id));
}
