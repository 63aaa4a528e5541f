// Integration tests for invoicing

use axum::http::StatusCode;
use chrono::Duration;
use marketplace_backend::{
    models::{Influencer, InvoiceStatus, NotificationKind, Project},
    services::{
        billing::CreateInvoiceRequest, project::CreateProjectRequest, scout::SendScoutRequest,
    },
    utils::service_error::ServiceError,
};
use serde_json::{json, Value};

mod common;
use common::{TestAccount, TestApp};

struct MatchedProject {
    company: TestAccount,
    creator: TestAccount,
    influencer: Influencer,
    project: Project,
}

async fn unmatched_project(app: &TestApp, company: &TestAccount) -> Project {
    app.state
        .projects
        .create_project(
            company.actor(),
            CreateProjectRequest {
                title: "Holiday campaign".to_string(),
                description: String::new(),
                budget: 10_000,
                start_date: None,
                end_date: None,
            },
        )
        .await
        .unwrap()
}

async fn matched_project(app: &TestApp) -> MatchedProject {
    let (company, _) = app.register_company("Billing Co").await;
    let (creator, influencer) = app.register_influencer("Billing Creator").await;
    let project = unmatched_project(app, &company).await;

    let scout = app
        .state
        .scouts
        .send_scout_invitation(
            company.actor(),
            SendScoutRequest {
                project_id: project.id,
                influencer_id: influencer.id,
                message: None,
            },
        )
        .await
        .unwrap();
    let acceptance = app
        .state
        .scouts
        .accept_scout(creator.actor(), scout.id)
        .await
        .unwrap();

    MatchedProject {
        company,
        creator,
        influencer,
        project: acceptance.project,
    }
}

#[tokio::test]
async fn test_invoice_is_issued_with_tax_and_due_date() {
    let app = TestApp::new();
    let matched = matched_project(&app).await;

    let invoice = app
        .state
        .billing
        .create_invoice(
            matched.creator.actor(),
            CreateInvoiceRequest {
                project_id: matched.project.id,
                amount: 10_000,
            },
        )
        .await
        .unwrap();

    assert_eq!(invoice.amount, 10_000);
    assert_eq!(invoice.tax, 1_000);
    assert_eq!(invoice.total_amount, 11_000);
    assert_eq!(invoice.status, InvoiceStatus::Pending);
    assert_eq!(invoice.influencer_id, matched.influencer.id);
    assert_eq!(invoice.due_date - invoice.created_at, Duration::days(30));
    assert!(invoice.invoice_number.starts_with("INV-"));
    assert!(invoice.paid_at.is_none());

    let company_notifications = app
        .state
        .notifications
        .list(matched.company.user.id, false)
        .await
        .unwrap();
    assert!(company_notifications
        .iter()
        .any(|n| n.notification_type == NotificationKind::InvoiceCreated));
}

#[tokio::test]
async fn test_paying_an_invoice_notifies_the_influencer() {
    let app = TestApp::new();
    let matched = matched_project(&app).await;
    let invoice = app
        .state
        .billing
        .issue_invoice(
            matched.project.id,
            matched.project.company_id,
            matched.influencer.id,
            10_000,
        )
        .await
        .unwrap();

    let paid = app
        .state
        .billing
        .mark_as_paid(matched.company.actor(), invoice.id)
        .await
        .unwrap();
    assert_eq!(paid.status, InvoiceStatus::Paid);
    assert!(paid.paid_at.is_some());

    let notifications = app
        .state
        .notifications
        .list(matched.creator.user.id, false)
        .await
        .unwrap();
    assert!(notifications
        .iter()
        .any(|n| n.notification_type == NotificationKind::InvoicePaid));

    let again = app
        .state
        .billing
        .mark_as_paid(matched.company.actor(), invoice.id)
        .await;
    assert!(matches!(again, Err(ServiceError::Conflict(_))));
}

#[tokio::test]
async fn test_only_the_billed_company_can_pay() {
    let app = TestApp::new();
    let matched = matched_project(&app).await;
    let (other_company, _) = app.register_company("Bystander Co").await;
    let invoice = app
        .state
        .billing
        .issue_invoice(
            matched.project.id,
            matched.project.company_id,
            matched.influencer.id,
            5_000,
        )
        .await
        .unwrap();

    let result = app
        .state
        .billing
        .mark_as_paid(other_company.actor(), invoice.id)
        .await;
    assert!(matches!(result, Err(ServiceError::Forbidden(_))));

    let by_influencer = app
        .state
        .billing
        .mark_as_paid(matched.creator.actor(), invoice.id)
        .await;
    assert!(matches!(by_influencer, Err(ServiceError::Forbidden(_))));
}

#[tokio::test]
async fn test_unmatched_project_cannot_be_invoiced() {
    let app = TestApp::new();
    let (company, _) = app.register_company("Early Co").await;
    let (creator, _) = app.register_influencer("Eager Creator").await;
    let project = unmatched_project(&app, &company).await;

    let result = app
        .state
        .billing
        .create_invoice(
            creator.actor(),
            CreateInvoiceRequest {
                project_id: project.id,
                amount: 1_000,
            },
        )
        .await;
    assert!(matches!(result, Err(ServiceError::BadRequest(_))));
}

#[tokio::test]
async fn test_only_the_matched_influencer_can_invoice() {
    let app = TestApp::new();
    let matched = matched_project(&app).await;
    let (outsider, _) = app.register_influencer("Outsider").await;

    let result = app
        .state
        .billing
        .create_invoice(
            outsider.actor(),
            CreateInvoiceRequest {
                project_id: matched.project.id,
                amount: 1_000,
            },
        )
        .await;
    assert!(matches!(result, Err(ServiceError::Forbidden(_))));
}

#[tokio::test]
async fn test_oversized_amount_is_rejected_without_overflow() {
    let app = TestApp::new();
    let matched = matched_project(&app).await;

    let result = app
        .state
        .billing
        .issue_invoice(
            matched.project.id,
            matched.project.company_id,
            matched.influencer.id,
            i64::MAX / 5,
        )
        .await;
    assert!(matches!(result, Err(ServiceError::Validation(_))));

    let near_limit = app
        .state
        .billing
        .issue_invoice(
            matched.project.id,
            matched.project.company_id,
            matched.influencer.id,
            i64::MAX - 1,
        )
        .await;
    assert!(matches!(near_limit, Err(ServiceError::Validation(_))));

    let response = app
        .post("/api/invoices")
        .bearer(&matched.creator.token)
        .json(&json!({ "project_id": matched.project.id, "amount": i64::MAX / 5 }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let invoices = app
        .state
        .billing
        .summary(matched.creator.actor())
        .await
        .unwrap();
    assert_eq!(invoices.invoice_count, 0);
}

#[tokio::test]
async fn test_overdue_only_applies_to_pending_invoices() {
    let app = TestApp::new();
    let matched = matched_project(&app).await;
    let invoice = app
        .state
        .billing
        .issue_invoice(
            matched.project.id,
            matched.project.company_id,
            matched.influencer.id,
            2_000,
        )
        .await
        .unwrap();

    let overdue = app.state.billing.mark_as_overdue(invoice.id).await.unwrap();
    assert_eq!(overdue.status, InvoiceStatus::Overdue);

    let again = app.state.billing.mark_as_overdue(invoice.id).await;
    assert!(matches!(again, Err(ServiceError::Conflict(_))));
}

#[tokio::test]
async fn test_earnings_summary_partitions_by_status() {
    let app = TestApp::new();
    let matched = matched_project(&app).await;
    let billing = &app.state.billing;

    let first = billing
        .issue_invoice(matched.project.id, matched.project.company_id, matched.influencer.id, 10_000)
        .await
        .unwrap();
    let second = billing
        .issue_invoice(matched.project.id, matched.project.company_id, matched.influencer.id, 20_000)
        .await
        .unwrap();
    billing
        .issue_invoice(matched.project.id, matched.project.company_id, matched.influencer.id, 30_000)
        .await
        .unwrap();

    billing
        .mark_as_paid(matched.company.actor(), first.id)
        .await
        .unwrap();
    billing.mark_as_overdue(second.id).await.unwrap();

    let summary = billing.summary(matched.creator.actor()).await.unwrap();
    assert_eq!(summary.invoice_count, 3);
    assert_eq!(summary.paid, 11_000);
    assert_eq!(summary.overdue, 22_000);
    assert_eq!(summary.pending, 33_000);
    assert_eq!(summary.total_earnings, 66_000);
}

#[tokio::test]
async fn test_invoice_flow_over_http() {
    let app = TestApp::new();
    let admin = app.create_admin().await;
    let matched = matched_project(&app).await;

    let created = app
        .post("/api/invoices")
        .bearer(&matched.creator.token)
        .json(&json!({ "project_id": matched.project.id, "amount": 10000 }))
        .send()
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let body: Value = created.json().await;
    assert_eq!(body["data"]["tax"], 1000);
    assert_eq!(body["data"]["total_amount"], 11000);
    assert_eq!(body["data"]["status"], "PENDING");
    let invoice_id = body["data"]["id"].as_str().unwrap().to_string();

    let zero = app
        .post("/api/invoices")
        .bearer(&matched.creator.token)
        .json(&json!({ "project_id": matched.project.id, "amount": 0 }))
        .send()
        .await;
    assert_eq!(zero.status(), StatusCode::BAD_REQUEST);

    let listed = app
        .get("/api/invoices")
        .bearer(&matched.company.token)
        .send()
        .await;
    assert_eq!(listed.status(), StatusCode::OK);
    let body: Value = listed.json().await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let overdue = app
        .put(&format!("/api/admin/invoices/{}/overdue", invoice_id))
        .bearer(&admin.token)
        .send()
        .await;
    assert_eq!(overdue.status(), StatusCode::OK);

    let paid = app
        .put(&format!("/api/invoices/{}/paid", invoice_id))
        .bearer(&matched.company.token)
        .send()
        .await;
    assert_eq!(paid.status(), StatusCode::OK);

    let paid_again = app
        .put(&format!("/api/invoices/{}/paid", invoice_id))
        .bearer(&matched.company.token)
        .send()
        .await;
    assert_eq!(paid_again.status(), StatusCode::CONFLICT);

    let summary = app
        .get("/api/invoices/summary")
        .bearer(&matched.creator.token)
        .send()
        .await;
    let body: Value = summary.json().await;
    assert_eq!(body["data"]["paid"], 11000);
}
