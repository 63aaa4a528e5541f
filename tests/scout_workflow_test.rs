// Integration tests for scouting and project matching

use axum::http::StatusCode;
use marketplace_backend::{
    app_config::AppConfig,
    models::{
        Company, MatchPolicy, NotificationKind, Project, ProjectStatus, ScoutStatus,
    },
    services::{project::CreateProjectRequest, scout::SendScoutRequest},
    utils::service_error::ServiceError,
};
use serde_json::{json, Value};

mod common;
use common::{TestAccount, TestApp};

async fn create_project(app: &TestApp, account: &TestAccount) -> Project {
    app.state
        .projects
        .create_project(
            account.actor(),
            CreateProjectRequest {
                title: "Spring launch".to_string(),
                description: "Short-form video campaign".to_string(),
                budget: 500_000,
                start_date: None,
                end_date: None,
            },
        )
        .await
        .unwrap()
}

fn scout_request(project: &Project, influencer_id: uuid::Uuid) -> SendScoutRequest {
    SendScoutRequest {
        project_id: project.id,
        influencer_id,
        message: Some("We love your content".to_string()),
    }
}

async fn company_with_project(app: &TestApp) -> (TestAccount, Company, Project) {
    let (account, company) = app.register_company("Scout Co").await;
    let project = create_project(app, &account).await;
    (account, company, project)
}

#[tokio::test]
async fn test_accepting_a_scout_matches_the_project() {
    let app = TestApp::new();
    let (company_account, _, project) = company_with_project(&app).await;
    let (creator_x, influencer_x) = app.register_influencer("Creator X").await;

    let scout = app
        .state
        .scouts
        .send_scout_invitation(company_account.actor(), scout_request(&project, influencer_x.id))
        .await
        .unwrap();
    assert_eq!(scout.status, ScoutStatus::Pending);

    let received = app
        .state
        .notifications
        .list(creator_x.user.id, false)
        .await
        .unwrap();
    assert!(received
        .iter()
        .any(|n| n.notification_type == NotificationKind::ScoutReceived));

    let acceptance = app
        .state
        .scouts
        .accept_scout(creator_x.actor(), scout.id)
        .await
        .unwrap();
    assert_eq!(acceptance.scout.status, ScoutStatus::Accepted);
    assert!(acceptance.scout.responded_at.is_some());
    assert_eq!(acceptance.project.matched_influencer_id, Some(influencer_x.id));
    assert_eq!(acceptance.project.status, ProjectStatus::Matched);

    let company_notifications = app
        .state
        .notifications
        .list(company_account.user.id, false)
        .await
        .unwrap();
    assert!(company_notifications
        .iter()
        .any(|n| n.notification_type == NotificationKind::ScoutAccepted));
}

#[tokio::test]
async fn test_last_accept_wins_by_default() {
    let app = TestApp::new();
    let (company_account, _, project) = company_with_project(&app).await;
    let (creator_x, influencer_x) = app.register_influencer("Creator X").await;
    let (creator_y, influencer_y) = app.register_influencer("Creator Y").await;

    let scout_x = app
        .state
        .scouts
        .send_scout_invitation(company_account.actor(), scout_request(&project, influencer_x.id))
        .await
        .unwrap();
    let scout_y = app
        .state
        .scouts
        .send_scout_invitation(company_account.actor(), scout_request(&project, influencer_y.id))
        .await
        .unwrap();

    app.state
        .scouts
        .accept_scout(creator_x.actor(), scout_x.id)
        .await
        .unwrap();
    let second = app
        .state
        .scouts
        .accept_scout(creator_y.actor(), scout_y.id)
        .await
        .unwrap();

    assert_eq!(second.project.matched_influencer_id, Some(influencer_y.id));
    let stored = app.store.find_project(project.id).await.unwrap().unwrap();
    assert_eq!(stored.matched_influencer_id, Some(influencer_y.id));
}

#[tokio::test]
async fn test_lock_on_first_match_refuses_second_acceptance() {
    let mut config = AppConfig::for_test();
    config.marketplace.scout_match_policy = MatchPolicy::LockOnFirstMatch;
    let app = TestApp::with_config(config);

    let (company_account, _, project) = company_with_project(&app).await;
    let (creator_x, influencer_x) = app.register_influencer("Creator X").await;
    let (creator_y, influencer_y) = app.register_influencer("Creator Y").await;

    let scout_x = app
        .state
        .scouts
        .send_scout_invitation(company_account.actor(), scout_request(&project, influencer_x.id))
        .await
        .unwrap();
    let scout_y = app
        .state
        .scouts
        .send_scout_invitation(company_account.actor(), scout_request(&project, influencer_y.id))
        .await
        .unwrap();

    app.state
        .scouts
        .accept_scout(creator_x.actor(), scout_x.id)
        .await
        .unwrap();
    let refused = app
        .state
        .scouts
        .accept_scout(creator_y.actor(), scout_y.id)
        .await;
    assert!(matches!(refused, Err(ServiceError::Conflict(_))));

    let stored = app.store.find_project(project.id).await.unwrap().unwrap();
    assert_eq!(stored.matched_influencer_id, Some(influencer_x.id));
    let scout_y = app.store.find_scout(scout_y.id).await.unwrap().unwrap();
    assert_eq!(scout_y.status, ScoutStatus::Pending);
}

#[tokio::test]
async fn test_duplicate_scout_is_a_conflict() {
    let app = TestApp::new();
    let (company_account, _, project) = company_with_project(&app).await;
    let (_, influencer) = app.register_influencer("Popular").await;

    app.state
        .scouts
        .send_scout_invitation(company_account.actor(), scout_request(&project, influencer.id))
        .await
        .unwrap();
    let duplicate = app
        .state
        .scouts
        .send_scout_invitation(company_account.actor(), scout_request(&project, influencer.id))
        .await;
    assert!(matches!(duplicate, Err(ServiceError::Conflict(_))));
}

#[tokio::test]
async fn test_only_the_project_owner_can_scout() {
    let app = TestApp::new();
    let (_, _, project) = company_with_project(&app).await;
    let (other_company, _) = app.register_company("Other Co").await;
    let (_, influencer) = app.register_influencer("Target").await;

    let result = app
        .state
        .scouts
        .send_scout_invitation(other_company.actor(), scout_request(&project, influencer.id))
        .await;
    assert!(matches!(result, Err(ServiceError::Forbidden(_))));
}

#[tokio::test]
async fn test_influencers_get_a_message_matching_the_denied_action() {
    let app = TestApp::new();
    let (_, _, project) = company_with_project(&app).await;
    let (creator, influencer) = app.register_influencer("Wrong Side").await;

    let send = app
        .state
        .scouts
        .send_scout_invitation(creator.actor(), scout_request(&project, influencer.id))
        .await;
    match send {
        Err(ServiceError::Forbidden(message)) => assert!(message.contains("send")),
        other => panic!("expected Forbidden, got {:?}", other),
    }

    let listed = app
        .get("/api/scouts/sent")
        .bearer(&creator.token)
        .send()
        .await;
    assert_eq!(listed.status(), StatusCode::FORBIDDEN);
    let body: Value = listed.json().await;
    let message = body["error"].as_str().unwrap_or_default();
    assert!(message.contains("list"), "unexpected message: {}", message);
    assert!(!message.contains("send"));
}

#[tokio::test]
async fn test_only_the_invited_influencer_can_respond() {
    let app = TestApp::new();
    let (company_account, _, project) = company_with_project(&app).await;
    let (_, invited) = app.register_influencer("Invited").await;
    let (stranger, _) = app.register_influencer("Stranger").await;

    let scout = app
        .state
        .scouts
        .send_scout_invitation(company_account.actor(), scout_request(&project, invited.id))
        .await
        .unwrap();

    let result = app.state.scouts.accept_scout(stranger.actor(), scout.id).await;
    assert!(matches!(result, Err(ServiceError::Forbidden(_))));
}

#[tokio::test]
async fn test_a_scout_can_only_be_answered_once() {
    let app = TestApp::new();
    let (company_account, _, project) = company_with_project(&app).await;
    let (creator, influencer) = app.register_influencer("Decisive").await;

    let scout = app
        .state
        .scouts
        .send_scout_invitation(company_account.actor(), scout_request(&project, influencer.id))
        .await
        .unwrap();

    let rejected = app
        .state
        .scouts
        .reject_scout(creator.actor(), scout.id, Some("Fully booked".to_string()))
        .await
        .unwrap();
    assert_eq!(rejected.status, ScoutStatus::Rejected);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("Fully booked"));

    let accept = app.state.scouts.accept_scout(creator.actor(), scout.id).await;
    assert!(matches!(accept, Err(ServiceError::Conflict(_))));
    let reject = app
        .state
        .scouts
        .reject_scout(creator.actor(), scout.id, None)
        .await;
    assert!(matches!(reject, Err(ServiceError::Conflict(_))));
}

#[tokio::test]
async fn test_scout_listings_filter_by_status() {
    let app = TestApp::new();
    let (company_account, _, project) = company_with_project(&app).await;
    let (creator_a, influencer_a) = app.register_influencer("A").await;
    let (_, influencer_b) = app.register_influencer("B").await;

    let scout_a = app
        .state
        .scouts
        .send_scout_invitation(company_account.actor(), scout_request(&project, influencer_a.id))
        .await
        .unwrap();
    app.state
        .scouts
        .send_scout_invitation(company_account.actor(), scout_request(&project, influencer_b.id))
        .await
        .unwrap();
    app.state
        .scouts
        .accept_scout(creator_a.actor(), scout_a.id)
        .await
        .unwrap();

    let pending = app
        .get("/api/scouts/sent?status=PENDING")
        .bearer(&company_account.token)
        .send()
        .await;
    assert_eq!(pending.status(), StatusCode::OK);
    let body: Value = pending.json().await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let all = app
        .get("/api/scouts/sent")
        .bearer(&company_account.token)
        .send()
        .await;
    let body: Value = all.json().await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let received = app
        .get("/api/scouts/received?status=ACCEPTED")
        .bearer(&creator_a.token)
        .send()
        .await;
    let body: Value = received.json().await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_scout_flow_over_http() {
    let app = TestApp::new();
    let (company_account, _) = app.register_company("Http Scout Co").await;
    let (creator, influencer) = app.register_influencer("Http Creator").await;

    let created = app
        .post("/api/projects")
        .bearer(&company_account.token)
        .json(&json!({ "title": "Summer drop", "description": "Reels", "budget": 120000 }))
        .send()
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let body: Value = created.json().await;
    let project_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["status"], "PENDING");

    let sent = app
        .post("/api/scouts")
        .bearer(&company_account.token)
        .json(&json!({ "project_id": project_id, "influencer_id": influencer.id }))
        .send()
        .await;
    assert_eq!(sent.status(), StatusCode::CREATED);
    let body: Value = sent.json().await;
    let scout_id = body["data"]["id"].as_str().unwrap().to_string();

    let duplicate = app
        .post("/api/scouts")
        .bearer(&company_account.token)
        .json(&json!({ "project_id": project_id, "influencer_id": influencer.id }))
        .send()
        .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let wrong_caller = app
        .put(&format!("/api/scouts/{}/accept", scout_id))
        .bearer(&company_account.token)
        .send()
        .await;
    assert_eq!(wrong_caller.status(), StatusCode::FORBIDDEN);

    let accepted = app
        .put(&format!("/api/scouts/{}/accept", scout_id))
        .bearer(&creator.token)
        .send()
        .await;
    assert_eq!(accepted.status(), StatusCode::OK);
    let body: Value = accepted.json().await;
    assert_eq!(body["data"]["scout"]["status"], "ACCEPTED");
    assert_eq!(
        body["data"]["project"]["matched_influencer_id"],
        json!(influencer.id)
    );

    let in_progress = app
        .put(&format!("/api/projects/{}/status", project_id))
        .bearer(&company_account.token)
        .json(&json!({ "status": "IN_PROGRESS" }))
        .send()
        .await;
    assert_eq!(in_progress.status(), StatusCode::OK);

    let backwards = app
        .put(&format!("/api/projects/{}/status", project_id))
        .bearer(&company_account.token)
        .json(&json!({ "status": "PENDING" }))
        .send()
        .await;
    assert_eq!(backwards.status(), StatusCode::BAD_REQUEST);

    let visible = app
        .get(&format!("/api/projects/{}", project_id))
        .bearer(&creator.token)
        .send()
        .await;
    assert_eq!(visible.status(), StatusCode::OK);
}
