// Common test utilities and helper structs
// Shared across all test files to avoid duplication

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use marketplace_backend::{
    app::AppState,
    app_config::AppConfig,
    build_router,
    models::{Actor, Company, Influencer, NewProfile, NewUser, User, UserRole},
    services::account::RegisterRequest,
    store::{MemoryStore, SharedStore},
    utils::password::PasswordConfig,
};
use serde::Serialize;
use std::sync::Arc;
use tower::util::ServiceExt;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "Str0ng!Passw0rd";

/// Argon2 parameters small enough to keep the suite fast
pub fn fast_password_config() -> PasswordConfig {
    PasswordConfig {
        memory_cost: 8,
        time_cost: 1,
        parallelism: 1,
        output_length: 32,
    }
}

pub fn unique_email(prefix: &str) -> String {
    format!("{}_{}@example.com", prefix, Uuid::new_v4().simple())
}

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub store: SharedStore,
}

/// A registered account together with a valid bearer token
pub struct TestAccount {
    pub user: User,
    pub token: String,
}

impl TestAccount {
    pub fn actor(&self) -> Actor {
        Actor::new(self.user.id, self.user.role)
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::for_test())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let state =
            AppState::with_password_config(store.clone(), Arc::new(config), fast_password_config())
                .expect("test state should build");

        Self {
            app: build_router(state.clone()),
            state,
            store,
        }
    }

    /// Send a POST request
    pub fn post(&self, uri: &str) -> TestRequest<'_> {
        TestRequest::new(self, "POST", uri)
    }

    /// Send a GET request
    pub fn get(&self, uri: &str) -> TestRequest<'_> {
        TestRequest::new(self, "GET", uri)
    }

    /// Send a PUT request
    pub fn put(&self, uri: &str) -> TestRequest<'_> {
        TestRequest::new(self, "PUT", uri)
    }

    pub fn token_for(&self, user: &User) -> String {
        self.state
            .jwt
            .generate_access_token(user)
            .expect("token should be issued")
    }

    pub async fn register_company(&self, company_name: &str) -> (TestAccount, Company) {
        let account = self
            .register(UserRole::Company, Some(company_name), None)
            .await;
        let company = self
            .store
            .find_company_by_user(account.user.id)
            .await
            .unwrap()
            .expect("company profile should exist");
        (account, company)
    }

    pub async fn register_influencer(&self, display_name: &str) -> (TestAccount, Influencer) {
        let account = self
            .register(UserRole::Influencer, None, Some(display_name))
            .await;
        let influencer = self
            .store
            .find_influencer_by_user(account.user.id)
            .await
            .unwrap()
            .expect("influencer profile should exist");
        (account, influencer)
    }

    /// Admins cannot self-register, so they are inserted directly
    pub async fn create_admin(&self) -> TestAccount {
        let new_user = NewUser::new(
            &unique_email("admin"),
            "not-a-real-hash".to_string(),
            UserRole::Admin,
        );
        let user = self
            .store
            .create_account(new_user, NewProfile::None)
            .await
            .unwrap();
        let token = self.token_for(&user);
        TestAccount { user, token }
    }

    async fn register(
        &self,
        role: UserRole,
        company_name: Option<&str>,
        display_name: Option<&str>,
    ) -> TestAccount {
        let registered = self
            .state
            .accounts
            .register(RegisterRequest {
                email: unique_email(&role.to_string().to_lowercase()),
                password: TEST_PASSWORD.to_string(),
                role,
                company_name: company_name.map(str::to_string),
                display_name: display_name.map(str::to_string),
            })
            .await
            .expect("registration should succeed");

        let token = self.token_for(&registered.user);
        TestAccount {
            user: registered.user,
            token,
        }
    }
}

/// Test request builder
pub struct TestRequest<'a> {
    app: &'a TestApp,
    method: &'static str,
    uri: String,
    bearer: Option<String>,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl<'a> TestRequest<'a> {
    fn new(app: &'a TestApp, method: &'static str, uri: &str) -> Self {
        Self {
            app,
            method,
            uri: uri.to_string(),
            bearer: None,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Add JSON body to request
    pub fn json<T: Serialize>(mut self, body: &T) -> Self {
        self.body = Some(serde_json::to_vec(body).unwrap());
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Send raw bytes as a JSON body
    pub fn raw_json(mut self, body: &str) -> Self {
        self.body = Some(body.as_bytes().to_vec());
        self
    }

    pub fn bearer(mut self, token: &str) -> Self {
        self.bearer = Some(token.to_string());
        self
    }

    /// Send the request
    pub async fn send(self) -> TestResponse {
        let mut builder = Request::builder().method(self.method).uri(&self.uri);
        if let Some(token) = &self.bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let request = match self.body {
            Some(bytes) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(bytes))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.app.clone().oneshot(request).await.unwrap();

        TestResponse { response }
    }
}

/// Test response wrapper
pub struct TestResponse {
    response: Response<Body>,
}

impl TestResponse {
    /// Get status code
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    /// Parse JSON response
    pub async fn json<T: serde::de::DeserializeOwned>(self) -> T {
        let body = axum::body::to_bytes(self.response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    /// Get response body as text
    pub async fn text(self) -> String {
        let body = axum::body::to_bytes(self.response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }
}
