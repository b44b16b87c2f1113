use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use uae_trails_api::domain::entities::User;
use uae_trails_api::domain::repositories::UserRepository;
use uae_trails_api::domain::value_objects::{Email, UserRole};
use uae_trails_api::infrastructure::auth::hash_password;
use uae_trails_api::infrastructure::persistence::InMemoryStore;
use uae_trails_api::{create_app, AppState, Repositories};

use super::fixtures::{self, RecordingStorage, PASSWORD};

/// Full application stack over the in-memory store
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::new(
            fixtures::config(),
            Repositories::in_memory(Arc::new(InMemoryStore::new())),
            Arc::new(RecordingStorage),
        );
        Self { router: create_app(state.clone()), state }
    }

    /// Insert an account directly, bypassing registration
    pub async fn seed_user(&self, email: &str, role: UserRole) -> User {
        let user = User::new(
            Email::parse(email).unwrap(),
            hash_password(PASSWORD).unwrap(),
            "Seeded User".to_string(),
            role,
        );
        self.state.users.create(&user).await.unwrap();
        user
    }

    /// Log in a seeded account through the API and return the access token
    pub async fn login(&self, email: &str) -> String {
        self.login_with(email, PASSWORD).await
    }

    pub async fn login_with(&self, email: &str, password: &str) -> String {
        let response = self
            .request(Method::POST, "/api/v1/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await;
        response.assert_status(StatusCode::OK);
        response.json()["tokens"]["accessToken"].as_str().unwrap().to_string()
    }

    /// Seed an admin and return their token
    pub async fn admin_token(&self) -> String {
        self.seed_user("admin@trails.test", UserRole::Admin).await;
        self.login("admin@trails.test").await
    }

    pub fn request(&self, method: Method, path: &str) -> TestRequest<'_> {
        TestRequest {
            app: self,
            builder: Request::builder().method(method).uri(path),
            body: Body::empty(),
        }
    }

    pub async fn get(&self, path: &str, token: &str) -> TestResponse {
        self.request(Method::GET, path).bearer(token).send().await
    }
}

pub struct TestRequest<'a> {
    app: &'a TestApp,
    builder: axum::http::request::Builder,
    body: Body,
}

impl TestRequest<'_> {
    pub fn bearer(mut self, token: &str) -> Self {
        self.builder = self.builder.header("authorization", format!("Bearer {token}"));
        self
    }

    pub fn tenant(mut self, tenant_id: &str) -> Self {
        self.builder = self.builder.header("x-tenant-id", tenant_id);
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    pub fn json(mut self, body: &Value) -> Self {
        self.builder = self.builder.header("content-type", "application/json");
        self.body = Body::from(body.to_string());
        self
    }

    pub fn raw(mut self, content_type: &str, body: &str) -> Self {
        self.builder = self.builder.header("content-type", content_type);
        self.body = Body::from(body.to_string());
        self
    }

    pub async fn send(self) -> TestResponse {
        let request = self.builder.body(self.body).unwrap();
        let response = self.app.router.clone().oneshot(request).await.unwrap();
        TestResponse::new(response).await
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    async fn new(response: axum::response::Response) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();

        Self { status, headers, body }
    }

    pub fn assert_status(&self, expected: StatusCode) {
        assert_eq!(self.status, expected, "Response body: {}", self.body);
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }

    /// `error.code` of an error envelope
    pub fn error_code(&self) -> String {
        self.json()["error"]["code"].as_str().unwrap_or_default().to_string()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
