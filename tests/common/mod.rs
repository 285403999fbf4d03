#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use epic_journal_api::{
    app,
    auth::digest_passphrase,
    config::{AppConfig, ADMIN_IDENTITY, READONLY_IDENTITY},
    database::MemoryStore,
    AppState,
};

pub const ADMIN_PASSPHRASE: &str = "test-admin-passphrase";
pub const READONLY_PASSPHRASE: &str = "test-readonly-passphrase";

/// The full router over a fresh in-memory store. Each test gets its own.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub state: AppState,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new("journal_test"));
        let state = AppState::new(config, store.clone());
        Self { router: app(state.clone()), store, state }
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(path);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await.context("router failed")?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        Ok(TestResponse { status, body })
    }

    pub async fn get(&self, path: &str) -> Result<TestResponse> {
        self.request(Method::GET, path, None, &[]).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<TestResponse> {
        self.request(Method::POST, path, Some(body), &[]).await
    }

    /// Create the admin account and return a session token for it
    pub async fn admin_token(&self) -> Result<String> {
        let credentials = serde_json::json!({ "username": "admin", "password": "epic2025" });
        let created = self.post("/api/admin/create", credentials.clone()).await?;
        anyhow::ensure!(created.status == StatusCode::OK, "admin create failed: {}", created.body);

        let login = self.post("/api/admin/login", credentials).await?;
        login.body["token"]
            .as_str()
            .map(str::to_string)
            .context("login returned no token")
    }

    pub async fn with_bearer(
        &self,
        method: Method,
        path: &str,
        token: &str,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        let auth = format!("Bearer {}", token);
        self.request(method, path, body, &[("authorization", auth.as_str())]).await
    }

    pub async fn gateway(&self, method: Method, path: &str, identity: &str, passphrase: &str, body: Option<Value>) -> Result<TestResponse> {
        let key = digest_passphrase(passphrase);
        self.request(method, path, body, &[("x-api-user", identity), ("x-api-key", key.as_str())]).await
    }

    pub async fn as_admin_key(&self, method: Method, path: &str, body: Option<Value>) -> Result<TestResponse> {
        self.gateway(method, path, ADMIN_IDENTITY, ADMIN_PASSPHRASE, body).await
    }

    pub async fn as_readonly_key(&self, method: Method, path: &str, body: Option<Value>) -> Result<TestResponse> {
        self.gateway(method, path, READONLY_IDENTITY, READONLY_PASSPHRASE, body).await
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.jwt_secret = "integration-test-secret".to_string();
    for principal in &mut config.gateway.principals {
        principal.passphrase = Some(
            if principal.identity == ADMIN_IDENTITY { ADMIN_PASSPHRASE } else { READONLY_PASSPHRASE }.to_string(),
        );
    }
    config
}

pub fn video(day: i64, reflection: &str, tags: &[&str]) -> Value {
    serde_json::json!({
        "title": format!("Day {} workout", day),
        "youtubeId": format!("yt{}", day),
        "embedUrl": format!("https://www.youtube.com/embed/yt{}", day),
        "day": day,
        "date": "2025-01-05",
        "reflection": reflection,
        "tags": tags
    })
}
