mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use serde_json::json;

#[tokio::test]
async fn login_issues_token_that_verify_accepts() -> Result<()> {
    let app = common::TestApp::new();
    let token = app.admin_token().await?;

    let res = app.with_bearer(Method::POST, "/api/admin/verify", &token, None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!({ "valid": true, "user": { "username": "admin" } }));
    Ok(())
}

#[tokio::test]
async fn login_response_shape() -> Result<()> {
    let app = common::TestApp::new();
    app.admin_token().await?;

    let res = app
        .post("/api/admin/login", json!({ "username": "admin", "password": "epic2025" }))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.body["user"], json!({ "username": "admin" }));
    assert!(res.body["token"].as_str().is_some_and(|t| t.split('.').count() == 3));
    Ok(())
}

#[tokio::test]
async fn bad_credentials_are_401() -> Result<()> {
    let app = common::TestApp::new();
    app.admin_token().await?;

    for body in [
        json!({ "username": "admin", "password": "wrong" }),
        json!({ "username": "nobody", "password": "epic2025" }),
    ] {
        let res = app.post("/api/admin/login", body).await?;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
        assert_eq!(res.body["detail"], "Invalid username or password");
    }
    Ok(())
}

#[tokio::test]
async fn expired_and_forged_tokens_get_the_same_401() -> Result<()> {
    let app = common::TestApp::new();
    let tokens = app.state.admins.tokens();
    let expired = tokens.issue_at("admin", Utc::now() - Duration::days(31))?;
    let forged = epic_journal_api::auth::TokenService::new("other-secret", Duration::days(30)).issue("admin")?;

    let a = app.with_bearer(Method::POST, "/api/admin/verify", &expired, None).await?;
    let b = app.with_bearer(Method::POST, "/api/admin/verify", &forged, None).await?;
    assert_eq!(a.status, StatusCode::UNAUTHORIZED);
    assert_eq!(b.status, StatusCode::UNAUTHORIZED);
    assert_eq!(a.body, b.body);
    assert_eq!(a.body["detail"], "Invalid authentication credentials");
    Ok(())
}

#[tokio::test]
async fn verify_without_token_is_401() -> Result<()> {
    let app = common::TestApp::new();
    let res = app.request(Method::POST, "/api/admin/verify", None, &[]).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app
        .request(Method::POST, "/api/admin/verify", None, &[("authorization", "Basic abc")])
        .await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn duplicate_admin_is_400() -> Result<()> {
    let app = common::TestApp::new();
    app.admin_token().await?;

    let res = app
        .post("/api/admin/create", json!({ "username": "admin", "password": "again" }))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["detail"], "Admin already exists");
    Ok(())
}

#[tokio::test]
async fn invalid_admin_payloads_are_400() -> Result<()> {
    let app = common::TestApp::new();
    for body in [
        json!({ "username": "ab", "password": "x" }),
        json!({ "username": "admin", "password": "" }),
        json!({ "username": "admin" }),
    ] {
        let res = app.post("/api/admin/create", body.clone()).await?;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{}", body);
    }
    Ok(())
}

#[tokio::test]
async fn admin_creation_can_be_disabled() -> Result<()> {
    let mut config = common::test_config();
    config.security.allow_admin_create = false;
    let app = common::TestApp::with_config(config);

    let res = app
        .post("/api/admin/create", json!({ "username": "admin", "password": "epic2025" }))
        .await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    Ok(())
}
