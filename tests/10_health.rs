mod common;

use anyhow::Result;
use axum::http::StatusCode;

#[tokio::test]
async fn health_endpoint_pings_store() -> Result<()> {
    let app = common::TestApp::new();
    let res = app.get("/health").await?;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "ok");
    assert_eq!(res.body["database"], "journal_test");
    Ok(())
}

#[tokio::test]
async fn api_banner() -> Result<()> {
    let app = common::TestApp::new();
    for path in ["/api/", "/api"] {
        let res = app.get(path).await?;
        assert_eq!(res.status, StatusCode::OK, "{}", path);
        assert_eq!(res.body["message"], "Average2Epic API");
    }
    Ok(())
}

#[tokio::test]
async fn unknown_route_is_404() -> Result<()> {
    let app = common::TestApp::new();
    let res = app.get("/api/nope").await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}
