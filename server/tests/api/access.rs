use std::sync::Arc;

use hyper::StatusCode;

use crate::helpers::{FixedClock, TestApp, header};

#[tokio::test]
async fn public_is_open_to_everyone() {
    let app = TestApp::new().await;

    let res = app.get("/public", None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, "Public OK");
}

#[tokio::test]
async fn public_ignores_a_garbage_token() {
    let app = TestApp::new().await;

    let res = app.get_with_bearer("/public", "garbage").await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, "Public OK");
}

#[tokio::test]
async fn secure_without_a_token_is_unauthorized() {
    let app = TestApp::new().await;

    let res = app.get("/secure", None).await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json()["code"], "UNAUTHORIZED");
    assert_eq!(header(&res, "www-authenticate"), Some("Bearer"));
}

#[tokio::test]
async fn secure_with_other_scheme_is_unauthorized() {
    let app = TestApp::new().await;
    let token = app.token().await;

    let res = app.get("/secure", Some(&format!("Basic {}", token))).await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json()["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn secure_with_malformed_token_is_rejected() {
    let app = TestApp::new().await;

    let res = app.get_with_bearer("/secure", "not-a-token").await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    let body = res.json();
    assert_eq!(body["code"], "INVALID_TOKEN");
    assert_eq!(body["message"], "Invalid JWT");
}

#[tokio::test]
async fn secure_with_tampered_token_is_rejected() {
    let app = TestApp::new().await;
    let token = app.token().await;

    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    let first = if parts[2].starts_with('A') { "B" } else { "A" };
    parts[2].replace_range(0..1, first);
    let tampered = parts.join(".");

    let res = app.get_with_bearer("/secure", &tampered).await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json()["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn secure_with_expired_token_is_rejected() {
    let app = TestApp::new().await;
    let issued_long_ago = app
        .token_service(Arc::new(FixedClock(1_000_000)))
        .generate_token("admin")
        .unwrap();

    let res = app.get_with_bearer("/secure", &issued_long_ago).await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json()["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn token_expires_against_the_server_clock() {
    let app = TestApp::with_clock(Arc::new(FixedClock(2_000_000_000))).await;
    let stale = app
        .token_service(Arc::new(FixedClock(2_000_000_000 - 601)))
        .generate_token("admin")
        .unwrap();
    let fresh = app
        .token_service(Arc::new(FixedClock(2_000_000_000 - 600)))
        .generate_token("admin")
        .unwrap();

    assert_eq!(
        app.get_with_bearer("/secure", &stale).await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        app.get_with_bearer("/secure", &fresh).await.status,
        StatusCode::OK
    );
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let app = TestApp::new().await;

    let res = app.get("/nope", None).await;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json()["code"], "NOT_FOUND");
}

#[tokio::test]
async fn health_reports_ok() {
    let app = TestApp::new().await;

    let res = app.get("/health", None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["health"], "ok");
}
