use hyper::{Method, StatusCode};

use crate::helpers::{PASSWORD, TestApp, USERNAME, header};

#[tokio::test]
async fn should_return_200_and_a_token_for_valid_credentials() {
    let app = TestApp::new().await;

    let res = app.login(USERNAME, PASSWORD).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body.split('.').count(), 3);
    assert!(!res.body.contains('='));
    assert!(header(&res, "content-type").unwrap().starts_with("text/plain"));
}

#[tokio::test]
async fn issued_token_opens_secure() {
    let app = TestApp::new().await;
    let token = app.token().await;

    let res = app.get_with_bearer("/secure", &token).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, "Secure OK (JWT required)");
}

#[tokio::test]
async fn should_return_401_for_wrong_password() {
    let app = TestApp::new().await;

    let res = app.login(USERNAME, "wrong").await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json()["code"], "INVALID_CREDENTIALS");
    assert_eq!(header(&res, "www-authenticate"), Some("Bearer"));
}

#[tokio::test]
async fn should_return_401_for_unknown_user() {
    let app = TestApp::new().await;

    let res = app.login("mallory", PASSWORD).await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json()["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn should_return_401_for_padded_username() {
    let app = TestApp::new().await;

    let res = app.login("  admin\t", PASSWORD).await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json()["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn should_return_401_for_empty_username() {
    let app = TestApp::new().await;

    let res = app.login("", PASSWORD).await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json()["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn should_return_400_for_missing_password() {
    let app = TestApp::new().await;

    let res = app
        .send(Method::POST, "/auth/login", &[], r#"{"username":"admin"}"#)
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["code"], "MISSING_FIELD");
}

#[tokio::test]
async fn should_return_400_for_malformed_body() {
    let app = TestApp::new().await;

    let res = app.send(Method::POST, "/auth/login", &[], "not json").await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["code"], "MALFORMED_BODY");
}

#[tokio::test]
async fn login_with_get_is_method_not_allowed() {
    let app = TestApp::new().await;

    let res = app.get("/auth/login", None).await;

    assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED);
}
