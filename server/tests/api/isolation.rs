use std::sync::Arc;

use hyper::StatusCode;
use server::auth::SystemClock;

use crate::helpers::TestApp;

#[tokio::test]
async fn me_reports_the_token_subject() {
    let app = TestApp::new().await;
    let token = app.token().await;

    let res = app.get_with_bearer("/auth/me", &token).await;

    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["username"], "admin");
    assert_eq!(body["roles"], serde_json::json!(["USER"]));
    assert_eq!(body["client_ip"], "127.0.0.1");
}

#[tokio::test]
async fn identity_does_not_leak_between_requests() {
    let app = TestApp::new().await;
    let token = app.token().await;

    let authed = app.get_with_bearer("/auth/me", &token).await;
    let anonymous = app.get("/auth/me", None).await;

    assert_eq!(authed.status, StatusCode::OK);
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_see_only_their_own_principal() {
    let app = Arc::new(TestApp::new().await);
    let issuer = app.token_service(Arc::new(SystemClock));
    let tokens: Vec<(String, String)> = (0..16)
        .map(|i| {
            let name = format!("user-{}", i);
            let token = issuer.generate_token(&name).unwrap();
            (name, token)
        })
        .collect();

    let mut handles = Vec::new();
    for (i, (name, token)) in tokens.into_iter().enumerate() {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                let res = app.get_with_bearer("/auth/me", &token).await;
                assert_eq!(res.status, StatusCode::OK);
                assert_eq!(res.json()["username"], name.as_str());
            } else {
                let res = app.get("/auth/me", None).await;
                assert_eq!(res.status, StatusCode::UNAUTHORIZED);
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }
}
