use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use hyper::{Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::json;
use tokio::net::TcpStream;

use server::auth::{Clock, StaticCredentialVerifier, TokenService};
use server::{AppState, Application};
use shared::config::parse_config;
use shared::types::AppConfig;

pub const SECRET: &str = "integration-secret-0123456789abcdef";
pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "pass123";

/// Response reduced to what the assertions look at.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: hyper::HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("response body is not JSON")
    }
}

pub struct TestApp {
    pub address: SocketAddr,
    pub config: AppConfig,
}

pub fn test_config() -> AppConfig {
    parse_config(&format!(
        "[server]\nbind = \"127.0.0.1\"\nport = 0\nrequest_timeout_secs = 5\n\n\
         [auth]\njwt_secret = \"{}\"\ntoken_expiry_minutes = 10\n",
        SECRET
    ))
    .expect("test config is valid")
}

impl TestApp {
    pub async fn new() -> Self {
        let config = test_config();
        let state = AppState::from_config(config.clone()).expect("failed to build state");
        Self::spawn(state, config).await
    }

    /// Serve with tokens whose clock is pinned at `now`.
    pub async fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let config = test_config();
        let tokens = Arc::new(TokenService::with_clock(
            secret(&config).as_bytes(),
            Duration::from_secs(config.auth.token_expiry_secs()),
            Duration::from_secs(config.auth.clock_skew_secs),
            clock,
        ));
        let verifier = Arc::new(
            StaticCredentialVerifier::new(USERNAME, PASSWORD).expect("failed to hash password"),
        );
        let state = AppState::new(config.clone(), tokens, verifier);
        Self::spawn(state, config).await
    }

    async fn spawn(state: AppState, config: AppConfig) -> Self {
        let app = Application::build(state, "127.0.0.1:0")
            .await
            .expect("failed binding to an ephemeral port");
        let address = app.local_addr().expect("listener has an address");

        tokio::spawn(async move {
            if let Err(e) = app.run().await {
                eprintln!("Test server error: {}", e);
            }
        });

        TestApp { address, config }
    }

    /// A token service sharing this server's secret but driven by `clock`.
    pub fn token_service(&self, clock: Arc<dyn Clock>) -> TokenService {
        TokenService::with_clock(
            secret(&self.config).as_bytes(),
            Duration::from_secs(self.config.auth.token_expiry_secs()),
            Duration::ZERO,
            clock,
        )
    }

    pub async fn send(
        &self,
        method: Method,
        path: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> TestResponse {
        let stream = TcpStream::connect(self.address)
            .await
            .expect("failed to connect to test server");
        let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
            .await
            .expect("handshake failed");
        tokio::spawn(async move {
            let _ = conn.await;
        });

        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header("host", self.address.to_string());
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let req = builder
            .body(Full::new(Bytes::from(body.to_string())))
            .expect("failed to build request");

        let res = sender.send_request(req).await.expect("request failed");
        let status = res.status();
        let headers = res.headers().clone();
        let bytes = res
            .into_body()
            .collect()
            .await
            .expect("failed to read body")
            .to_bytes();

        TestResponse {
            status,
            headers,
            body: String::from_utf8(bytes.to_vec()).expect("body is not UTF-8"),
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        let body = json!({ "username": username, "password": password }).to_string();
        self.send(
            Method::POST,
            "/auth/login",
            &[(CONTENT_TYPE.as_str(), "application/json")],
            &body,
        )
        .await
    }

    /// Log in with the configured account and return the issued token.
    pub async fn token(&self) -> String {
        let res = self.login(USERNAME, PASSWORD).await;
        assert_eq!(res.status, StatusCode::OK, "login failed: {}", res.body);
        res.body
    }

    pub async fn get(&self, path: &str, authorization: Option<&str>) -> TestResponse {
        match authorization {
            Some(value) => {
                self.send(Method::GET, path, &[(AUTHORIZATION.as_str(), value)], "")
                    .await
            }
            None => self.send(Method::GET, path, &[], "").await,
        }
    }

    pub async fn get_with_bearer(&self, path: &str, token: &str) -> TestResponse {
        let value = format!("Bearer {}", token);
        self.get(path, Some(&value)).await
    }
}

fn secret(config: &AppConfig) -> String {
    config
        .auth
        .resolved_jwt_secret()
        .expect("test config carries a secret")
}

/// Clock frozen at a fixed instant.
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.0
    }
}

pub fn header<'a>(res: &'a TestResponse, name: &str) -> Option<&'a str> {
    res.headers
        .get(name)
        .map(HeaderValue::to_str)
        .and_then(Result::ok)
}
