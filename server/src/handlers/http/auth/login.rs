use anyhow::Result;
use http_body_util::{BodyExt, Limited};
use hyper::{Request, Response, StatusCode};
use serde::Deserialize;
use tracing::{error, info, warn};

use shared::types::{Credentials, LoginError};

use crate::AppState;
use crate::auth::CredentialError;
use crate::handlers::http::utils::{deliver_error_json, deliver_text, deliver_unauthorized};
use crate::handlers::http::{RequestBody, ResponseBody};

/// Upper bound on a login request body.
const MAX_LOGIN_BODY: usize = 16 * 1024;

/// Login body as received; fields are optional so a missing one can be named
/// in the error instead of failing the whole parse.
#[derive(Debug, Deserialize)]
struct LoginBody {
    username: Option<String>,
    password: Option<String>,
}

/// Main login handler
///
/// Answers 200 with the issued token as a plain-text body. Every failure is a
/// typed `LoginError`: bad credentials are 401, unusable input 400, and
/// internal faults 500.
pub async fn handle_login(
    req: Request<RequestBody>,
    state: AppState,
) -> Result<Response<ResponseBody>> {
    info!("Processing login request");

    let credentials = match parse_login_body(req).await {
        Ok(credentials) => credentials,
        Err(login_error) => {
            warn!("Login parsing failed: {}", login_error.to_code());
            return deliver_login_error(&login_error);
        }
    };

    match attempt_login(&credentials, &state).await {
        Ok(token) => {
            info!("User logged in successfully: {}", credentials.username);
            deliver_text(token, StatusCode::OK)
        }
        Err(login_error) => {
            warn!(
                "Login failed for {}: {}",
                credentials.username,
                login_error.to_code()
            );
            deliver_login_error(&login_error)
        }
    }
}

/// Parse and validate the JSON login body
async fn parse_login_body(
    req: Request<RequestBody>,
) -> std::result::Result<Credentials, LoginError> {
    let body = Limited::new(req.into_body(), MAX_LOGIN_BODY)
        .collect()
        .await
        .map_err(|_| LoginError::MalformedBody)?
        .to_bytes();

    let parsed: LoginBody = serde_json::from_slice(&body).map_err(|_| LoginError::MalformedBody)?;

    // Values go to the verifier verbatim; only an absent key is a client error.
    let username = parsed
        .username
        .ok_or_else(|| LoginError::MissingField("username".to_string()))?;

    let password = parsed
        .password
        .ok_or_else(|| LoginError::MissingField("password".to_string()))?;

    Ok(Credentials::new(username, password))
}

/// Verify the credentials and issue a token for the verified username
async fn attempt_login(
    credentials: &Credentials,
    state: &AppState,
) -> std::result::Result<String, LoginError> {
    let username = state
        .credentials
        .verify(credentials)
        .await
        .map_err(|e| match e {
            CredentialError::InvalidCredentials => LoginError::InvalidCredentials,
            CredentialError::Unavailable(err) => {
                error!("Credential verifier failed: {:#}", err);
                LoginError::InternalError
            }
        })?;

    state.tokens.generate_token(&username).map_err(|e| {
        error!("Token issuance failed: {:#}", e);
        LoginError::InternalError
    })
}

fn deliver_login_error(login_error: &LoginError) -> Result<Response<ResponseBody>> {
    let status = StatusCode::from_u16(login_error.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status == StatusCode::UNAUTHORIZED {
        deliver_unauthorized(login_error.to_code(), &login_error.to_message())
    } else {
        deliver_error_json(login_error.to_code(), &login_error.to_message(), status)
    }
}
