//! Resource endpoints behind the gate.

use anyhow::Result;
use hyper::{Request, Response, StatusCode};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::AppState;
use crate::auth::{IdentityContext, Principal};
use crate::handlers::http::utils::{deliver_serialized_json, deliver_text, deliver_unauthorized};
use crate::handlers::http::{RequestBody, ResponseBody};

pub const PUBLIC_BODY: &str = "Public OK";
pub const SECURE_BODY: &str = "Secure OK (JWT required)";

/// Body of `GET /auth/me`.
#[derive(Debug, Serialize)]
struct MeResponse<'a> {
    #[serde(flatten)]
    principal: &'a Principal,
    client_ip: Option<&'a str>,
}

pub async fn handle_public(
    _req: Request<RequestBody>,
    _state: AppState,
) -> Result<Response<ResponseBody>> {
    deliver_text(PUBLIC_BODY, StatusCode::OK)
}

pub async fn handle_secure(
    _req: Request<RequestBody>,
    _state: AppState,
    identity: IdentityContext,
) -> Result<Response<ResponseBody>> {
    let Ok(principal) = identity.require_principal() else {
        return unauthorized();
    };

    debug!(
        "Secure resource served to {} from {}",
        principal.username,
        identity.client_ip().unwrap_or("unknown")
    );
    deliver_text(SECURE_BODY, StatusCode::OK)
}

/// Describe the principal bound to this request.
pub async fn handle_me(
    _req: Request<RequestBody>,
    _state: AppState,
    identity: IdentityContext,
) -> Result<Response<ResponseBody>> {
    let Ok(principal) = identity.require_principal() else {
        return unauthorized();
    };

    let body = MeResponse {
        principal,
        client_ip: identity.client_ip(),
    };
    deliver_serialized_json(&body, StatusCode::OK)
}

pub async fn handle_health(
    _req: Request<RequestBody>,
    _state: AppState,
) -> Result<Response<ResponseBody>> {
    deliver_serialized_json(&json!({"status": "success", "health": "ok"}), StatusCode::OK)
}

fn unauthorized() -> Result<Response<ResponseBody>> {
    deliver_unauthorized("UNAUTHORIZED", "Authentication required")
}
