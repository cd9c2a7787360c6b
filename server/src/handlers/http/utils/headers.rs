use hyper::Request;
use hyper::header::{AUTHORIZATION, HeaderMap};
use tracing::debug;

use crate::tower_middle::PeerAddr;

const BEARER_PREFIX: &str = "Bearer ";

/// Extract a header value as a string
pub fn get_header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Extract bearer token from Authorization header
/// Format: "Authorization: Bearer <token>"
///
/// The scheme prefix is matched case-sensitively; anything else (absent
/// header, other scheme, non-ASCII value) yields `None`.
pub fn get_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth = get_header_value(headers, AUTHORIZATION.as_str())?;
    let token = auth.strip_prefix(BEARER_PREFIX)?;
    debug!("Bearer token extracted");
    Some(token)
}

/// Extract the client IP address from the request
///
/// Proxy headers win over the socket peer so deployments behind a reverse
/// proxy record the original client.
pub fn get_client_ip<B>(req: &Request<B>) -> Option<String> {
    // Check X-Forwarded-For header first (for proxied requests)
    if let Some(forwarded) = get_header_value(req.headers(), "x-forwarded-for") {
        if let Some(first) = forwarded.split(',').map(str::trim).find(|s| !s.is_empty()) {
            return Some(first.to_string());
        }
    }

    // Check X-Real-IP header
    if let Some(real_ip) = get_header_value(req.headers(), "x-real-ip") {
        return Some(real_ip.trim().to_string());
    }

    req.extensions()
        .get::<PeerAddr>()
        .map(|peer| peer.0.ip().to_string())
}
