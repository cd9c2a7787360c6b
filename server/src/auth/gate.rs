//! Per-request authentication gate.
//!
//! ```text
//! Unauthenticated ─┬─ no / non-Bearer Authorization ──► PassedThrough
//!                  └─ Bearer <token> ─► Validating ─┬─► Authenticated(Principal)
//!                                                   └─► Rejected(TokenError)
//! ```
//!
//! The gate keeps no memory between requests; every call starts from
//! `Unauthenticated`.

use std::sync::Arc;

use hyper::header::HeaderMap;
use tracing::{debug, warn};

use super::identity::{IdentityContext, Principal};
use super::token_service::{TokenError, TokenService};
use crate::handlers::http::utils::headers::get_bearer_token;

/// Terminal state of one pass through the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// No bearer token was presented; the request continues anonymously.
    PassedThrough,
    /// The token verified and the principal is bound to the request.
    Authenticated(Principal),
    /// A token was presented but did not validate; the request must stop.
    Rejected(TokenError),
}

impl GateOutcome {
    /// Identity for the downstream handler, or the rejection reason.
    pub fn into_identity(self) -> Result<IdentityContext, TokenError> {
        match self {
            Self::PassedThrough => Ok(IdentityContext::anonymous()),
            Self::Authenticated(principal) => Ok(IdentityContext::authenticated(principal)),
            Self::Rejected(err) => Err(err),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthenticationGate {
    tokens: Arc<TokenService>,
}

impl AuthenticationGate {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    /// Run the gate over a request's headers.
    pub fn inspect(&self, headers: &HeaderMap) -> GateOutcome {
        let Some(token) = get_bearer_token(headers) else {
            debug!("No bearer token presented, passing through");
            return GateOutcome::PassedThrough;
        };

        match self.tokens.validate_and_get_username(token) {
            Ok(username) => {
                debug!("Bearer token accepted for {}", username);
                GateOutcome::Authenticated(Principal::user(username))
            }
            Err(err) => {
                warn!("Bearer token rejected: {}", err.to_code());
                GateOutcome::Rejected(err)
            }
        }
    }
}
