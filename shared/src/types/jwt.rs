use serde::{Deserialize, Serialize};

/// Claims embedded in every token issued by the server.
///
/// The token is self-contained: validating it needs only the process signing
/// secret and the clock, never a server-side lookup. Nothing here is
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Standard JWT subject, set to the username.
    pub sub: String,

    /// Issued-at (Unix timestamp, seconds).
    pub iat: u64,

    /// Standard JWT expiry (Unix timestamp, seconds).
    pub exp: u64,
}

impl TokenClaims {
    /// Claims for `username` issued at `now` and valid for `ttl_secs`.
    pub fn new(username: &str, now: u64, ttl_secs: u64) -> Self {
        Self {
            sub: username.to_string(),
            iat: now,
            exp: now.saturating_add(ttl_secs),
        }
    }

    /// Whether `now` falls inside `[iat - skew, exp + skew]`.
    pub fn is_current(&self, now: u64, skew_secs: u64) -> bool {
        now.saturating_add(skew_secs) >= self.iat && now <= self.exp.saturating_add(skew_secs)
    }
}
