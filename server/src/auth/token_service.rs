//! Token issuance and validation.
//!
//! Tokens are compact JWS strings: `base64url(header).base64url(claims).base64url(signature)`
//! signed with HS256 under the single process-wide secret. Validation is a
//! pure function of the token, the secret and the clock, so no state is shared
//! between requests and no lock is ever taken.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use tracing::debug;

use shared::types::{AuthConfig, TokenClaims};

const SEGMENT_DELIMITER: char = '.';
const SEGMENT_COUNT: usize = 3;
const ALGORITHM: Algorithm = Algorithm::HS256;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    MalformedToken,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token is expired")]
    Expired,
}

impl TokenError {
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::MalformedToken => "MALFORMED_TOKEN",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::Expired => "TOKEN_EXPIRED",
        }
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of the current Unix time in seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        jsonwebtoken::get_current_timestamp()
    }
}

// ---------------------------------------------------------------------------
// TokenService
// ---------------------------------------------------------------------------

/// Issues and validates signed bearer tokens.
///
/// Holds derived key material only; the raw secret is never retained or
/// exposed, and `Debug` prints nothing key-related.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: u64,
    skew_secs: u64,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &ALGORITHM)
            .field("ttl_secs", &self.ttl_secs)
            .field("skew_secs", &self.skew_secs)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration, skew: Duration) -> Self {
        Self::with_clock(secret, ttl, skew, Arc::new(SystemClock))
    }

    pub fn with_clock(secret: &[u8], ttl: Duration, skew: Duration, clock: Arc<dyn Clock>) -> Self {
        // Expiry is checked against `clock`, not inside jsonwebtoken, so the
        // library only verifies the signature and the presence of claims.
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl_secs: ttl.as_secs(),
            skew_secs: skew.as_secs(),
            clock,
        }
    }

    /// Build from the auth section of the loaded configuration.
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        let secret = config
            .resolved_jwt_secret()
            .ok_or_else(|| anyhow!("No token signing secret configured"))?;

        Ok(Self::new(
            secret.as_bytes(),
            Duration::from_secs(config.token_expiry_secs()),
            Duration::from_secs(config.clock_skew_secs),
        ))
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Issue a token whose subject is `username`, valid from now for the
    /// configured TTL.
    pub fn generate_token(&self, username: &str) -> Result<String> {
        let claims = TokenClaims::new(username, self.clock.now(), self.ttl_secs);
        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .context("Failed to sign token")?;

        debug!("Issued token for {} expiring at {}", claims.sub, claims.exp);
        Ok(token)
    }

    /// Validate `token` and return the username it was issued to.
    pub fn validate_and_get_username(&self, token: &str) -> Result<String, TokenError> {
        self.validate(token).map(|claims| claims.sub)
    }

    /// Validate `token` and return its full claims.
    ///
    /// Checks run in a fixed order: segment shape, signature, claims, expiry.
    /// A token is never reported expired unless its signature verified.
    pub fn validate(&self, token: &str) -> Result<TokenClaims, TokenError> {
        check_segments(token)?;

        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| classify(&e))?;
        let claims = data.claims;

        let now = self.clock.now();
        if !claims.is_current(now, self.skew_secs) {
            debug!(
                "Token for {} outside validity window (iat={}, exp={}, now={})",
                claims.sub, claims.iat, claims.exp, now
            );
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

/// Exactly three segments, each valid unpadded URL-safe base64.
fn check_segments(token: &str) -> Result<(), TokenError> {
    let segments: Vec<&str> = token.split(SEGMENT_DELIMITER).collect();
    if segments.len() != SEGMENT_COUNT {
        return Err(TokenError::MalformedToken);
    }

    for segment in segments {
        URL_SAFE_NO_PAD
            .decode(segment)
            .map_err(|_| TokenError::MalformedToken)?;
    }

    Ok(())
}

fn classify(err: &jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature | ErrorKind::ImmatureSignature => TokenError::Expired,
        _ => TokenError::MalformedToken,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
