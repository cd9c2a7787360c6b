//! Credential verification for the login boundary.
//!
//! `CredentialVerifier` is the seam where a real user store plugs in. The
//! bundled `StaticCredentialVerifier` accepts exactly one configured account
//! and exists so the gateway works out of the box.

use anyhow::anyhow;
use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use async_trait::async_trait;
use rand::rngs::OsRng;
use thiserror::Error;
use tracing::{debug, error};

use shared::types::{Credentials, CredentialsConfig};

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The verifier itself failed; not the caller's fault.
    #[error("credential verification unavailable: {0}")]
    Unavailable(anyhow::Error),
}

#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Check `credentials`, returning the canonical username on success.
    async fn verify(&self, credentials: &Credentials) -> Result<String, CredentialError>;
}

/// Single-account verifier holding an Argon2id hash of the configured password.
pub struct StaticCredentialVerifier {
    username: String,
    password_hash: String,
}

impl std::fmt::Debug for StaticCredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentialVerifier")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl StaticCredentialVerifier {
    pub fn new(username: &str, password: &str) -> anyhow::Result<Self> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| anyhow!("Password hashing failed: {}", e))?;

        Ok(Self {
            username: username.to_string(),
            password_hash,
        })
    }

    pub fn from_config(config: &CredentialsConfig) -> anyhow::Result<Self> {
        Self::new(&config.username, &config.password)
    }
}

fn verify_password(hash: &str, password: &str) -> anyhow::Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| anyhow!("Failed to parse password hash: {}", e))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[async_trait]
impl CredentialVerifier for StaticCredentialVerifier {
    async fn verify(&self, credentials: &Credentials) -> Result<String, CredentialError> {
        let username_matches = credentials.username == self.username;
        let hash = self.password_hash.clone();
        let password = credentials.password.clone();

        // Argon2 is CPU-bound; keep it off the async workers. The hash is
        // checked even for an unknown username so both paths cost the same.
        let verification = tokio::task::spawn_blocking(move || verify_password(&hash, &password))
            .await
            .map_err(|e| CredentialError::Unavailable(e.into()))?;
        let password_matches = verification.map_err(|e| {
            error!("Password verification error: {}", e);
            CredentialError::Unavailable(e)
        })?;

        if username_matches && password_matches {
            Ok(self.username.clone())
        } else {
            debug!("Credential mismatch for {}", credentials.username);
            Err(CredentialError::InvalidCredentials)
        }
    }
}
