//! Stateless bearer-token authentication gateway.
//!
//! `POST /auth/login` exchanges credentials for a signed token; routes
//! registered as secured run the [`auth::AuthenticationGate`] once per request
//! and hand the resulting [`auth::IdentityContext`] to their handler.

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};

use shared::types::AppConfig;

pub mod app;
pub mod auth;
pub mod handlers;
pub mod tower_middle;

pub use app::Application;

use auth::{AuthenticationGate, CredentialVerifier, StaticCredentialVerifier, TokenService};

/// Process-wide state shared by every request.
///
/// Everything here is immutable after startup, so clones are cheap and no
/// request ever takes a lock.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenService>,
    pub gate: AuthenticationGate,
    pub credentials: Arc<dyn CredentialVerifier>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        config: AppConfig,
        tokens: Arc<TokenService>,
        credentials: Arc<dyn CredentialVerifier>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            gate: AuthenticationGate::new(tokens.clone()),
            tokens,
            credentials,
        }
    }

    /// Build the token service and the placeholder credential verifier from
    /// configuration.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let tokens = TokenService::from_config(&config.auth).context("Failed to set up tokens")?;
        let verifier = StaticCredentialVerifier::from_config(&config.auth.credentials)
            .context("Failed to set up credential verifier")?;

        Ok(Self::new(config, Arc::new(tokens), Arc::new(verifier)))
    }
}
