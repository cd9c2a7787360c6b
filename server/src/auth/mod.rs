//! Stateless bearer-token authentication.

pub mod credentials;
pub mod gate;
pub mod identity;
pub mod token_service;

pub use credentials::{CredentialError, CredentialVerifier, StaticCredentialVerifier};
pub use gate::{AuthenticationGate, GateOutcome};
pub use identity::{AccessDenied, IdentityContext, Principal};
pub use token_service::{Clock, SystemClock, TokenError, TokenService};
