use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Role granted to every principal derived from a bearer token.
pub const USER_ROLE: &str = "USER";

/// The authenticated identity bound to one request.
///
/// Built fresh from a validated token on every request and dropped with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub username: String,
    pub roles: BTreeSet<String>,
}

impl Principal {
    /// A principal holding only the `USER` role.
    pub fn user(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            roles: BTreeSet::from([USER_ROLE.to_string()]),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.username, self.roles)
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("authentication required")]
pub struct AccessDenied;

/// Request-scoped identity handed to handlers by value.
///
/// There is no global or task-local "current user"; each handler sees only
/// the context the router built for its own request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityContext {
    principal: Option<Principal>,
    client_ip: Option<String>,
}

impl IdentityContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
            client_ip: None,
        }
    }

    pub fn with_client_ip(mut self, client_ip: Option<String>) -> Self {
        self.client_ip = client_ip;
        self
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn client_ip(&self) -> Option<&str> {
        self.client_ip.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    /// Endpoint-local access check for routes that need a principal.
    pub fn require_principal(&self) -> Result<&Principal, AccessDenied> {
        self.principal.as_ref().ok_or(AccessDenied)
    }
}
