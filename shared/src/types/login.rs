use std::fmt;

use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Login wire types
// ---------------------------------------------------------------------------

/// Username/password pair submitted to `POST /auth/login`.
///
/// Transient: it lives for the duration of one login call and is never
/// stored. `Debug` redacts the password.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Login errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{}: {}", self.to_code(), self.to_message())]
pub enum LoginError {
    InvalidCredentials,
    MissingField(String),
    MalformedBody,
    InternalError,
}

impl LoginError {
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::MissingField(_) => "MISSING_FIELD",
            Self::MalformedBody => "MALFORMED_BODY",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    pub fn to_message(&self) -> String {
        match self {
            Self::InvalidCredentials => "Invalid username or password".to_string(),
            Self::MissingField(field) => format!("Missing required field: {}", field),
            Self::MalformedBody => "Request body must be a JSON object".to_string(),
            Self::InternalError => "An internal error occurred".to_string(),
        }
    }

    /// HTTP status code the login boundary answers with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidCredentials => 401,
            Self::MissingField(_) | Self::MalformedBody => 400,
            Self::InternalError => 500,
        }
    }
}
