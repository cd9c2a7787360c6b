pub mod json_error;
pub mod jwt;
pub mod login;
pub mod server_config;

pub use self::json_error::ErrorResponse;
pub use self::jwt::TokenClaims;
pub use self::login::{Credentials, LoginError};
pub use self::server_config::{AppConfig, AuthConfig, ConfigError, CredentialsConfig, ServerConfig};
