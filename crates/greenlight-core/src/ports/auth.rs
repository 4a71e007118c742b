//! Authentication ports: session token validation and the custom-token
//! exchange boundary.

use async_trait::async_trait;

/// Claims carried by a validated session token.
#[derive(Debug, Clone)]
pub struct SessionClaims {
    pub uid: String,
    pub email: String,
    pub roles: Vec<String>,
    pub exp: i64,
}

/// Session token service: issues and validates the bearer tokens API
/// callers present.
pub trait SessionTokens: Send + Sync {
    /// Issue a session token for a user.
    fn issue(&self, uid: &str, email: &str, roles: Vec<String>) -> Result<String, AuthError>;

    /// Validate and decode a session token.
    fn verify(&self, token: &str) -> Result<SessionClaims, AuthError>;
}

/// Credential-translation boundary: converts a caller-supplied identity
/// assertion into a custom session credential for the client identity
/// library. Performs no business logic.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    async fn exchange(&self, id_token: &str) -> Result<String, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid or expired ID token")]
    InvalidAssertion(String),

    #[error("Failed to generate valid custom token")]
    TokenGenerationFailed(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,
}
