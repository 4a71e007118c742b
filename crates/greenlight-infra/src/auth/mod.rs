//! JWT-based session validation and the custom-token exchange.

mod jwt;

pub use jwt::{CredentialError, JwtConfig, JwtSessionService, JwtTokenExchange, ServiceAccount};
