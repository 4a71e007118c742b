//! JWT session token service and the identity-assertion exchange.

use std::path::Path;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use greenlight_core::ports::{AuthError, SessionClaims, SessionTokens, TokenExchange};

/// Session token service configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            expiration_hours: 24,
            issuer: "greenlight-api".to_string(),
        }
    }
}

/// Internal JWT claims structure for serialization.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user uid
    email: String,
    roles: Vec<String>,
    exp: i64,    // expiration timestamp
    iat: i64,    // issued at
    iss: String, // issuer
}

/// JWT-based session token service.
pub struct JwtSessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: JwtConfig,
}

impl JwtSessionService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            encoding_key,
            decoding_key,
            config,
        }
    }

    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").unwrap_or_else(|_| "change-me-in-production".to_string());

        if secret == "change-me-in-production" {
            tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
        }

        let config = JwtConfig {
            secret,
            expiration_hours: std::env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(24),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "greenlight-api".to_string()),
        };
        Self::new(config)
    }
}

impl SessionTokens for JwtSessionService {
    fn issue(&self, uid: &str, email: &str, roles: Vec<String>) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + TimeDelta::hours(self.config.expiration_hours);

        let claims = Claims {
            sub: uid.to_string(),
            email: email.to_string(),
            roles,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(SessionClaims {
            uid: token_data.claims.sub,
            email: token_data.claims.email,
            roles: token_data.claims.roles,
            exp: token_data.claims.exp,
        })
    }
}

/// Service-account credential used to mint custom tokens, loaded from a
/// JSON file with an environment-variable fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceAccount {
    pub project_id: String,
    pub client_email: String,
    pub secret: String,
}

/// Failures while loading the service-account credential.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("credential file unreadable: {0}")]
    Io(#[from] std::io::Error),

    #[error("credential malformed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no service-account credential configured")]
    Missing,
}

impl ServiceAccount {
    /// Load from the given file, falling back to the `SERVICE_ACCOUNT`
    /// environment variable (raw JSON) when the file is absent.
    pub fn load(path: Option<&Path>) -> Result<Self, CredentialError> {
        if let Some(path) = path {
            match std::fs::read_to_string(path) {
                Ok(raw) => return Ok(serde_json::from_str(&raw)?),
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "service-account file unreadable, trying environment fallback"
                    );
                }
            }
        }
        match std::env::var("SERVICE_ACCOUNT") {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(_) => Err(CredentialError::Missing),
        }
    }
}

/// Claims we accept from the caller-supplied identity assertion.
#[derive(Debug, Deserialize)]
struct AssertionClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[allow(dead_code)]
    exp: i64,
}

/// Claims of the minted custom token.
#[derive(Debug, Serialize)]
struct CustomTokenClaims {
    sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    iss: String,
    aud: String,
    iat: i64,
    exp: i64,
}

/// Credential-translation boundary: verifies the caller's identity
/// assertion and mints a custom session credential from the
/// service-account key. No business logic lives here.
pub struct JwtTokenExchange {
    account: ServiceAccount,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtTokenExchange {
    pub fn new(account: ServiceAccount) -> Self {
        let encoding_key = EncodingKey::from_secret(account.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(account.secret.as_bytes());
        Self {
            account,
            encoding_key,
            decoding_key,
        }
    }
}

#[async_trait]
impl TokenExchange for JwtTokenExchange {
    async fn exchange(&self, id_token: &str) -> Result<String, AuthError> {
        let mut validation = Validation::default();
        validation.validate_aud = false;

        let assertion = decode::<AssertionClaims>(id_token, &self.decoding_key, &validation)
            .map_err(|e| AuthError::InvalidAssertion(e.to_string()))?;

        let now = Utc::now();
        let claims = CustomTokenClaims {
            sub: assertion.claims.sub.clone(),
            email: assertion.claims.email,
            iss: self.account.client_email.clone(),
            aud: self.account.project_id.clone(),
            iat: now.timestamp(),
            exp: (now + TimeDelta::hours(1)).timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGenerationFailed(e.to_string()))?;

        // A usable custom token is a compact three-segment JWT.
        if token.split('.').count() != 3 {
            return Err(AuthError::TokenGenerationFailed(
                "custom token is not a three-segment JWT".to_string(),
            ));
        }

        tracing::info!(uid = %assertion.claims.sub, "custom token created");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key".to_string(),
            expiration_hours: 1,
            issuer: "test-issuer".to_string(),
        }
    }

    fn test_account() -> ServiceAccount {
        ServiceAccount {
            project_id: "greenlight-test".to_string(),
            client_email: "svc@greenlight-test.example.com".to_string(),
            secret: "service-account-secret".to_string(),
        }
    }

    /// Mint an assertion the way the upstream identity provider would.
    fn assertion(account: &ServiceAccount, sub: &str, exp_offset_secs: i64) -> String {
        #[derive(Serialize)]
        struct Raw<'a> {
            sub: &'a str,
            email: &'a str,
            exp: i64,
            iat: i64,
        }
        let now = Utc::now().timestamp();
        encode(
            &Header::default(),
            &Raw {
                sub,
                email: "user@example.com",
                exp: now + exp_offset_secs,
                iat: now,
            },
            &EncodingKey::from_secret(account.secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn issue_and_verify_round_trip() {
        let service = JwtSessionService::new(test_config());

        let token = service
            .issue("uid-1", "test@example.com", vec!["social".to_string()])
            .unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.uid, "uid-1");
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.roles, vec!["social".to_string()]);
    }

    #[test]
    fn verify_rejects_garbage() {
        let service = JwtSessionService::new(test_config());
        let result = service.verify("not-a-token");
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn verify_rejects_wrong_issuer() {
        let issuer1 = JwtSessionService::new(JwtConfig {
            issuer: "issuer1".to_string(),
            ..test_config()
        });
        let issuer2 = JwtSessionService::new(JwtConfig {
            issuer: "issuer2".to_string(),
            ..test_config()
        });

        let token = issuer1.issue("uid-1", "a@b.example.com", vec![]).unwrap();
        assert!(issuer2.verify(&token).is_err());
    }

    #[tokio::test]
    async fn exchange_mints_three_segment_token() {
        let account = test_account();
        let exchange = JwtTokenExchange::new(account.clone());

        let id_token = assertion(&account, "uid-42", 3600);
        let custom = exchange.exchange(&id_token).await.unwrap();

        assert_eq!(custom.split('.').count(), 3);

        // The minted token carries the subject and the account identity.
        let mut validation = Validation::default();
        validation.set_audience(&[&account.project_id]);
        let decoded = decode::<serde_json::Value>(
            &custom,
            &DecodingKey::from_secret(account.secret.as_bytes()),
            &validation,
        )
        .unwrap();
        assert_eq!(decoded.claims["sub"], "uid-42");
        assert_eq!(decoded.claims["iss"], account.client_email);
    }

    #[tokio::test]
    async fn exchange_rejects_invalid_assertion() {
        let exchange = JwtTokenExchange::new(test_account());
        let result = exchange.exchange("three.random.segments").await;
        assert!(matches!(result, Err(AuthError::InvalidAssertion(_))));
    }

    #[tokio::test]
    async fn exchange_rejects_expired_assertion() {
        let account = test_account();
        let exchange = JwtTokenExchange::new(account.clone());

        let stale = assertion(&account, "uid-42", -3600);
        let result = exchange.exchange(&stale).await;
        assert!(matches!(result, Err(AuthError::InvalidAssertion(_))));
    }
}
