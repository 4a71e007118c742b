//! Authentication extractors.

use actix_web::{dev::Payload, http::header, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use std::sync::Arc;

use greenlight_core::domain::Session;
use greenlight_core::ports::{AuthError, SessionTokens};

use crate::middleware::error::AppError;

/// Validated token identity, before capability resolution.
#[derive(Debug, Clone)]
pub struct Identity {
    pub uid: String,
    pub email: String,
    pub roles: Vec<String>,
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_identity(req))
    }
}

fn extract_identity(req: &HttpRequest) -> Result<Identity, AppError> {
    let sessions = req
        .app_data::<actix_web::web::Data<Arc<dyn SessionTokens>>>()
        .ok_or_else(|| {
            tracing::error!("SessionTokens not found in app data");
            AppError::Internal("Server configuration error".to_string())
        })?;

    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))?;

    let claims = sessions.verify(token)?;
    Ok(Identity {
        uid: claims.uid,
        email: claims.email,
        roles: claims.roles,
    })
}

/// Session context extractor: validates the bearer token and resolves the
/// normalized capability set once. Callers without the base capability
/// flag are rejected with 403 before any handler runs.
#[derive(Debug, Clone)]
pub struct Caller(pub Session);

impl FromRequest for Caller {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let result = Identity::from_request(req, payload)
            .into_inner()
            .and_then(|identity| {
                Session::resolve(identity.uid, identity.email, &identity.roles)
                    .map(Caller)
                    .map_err(AppError::from)
            });
        ready(result)
    }
}
