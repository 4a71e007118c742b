//! Custom-token exchange endpoint.

use actix_web::{web, HttpResponse};

use greenlight_shared::dto::{TokenExchangeRequest, TokenExchangeResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/create-custom-token
///
/// Exchanges a caller-supplied ID token for a custom token the client
/// identity library can sign in with.
pub async fn create_custom_token(
    state: web::Data<AppState>,
    body: web::Json<TokenExchangeRequest>,
) -> AppResult<HttpResponse> {
    let id_token = body.into_inner().id_token;
    if id_token.trim().is_empty() {
        return Err(AppError::BadRequest("ID token is required".to_string()));
    }

    let exchange = state
        .token_exchange
        .as_ref()
        .ok_or_else(|| AppError::Internal("Token exchange is not configured".to_string()))?;

    let custom_token = exchange.exchange(id_token.trim()).await?;

    Ok(HttpResponse::Ok().json(TokenExchangeResponse {
        success: true,
        custom_token,
    }))
}
