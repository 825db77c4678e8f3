use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use secrecy::ExposeSecret;

use crate::{adapters::http::app_state::AppState, app_error::AppError};

/// Rejects requests that do not carry the admin bearer token.
pub async fn admin_auth_middleware(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let expected = app_state.config.admin_api_token.expose_secret();

    let authorized = match bearer_token(&request) {
        Some(token) => !expected.is_empty() && constant_time_compare(token, expected),
        None => {
            tracing::debug!(uri = %request.uri(), "Admin request without bearer token");
            return Err(AppError::InvalidCredentials);
        }
    };

    if !authorized {
        tracing::warn!(uri = %request.uri(), "Rejected admin request with wrong token");
        return Err(AppError::InvalidCredentials);
    }

    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
