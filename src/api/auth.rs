//! Shared-secret authentication for admin routes

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use secrecy::ExposeSecret;
use subtle::ConstantTimeEq;

use super::ApiState;

/// Header carrying the admin secret
pub const API_KEY_HEADER: &str = "x-api-key";

fn extract_api_key(req: &Request) -> Option<&str> {
    req.headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
}

/// Middleware requiring `x-api-key` to match the webhook secret
pub async fn require_api_key(
    State(state): State<Arc<ApiState>>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = &state.admin_secret else {
        tracing::warn!("admin request rejected: WEBHOOK_SECRET not configured");
        return Err(StatusCode::UNAUTHORIZED);
    };

    match extract_api_key(&req) {
        Some(key) if key.as_bytes().ct_eq(expected.expose_secret().as_bytes()).into() => {
            Ok(next.run(req).await)
        }
        Some(_) => {
            tracing::warn!("invalid API key provided");
            Err(StatusCode::UNAUTHORIZED)
        }
        None => {
            tracing::debug!("no API key provided");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
