//! Admin endpoints

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    middleware,
    routing::delete,
};
use serde::{Deserialize, Serialize};

use super::{ApiState, auth::require_api_key};

/// Default age for the cleanup endpoint
const DEFAULT_MAX_AGE_HOURS: u64 = 24;

#[derive(Debug, Deserialize)]
pub struct CleanupQuery {
    pub max_age_hours: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    pub deleted: usize,
    pub max_age_hours: u64,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Delete uploads older than the requested age
async fn cleanup(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<CleanupQuery>,
) -> Result<Json<CleanupResponse>, (StatusCode, Json<ErrorResponse>)> {
    let hours = query.max_age_hours.unwrap_or(DEFAULT_MAX_AGE_HOURS);
    let max_age = Duration::from_secs(hours.saturating_mul(3600));

    match state.media.cleanup_older_than(max_age).await {
        Ok(deleted) => {
            tracing::info!(deleted, hours, "upload cleanup requested");
            Ok(Json(CleanupResponse {
                deleted,
                max_age_hours: hours,
            }))
        }
        Err(e) => {
            tracing::error!(error = %e, "upload cleanup failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}

/// Build admin router (mounted at `/api/media`)
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/cleanup", delete(cleanup))
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .with_state(state)
}
