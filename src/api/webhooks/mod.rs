//! Webhook endpoints

use std::sync::Arc;

use axum::{Router, routing::get};

use super::ApiState;

pub mod line;

/// Build webhooks router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/webhook", get(line::readiness).post(line::handle_events))
        .with_state(state)
}
