//! LINE webhook handler

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;

use crate::api::ApiState;
use crate::channels::line::WebhookBody;
use crate::channels::line::signature::{self, SIGNATURE_HEADER};

/// Webhook response body
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Readiness response for `GET /webhook`
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub timestamp: String,
}

/// Handle a LINE webhook delivery
///
/// Returns 200 once the signature checks out and processes the batch in a
/// background task. Malformed bodies are still acknowledged with 200 so the
/// platform does not keep redelivering them.
#[allow(clippy::unused_async)]
pub async fn handle_events(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<WebhookResponse>) {
    if let Some(secret) = &state.channel_secret {
        let provided = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok());

        let valid = provided.is_some_and(|sig| signature::verify(secret.expose_secret(), &body, sig));
        if !valid {
            tracing::warn!(present = provided.is_some(), "LINE webhook signature mismatch");
            return (
                StatusCode::UNAUTHORIZED,
                Json(WebhookResponse {
                    success: false,
                    message: None,
                    error: Some("invalid signature".to_string()),
                }),
            );
        }
    }

    let batch = match WebhookBody::parse(&body) {
        Ok(batch) => batch,
        Err(e) => {
            tracing::warn!(error = %e, "unparseable LINE webhook body");
            return (
                StatusCode::OK,
                Json(WebhookResponse {
                    success: false,
                    message: None,
                    error: Some(e.to_string()),
                }),
            );
        }
    };

    tracing::debug!(
        destination = batch.destination.as_deref().unwrap_or_default(),
        events = batch.events.len(),
        "received LINE webhook"
    );

    let dispatcher = state.dispatcher.clone();
    tokio::spawn(async move {
        dispatcher.handle(batch).await;
    });

    (
        StatusCode::OK,
        Json(WebhookResponse {
            success: true,
            message: Some("Events processed"),
            error: None,
        }),
    )
}

/// Static readiness indicator
#[allow(clippy::unused_async)]
pub async fn readiness() -> Json<ReadinessResponse> {
    Json(ReadinessResponse {
        status: "LINE Webhook endpoint is ready",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
