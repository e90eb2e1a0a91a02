//! HTTP API server
//!
//! Serves the LINE webhook, a health probe and a small admin surface. Every
//! route is mounted under the configured base path.

pub mod admin;
mod auth;
pub mod health;
pub mod webhooks;

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use secrecy::SecretString;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::dispatch::Dispatcher;
use crate::media::MediaStore;

/// Shared state for route handlers
#[derive(Clone)]
pub struct ApiState {
    pub dispatcher: Arc<Dispatcher>,
    /// Key for webhook signature checks; unset disables verification
    pub channel_secret: Option<SecretString>,
    /// Shared secret for admin routes; unset rejects them
    pub admin_secret: Option<SecretString>,
    pub media: MediaStore,
    pub started_at: Instant,
    pub base_path: String,
    pub environment: String,
}

/// Builder for [`ApiServer`]
pub struct ApiServerBuilder {
    dispatcher: Arc<Dispatcher>,
    media: MediaStore,
    port: u16,
    channel_secret: Option<SecretString>,
    admin_secret: Option<SecretString>,
    base_path: String,
    environment: String,
}

impl ApiServerBuilder {
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>, media: MediaStore, port: u16) -> Self {
        Self {
            dispatcher,
            media,
            port,
            channel_secret: None,
            admin_secret: None,
            base_path: String::new(),
            environment: "development".to_string(),
        }
    }

    #[must_use]
    pub fn channel_secret(mut self, secret: Option<SecretString>) -> Self {
        self.channel_secret = secret;
        self
    }

    #[must_use]
    pub fn admin_secret(mut self, secret: Option<SecretString>) -> Self {
        self.admin_secret = secret;
        self
    }

    #[must_use]
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = crate::config::normalize_base_path(&base_path.into());
        self
    }

    #[must_use]
    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    #[must_use]
    pub fn build(self) -> ApiServer {
        if self.channel_secret.is_none() {
            tracing::warn!("CHANNEL_SECRET not set - webhook signatures are not verified");
        }

        ApiServer {
            state: Arc::new(ApiState {
                dispatcher: self.dispatcher,
                channel_secret: self.channel_secret,
                admin_secret: self.admin_secret,
                media: self.media,
                started_at: Instant::now(),
                base_path: self.base_path,
                environment: self.environment,
            }),
            port: self.port,
        }
    }
}

/// HTTP server for the gateway
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
}

impl ApiServer {
    /// Shared handler state
    #[must_use]
    pub fn state(&self) -> Arc<ApiState> {
        self.state.clone()
    }

    /// Build the full router, including middleware
    #[must_use]
    pub fn router(&self) -> Router {
        let routes = Router::new()
            .merge(webhooks::router(self.state.clone()))
            .merge(health::router(self.state.clone()))
            .nest("/api/media", admin::router(self.state.clone()));

        let router = if self.state.base_path.is_empty() {
            routes
        } else {
            Router::new().nest(&self.state.base_path, routes)
        };

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Run until `shutdown` resolves, then drain in-flight requests
    ///
    /// # Errors
    ///
    /// Returns error if the server fails to bind or run
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(
            port = self.port,
            base_path = %self.state.base_path,
            environment = %self.state.environment,
            "API server listening"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }
}
