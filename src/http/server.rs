//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the service's handlers
//! - Wire up middleware (observation, timeout, tracing)
//! - Bind server to listener and shut down gracefully
//!
//! # Design Decisions
//! - Observation is the innermost layer so the timeout cancels it (aborted exchange)
//! - Unmatched paths go through a fallback that redirects trailing slashes

use std::time::Duration;

use axum::{
    extract::{Path, Request},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::http::instrumentation::{attach_error, observe_exchange, ObservationState};

/// HTTP server exposing an instrumented service.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a server recording observations through `metrics`.
    pub fn new(config: ServerConfig) -> Self {
        let observation = ObservationState::from_config(&config.observability);
        Self::with_observation(config, observation)
    }

    /// Create a server with a custom convention and recorder.
    pub fn with_observation(config: ServerConfig, observation: ObservationState) -> Self {
        let router = build_router(&config, observation);
        Self { router, config }
    }

    /// The fully layered router, e.g. for driving requests in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(config: &ServerConfig, observation: ObservationState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/users/{id}", get(get_user))
        .route("/fail", get(fail))
        .fallback(fallback)
        .layer(middleware::from_fn_with_state(observation, observe_exchange))
        .layer(TimeoutLayer::new(Duration::from_millis(config.timeouts.request_ms)))
        .layer(TraceLayer::new_for_http())
}

/// Failures surfaced by the service's handlers.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("user directory unavailable")]
    DirectoryUnavailable,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let mut response = (StatusCode::SERVICE_UNAVAILABLE, self.to_string()).into_response();
        attach_error(&mut response, &self);
        response
    }
}

#[derive(Debug, Serialize)]
struct User {
    id: u64,
    name: String,
}

async fn index() -> &'static str {
    "ok"
}

async fn get_user(Path(id): Path<u64>) -> Json<User> {
    Json(User {
        id,
        name: format!("user-{id}"),
    })
}

async fn fail() -> Result<&'static str, ServiceError> {
    tracing::warn!("User directory lookup failed");
    Err(ServiceError::DirectoryUnavailable)
}

/// Redirect `/path/` to `/path`; everything else is 404.
async fn fallback(request: Request) -> Response {
    let path = request.uri().path();
    if path.len() > 1 && path.ends_with('/') {
        let target = path.trim_end_matches('/');
        let target = if target.is_empty() { "/" } else { target };
        return Redirect::permanent(target).into_response();
    }
    (StatusCode::NOT_FOUND, "No matching route found").into_response()
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
