//! HTTP server
//!
//! Exposes `GET /health` and `POST /upload` over axum with CORS for the
//! configured frontend origins and request tracing.

pub mod error;
pub mod routes;
pub mod state;
pub mod storage;

use std::net::SocketAddr;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::utils::error::{ClassifierError, Result};

pub use error::{ApiError, ErrorResponse};
pub use state::{upload_limit_bytes, AppState, ServerConfig, SharedState, DEFAULT_ALLOWED_ORIGINS};
pub use storage::{TempUpload, UploadStorage};

/// CORS for an explicit origin allow-list
///
/// Credentials are allowed, so methods and headers are mirrored from the
/// preflight request rather than answered with a wildcard.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            if origin.trim() == "*" {
                return Err(ClassifierError::Config(
                    "wildcard origin cannot be combined with credentials".to_string(),
                ));
            }
            HeaderValue::from_str(origin.trim())
                .map_err(|e| ClassifierError::Config(format!("Invalid origin '{}': {}", origin, e)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

/// Build the application router
pub fn build_router(state: SharedState) -> Result<Router> {
    let cors = cors_layer(&state.config.allowed_origins)?;
    let body_limit = state.config.max_upload_bytes;

    Ok(Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/upload", post(routes::upload::upload))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}

/// Bind and serve until Ctrl+C
pub async fn serve(state: SharedState) -> anyhow::Result<()> {
    let app = build_router(state.clone())?;

    let listener =
        tokio::net::TcpListener::bind((state.config.host.as_str(), state.config.port)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    info!("Starting server on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped after {}s", state.uptime_seconds());
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down");
}
