//! Health check endpoint

use axum::Json;
use serde::{Deserialize, Serialize};

pub const HEALTH_MESSAGE: &str = "API is up and running!";

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub message: String,
}

/// GET /health - Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: HEALTH_MESSAGE.to_string(),
    })
}
