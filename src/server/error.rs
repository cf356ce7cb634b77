//! HTTP error responses
//!
//! Errors are returned as `{"detail": "..."}` with a status derived from the
//! underlying failure.

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::utils::error::ClassifierError;

/// Body of every error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// An error ready to be sent to the client
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }
}

/// HTTP status for a library error
///
/// Undecodable uploads surface as server errors; only a recognised but
/// unsupported channel layout or a malformed request is the client's fault.
pub fn status_for(err: &ClassifierError) -> StatusCode {
    match err {
        ClassifierError::UnsupportedChannels(_) | ClassifierError::Upload(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ClassifierError::ImageDecode(_)
        | ClassifierError::ModelNotFound(_)
        | ClassifierError::Model(_)
        | ClassifierError::Inference(_)
        | ClassifierError::InvalidPrediction { .. }
        | ClassifierError::Config(_)
        | ClassifierError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ClassifierError> for ApiError {
    fn from(err: ClassifierError) -> Self {
        Self::new(status_for(&err), err.to_string())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::new(err.status(), err.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("Request failed ({}): {}", self.status, self.detail);
        } else {
            warn!("Request rejected ({}): {}", self.status, self.detail);
        }
        (self.status, Json(ErrorResponse { detail: self.detail })).into_response()
    }
}
