//! Upload endpoint - classify an image sent as multipart form data

use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::inference::RankedPrediction;
use crate::server::error::ApiError;
use crate::server::state::SharedState;
use crate::utils::error::ClassifierError;

/// Name of the multipart field carrying the image
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub top_predictions: Vec<RankedPrediction>,
}

/// POST /upload - Return the top predictions for an uploaded image
pub async fn upload(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart?;
    let (file_name, bytes) = read_file_field(&mut multipart).await?;

    let upload = state.storage.save(&bytes, file_name.as_deref()).await?;
    info!(
        "Received {:?} ({} bytes) as {:?}",
        file_name.as_deref().unwrap_or("<unnamed>"),
        bytes.len(),
        upload.path()
    );

    // The guard moves into the blocking task so the file is removed as soon
    // as decoding is done, on every path.
    let predictor = state.predictor.clone();
    let result = tokio::task::spawn_blocking(move || {
        let result = predictor.predict_file(upload.path());
        drop(upload);
        result
    })
    .await
    .map_err(|e| ApiError::internal(format!("Inference task failed: {}", e)))??;

    info!(
        "Predicted {} ({:.2}%) in {:.2} ms",
        result.class_name,
        result.confidence * 100.0,
        result.inference_time_ms
    );

    Ok(Json(UploadResponse {
        top_predictions: result.top_predictions,
    }))
}

/// Find the file field and read it fully
async fn read_file_field(multipart: &mut Multipart) -> Result<(Option<String>, Bytes), ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            let file_name = field.file_name().map(str::to_string);
            let bytes = field.bytes().await?;
            return Ok((file_name, bytes));
        }
    }

    Err(ClassifierError::Upload(format!("Field required: {}", FILE_FIELD)).into())
}
