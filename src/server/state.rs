//! Application state for the classifier server
//!
//! Everything here is built once at startup and only read afterwards.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::storage::UploadStorage;
use crate::inference::{Classifier, Predictor};
use crate::utils::error::{ClassifierError, Result};

/// Origins allowed by default (Vite and Create React App dev servers)
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:3000"];

const BYTES_PER_MIB: usize = 1024 * 1024;

/// Convert an upload limit in MiB to bytes, refusing values that overflow
pub fn upload_limit_bytes(mib: usize) -> Result<usize> {
    mib.checked_mul(BYTES_PER_MIB).ok_or_else(|| {
        ClassifierError::Config(format!("Upload limit of {} MiB is too large", mib))
    })
}

/// Server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Trained weights (CompactRecorder `.mpk` file)
    pub model_path: PathBuf,
    /// Optional JSON architecture config matching the weights
    pub model_config: Option<PathBuf>,
    /// Directory for temporary uploads
    pub upload_dir: PathBuf,
    /// Origins permitted by CORS
    pub allowed_origins: Vec<String>,
    /// Maximum request body size in bytes
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            model_path: PathBuf::from("models/cifar10_cnn.mpk"),
            model_config: None,
            upload_dir: PathBuf::from("uploads"),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
            max_upload_bytes: 10 * BYTES_PER_MIB,
        }
    }
}

/// Shared application state
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,
    /// Inference pipeline around the loaded classifier
    pub predictor: Predictor,
    /// Temporary storage for uploads
    pub storage: UploadStorage,
    /// Server start time
    pub started_at: Instant,
}

impl AppState {
    /// Build state around an already loaded classifier, creating the upload directory
    pub fn new(config: ServerConfig, classifier: Arc<dyn Classifier>) -> Result<Self> {
        let storage = UploadStorage::new(&config.upload_dir)?;
        Ok(Self {
            predictor: Predictor::new(classifier),
            storage,
            config,
            started_at: Instant::now(),
        })
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

pub type SharedState = Arc<AppState>;
