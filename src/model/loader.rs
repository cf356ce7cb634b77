//! Model loading
//!
//! Restores trained weights saved with Burn's `CompactRecorder`.

use std::path::{Path, PathBuf};

use burn::{config::Config, module::Module, record::CompactRecorder, tensor::backend::Backend};
use tracing::{debug, info};

use super::cnn::{Cifar10Cnn, Cifar10CnnConfig};
use crate::utils::error::{ClassifierError, Result};

/// Resolve the weights file, accepting paths with or without the `.mpk` extension
fn resolve_record_path(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    let with_ext = path.with_extension("mpk");
    with_ext.is_file().then_some(with_ext)
}

/// Load the architecture description, falling back to the defaults
///
/// The input shape and class count must match the preprocessor and label table.
pub fn load_config(config_path: Option<&Path>) -> Result<Cifar10CnnConfig> {
    let config = match config_path {
        Some(path) => Cifar10CnnConfig::load(path).map_err(|e| {
            ClassifierError::Config(format!("Failed to read model config {:?}: {}", path, e))
        })?,
        None => Cifar10CnnConfig::new(),
    };

    config
        .validate()
        .map_err(|e| ClassifierError::Config(format!("Invalid model config: {}", e)))?;
    Ok(config)
}

/// Load a trained classifier from disk
///
/// Fails with `ModelNotFound` if no weights file exists at `model_path` and with
/// `Model` if the record does not match the architecture.
pub fn load_classifier<B: Backend>(
    model_path: impl AsRef<Path>,
    config_path: Option<&Path>,
    device: &B::Device,
) -> Result<Cifar10Cnn<B>> {
    let model_path = model_path.as_ref();
    let record_path = resolve_record_path(model_path)
        .ok_or_else(|| ClassifierError::ModelNotFound(model_path.to_path_buf()))?;

    let config = load_config(config_path)?;
    debug!("Model config: {:?}", config);

    let recorder = CompactRecorder::new();
    let model = Cifar10Cnn::new(&config, device)
        .load_file(record_path.clone(), &recorder, device)
        .map_err(|e| ClassifierError::Model(format!("Failed to load model: {:?}", e)))?;

    info!("Loaded model weights from {:?}", record_path);
    Ok(model)
}

/// Save model weights with `CompactRecorder`
pub fn save_classifier<B: Backend>(model: Cifar10Cnn<B>, path: impl AsRef<Path>) -> Result<()> {
    let recorder = CompactRecorder::new();
    model
        .save_file(path.as_ref().to_path_buf(), &recorder)
        .map_err(|e| ClassifierError::Model(format!("Failed to save model: {:?}", e)))
}
