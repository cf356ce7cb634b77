//! Error Handling Module
//!
//! Defines the error type shared by the preprocessing, inference and server layers.
//! Uses thiserror for ergonomic error definitions.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for classifier operations
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// The uploaded bytes could not be decoded as an image
    #[error("Failed to decode image: {0}")]
    ImageDecode(String),

    /// The decoded image has a channel layout the preprocessor does not handle
    #[error("Unsupported image with {0} channel(s); expected 1 (grayscale), 3 (RGB) or 4 (RGBA)")]
    UnsupportedChannels(u8),

    /// Model weights were not found on disk
    #[error("Model file not found: {0}")]
    ModelNotFound(PathBuf),

    /// Error with model operations (incompatible record, bad config)
    #[error("Model error: {0}")]
    Model(String),

    /// Error while running the classifier
    #[error("Inference error: {0}")]
    Inference(String),

    /// The classifier produced a score vector of the wrong length
    #[error("Invalid prediction vector: expected {expected} scores, got {actual}")]
    InvalidPrediction { expected: usize, actual: usize },

    /// The upload request was malformed or carried no file
    #[error("Invalid upload: {0}")]
    Upload(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for ClassifierError {
    fn from(err: image::ImageError) -> Self {
        ClassifierError::ImageDecode(err.to_string())
    }
}

/// Convenience Result type for classifier operations
pub type Result<T> = std::result::Result<T, ClassifierError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClassifierError::Inference("backend failure".to_string());
        assert_eq!(format!("{}", err), "Inference error: backend failure");
    }

    #[test]
    fn test_unsupported_channels_display() {
        let err = ClassifierError::UnsupportedChannels(2);
        assert!(err.to_string().contains("2 channel(s)"));
    }

    #[test]
    fn test_model_not_found_mentions_path() {
        let err = ClassifierError::ModelNotFound(PathBuf::from("models/cifar10_cnn.mpk"));
        assert!(err.to_string().contains("cifar10_cnn.mpk"));
    }

    #[test]
    fn test_image_error_converts_to_decode() {
        let err = image::load_from_memory(b"definitely not an image").unwrap_err();
        let converted: ClassifierError = err.into();
        assert!(matches!(converted, ClassifierError::ImageDecode(_)));
    }
}
