//! Inference module for image classification
//!
//! This module provides:
//! - Preprocessing of arbitrary images into the classifier's input tensor
//! - The `Classifier` seam and its Burn implementation
//! - Top-k ranking of class scores
//! - A `Predictor` running the whole pipeline

pub mod classifier;
pub mod predictor;
pub mod preprocess;
pub mod ranking;

// Re-export main types for convenience
pub use classifier::{BurnClassifier, Classifier};
pub use predictor::{PredictionResult, Predictor};
pub use preprocess::{ChannelLayout, NormalizedTensor, Preprocessor};
pub use ranking::{rank_top_k, PredictionVector, RankedPrediction};
