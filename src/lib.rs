//! # CIFAR-10 Classifier Service
//!
//! Serves a pre-trained CIFAR-10 convolutional network over HTTP using the Burn
//! framework for inference and axum for the web layer.
//!
//! ## Modules
//!
//! - `dataset`: CIFAR-10 class table
//! - `model`: CNN architecture and weight loading
//! - `inference`: preprocessing, the classifier seam, top-k ranking and the predictor pipeline
//! - `server`: HTTP routes, shared state and temporary upload storage
//! - `utils`: error types and logging
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cifar10_classifier::inference::{BurnClassifier, Predictor};
//! use cifar10_classifier::model::load_classifier;
//!
//! let device = cifar10_classifier::backend::default_device();
//! let model = load_classifier("models/cifar10_cnn.mpk", None, &device)?;
//! let predictor = Predictor::new(Arc::new(BurnClassifier::new(model, device)));
//! let result = predictor.predict_file("cat.png".as_ref())?;
//! println!("{}", result.display());
//! ```

pub mod backend;
pub mod dataset;
pub mod inference;
pub mod model;
pub mod server;
pub mod utils;

pub use dataset::{class_name, CLASS_NAMES};
pub use inference::{
    rank_top_k, BurnClassifier, ChannelLayout, Classifier, NormalizedTensor, PredictionResult,
    PredictionVector, Predictor, Preprocessor, RankedPrediction,
};
pub use model::{Cifar10Cnn, Cifar10CnnConfig};
pub use utils::error::{ClassifierError, Result};

/// Number of CIFAR-10 classes
pub const NUM_CLASSES: usize = 10;

/// Side length of the square input the classifier expects
pub const IMAGE_SIZE: usize = 32;

/// Number of color channels fed to the classifier
pub const NUM_CHANNELS: usize = 3;

/// Number of predictions returned by the upload endpoint
pub const TOP_K: usize = 3;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
