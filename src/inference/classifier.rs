//! Classifier seam
//!
//! The service treats the model as an opaque function from a normalized
//! (1, 32, 32, 3) tensor to ten class scores.

use std::sync::{Mutex, PoisonError};

use burn::tensor::{backend::Backend, Tensor, TensorData};

use super::preprocess::NormalizedTensor;
use super::ranking::PredictionVector;
use crate::model::Cifar10Cnn;
use crate::utils::error::{ClassifierError, Result};

/// Anything that can score a preprocessed image
pub trait Classifier: Send + Sync {
    /// Run inference, returning one score per class
    fn classify(&self, input: &NormalizedTensor) -> Result<PredictionVector>;

    /// Short description used in logs
    fn describe(&self) -> String {
        "classifier".to_string()
    }
}

/// Classifier backed by a Burn CNN
///
/// The model is shared behind a mutex, so inferences run one at a time.
pub struct BurnClassifier<B: Backend> {
    model: Mutex<Cifar10Cnn<B>>,
    device: B::Device,
}

impl<B: Backend> BurnClassifier<B> {
    pub fn new(model: Cifar10Cnn<B>, device: B::Device) -> Self {
        Self {
            model: Mutex::new(model),
            device,
        }
    }

    /// Build the NCHW input tensor Burn's convolutions expect
    fn to_tensor(&self, input: &NormalizedTensor) -> Tensor<B, 4> {
        let data = TensorData::new(input.as_slice().to_vec(), input.shape());
        Tensor::<B, 4>::from_data(data, &self.device).permute([0, 3, 1, 2])
    }
}

impl<B: Backend> Classifier for BurnClassifier<B>
where
    B::Device: Send + Sync,
{
    fn classify(&self, input: &NormalizedTensor) -> Result<PredictionVector> {
        let tensor = self.to_tensor(input);
        // Read-only after load: a poisoned lock still guards a usable model
        let model = self.model.lock().unwrap_or_else(PoisonError::into_inner);

        let output = model.forward_softmax(tensor);
        let scores: Vec<f32> = output
            .into_data()
            .to_vec()
            .map_err(|e| ClassifierError::Inference(format!("Failed to extract probabilities: {:?}", e)))?;

        PredictionVector::new(scores)
    }

    fn describe(&self) -> String {
        format!("Cifar10Cnn on {:?}", self.device)
    }
}
