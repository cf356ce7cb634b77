//! Inference Predictor Module
//!
//! Ties decoding, preprocessing, the classifier and ranking into a single call.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use image::ImageReader;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::classifier::Classifier;
use super::preprocess::Preprocessor;
use super::ranking::{rank_top_k, PredictionVector, RankedPrediction};
use crate::dataset::class_name;
use crate::utils::error::Result;
use crate::TOP_K;

/// Result of a single prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Path to the input image (if applicable)
    pub image_path: Option<PathBuf>,

    /// Predicted class index
    pub predicted_class: usize,

    /// Predicted class name
    pub class_name: String,

    /// Confidence score for the predicted class
    pub confidence: f32,

    /// Full probability distribution over all classes
    pub probabilities: Vec<f32>,

    /// Top-k predictions, highest confidence first
    pub top_predictions: Vec<RankedPrediction>,

    /// Inference time in milliseconds
    pub inference_time_ms: f64,
}

impl PredictionResult {
    pub fn new(predictions: PredictionVector, top_k: usize, inference_time: Duration) -> Self {
        let (predicted_class, confidence) = predictions.argmax();
        let top_predictions = rank_top_k(&predictions, top_k);

        Self {
            image_path: None,
            predicted_class,
            class_name: class_name(predicted_class).unwrap_or("unknown").to_string(),
            confidence,
            probabilities: predictions.scores().to_vec(),
            top_predictions,
            inference_time_ms: inference_time.as_secs_f64() * 1000.0,
        }
    }

    /// Pretty print the prediction result
    pub fn display(&self) -> String {
        let mut output = String::new();

        if let Some(path) = &self.image_path {
            output.push_str(&format!("Image: {:?}\n", path));
        }

        output.push_str(&format!(
            "Prediction: {} (class {})\n",
            self.class_name, self.predicted_class
        ));
        output.push_str(&format!("Confidence: {:.2}%\n", self.confidence * 100.0));
        output.push_str(&format!("Inference time: {:.2} ms\n", self.inference_time_ms));

        output.push_str(&format!("\nTop-{} predictions:\n", self.top_predictions.len()));
        for (i, prediction) in self.top_predictions.iter().enumerate() {
            output.push_str(&format!(
                "  {}. {} - {:.2}%\n",
                i + 1,
                prediction.label,
                prediction.confidence * 100.0
            ));
        }

        output
    }
}

/// Runs the full decode -> preprocess -> classify -> rank pipeline
#[derive(Clone)]
pub struct Predictor {
    classifier: Arc<dyn Classifier>,
    preprocessor: Preprocessor,
    top_k: usize,
}

impl Predictor {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            classifier,
            preprocessor: Preprocessor::default(),
            top_k: TOP_K,
        }
    }

    /// Configure how many ranked predictions to keep
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Predict on an already decoded image
    pub fn predict_image(&self, image: &image::DynamicImage) -> Result<PredictionResult> {
        let tensor = self.preprocessor.preprocess(image)?;

        let start = Instant::now();
        let predictions = self.classifier.classify(&tensor)?;
        let elapsed = start.elapsed();
        debug!("Inference took {:.2} ms", elapsed.as_secs_f64() * 1000.0);

        Ok(PredictionResult::new(predictions, self.top_k, elapsed))
    }

    /// Predict on encoded image bytes
    pub fn predict_bytes(&self, bytes: &[u8]) -> Result<PredictionResult> {
        let image = image::load_from_memory(bytes)?;
        self.predict_image(&image)
    }

    /// Predict on an image file, detecting the format from its contents
    pub fn predict_file(&self, path: &Path) -> Result<PredictionResult> {
        let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
        let mut result = self.predict_image(&image)?;
        result.image_path = Some(path.to_path_buf());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::NormalizedTensor;
    use crate::utils::error::ClassifierError;
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;

    /// Scores classes by the mean intensity of the input
    struct BrightnessClassifier;

    impl Classifier for BrightnessClassifier {
        fn classify(&self, input: &NormalizedTensor) -> Result<PredictionVector> {
            let mean = input.as_slice().iter().sum::<f32>() / input.as_slice().len() as f32;
            let mut scores = vec![0.05; 10];
            scores[(mean * 9.0).round() as usize] = 0.55;
            PredictionVector::new(scores)
        }
    }

    fn png_bytes(image: &DynamicImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn predictor() -> Predictor {
        Predictor::new(Arc::new(BrightnessClassifier))
    }

    #[test]
    fn test_predict_bytes_ranks_top3() {
        let white = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(40, 40, image::Rgb([255, 255, 255])));
        let result = predictor().predict_bytes(&png_bytes(&white)).unwrap();

        assert_eq!(result.predicted_class, 9);
        assert_eq!(result.class_name, "truck");
        assert_eq!(result.top_predictions.len(), 3);
        assert_eq!(result.top_predictions[0].label, "truck");
        assert_eq!(result.top_predictions[1].label, "airplane");
        assert_eq!(result.probabilities.len(), 10);
    }

    #[test]
    fn test_predict_file_sets_path() {
        let dir = tempfile::tempdir().unwrap();
        // No extension, so the format must be sniffed from the contents
        let path = dir.path().join("upload");
        std::fs::write(&path, png_bytes(&DynamicImage::new_luma8(10, 10))).unwrap();

        let result = predictor().predict_file(&path).unwrap();
        assert_eq!(result.image_path.as_deref(), Some(path.as_path()));
        assert_eq!(result.class_name, "airplane");
    }

    #[test]
    fn test_predict_bytes_rejects_non_image() {
        let err = predictor().predict_bytes(b"%PDF-1.4 nope").unwrap_err();
        assert!(matches!(err, ClassifierError::ImageDecode(_)));
    }

    #[test]
    fn test_top_k_is_configurable() {
        let result = predictor()
            .with_top_k(5)
            .predict_image(&DynamicImage::new_rgb8(8, 8))
            .unwrap();
        assert_eq!(result.top_predictions.len(), 5);
    }

    #[test]
    fn test_display_lists_predictions() {
        let result = predictor()
            .predict_image(&DynamicImage::new_rgb8(8, 8))
            .unwrap();
        let text = result.display();
        assert!(text.contains("Prediction: airplane"));
        assert!(text.contains("Top-3 predictions"));
    }
}
