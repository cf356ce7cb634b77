//! Prediction ranking
//!
//! Turns the classifier's score vector into an ordered top-k list of labels.

use serde::{Deserialize, Serialize};

use crate::dataset::class_name;
use crate::utils::error::{ClassifierError, Result};
use crate::NUM_CLASSES;

/// Scores produced by the classifier, one per CIFAR-10 class
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionVector(Vec<f32>);

impl PredictionVector {
    /// Wrap a score vector, checking it has one entry per class
    pub fn new(scores: Vec<f32>) -> Result<Self> {
        if scores.len() != NUM_CLASSES {
            return Err(ClassifierError::InvalidPrediction {
                expected: NUM_CLASSES,
                actual: scores.len(),
            });
        }
        Ok(Self(scores))
    }

    pub fn scores(&self) -> &[f32] {
        &self.0
    }

    /// Index and score of the highest-scoring class
    pub fn argmax(&self) -> (usize, f32) {
        let ranked = ranked_indices(&self.0);
        (ranked[0], self.0[ranked[0]])
    }
}

/// A single label with its confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPrediction {
    pub label: String,
    pub confidence: f32,
}

/// Class indices ordered by descending score
///
/// The sort is stable, so equal scores keep ascending index order and the
/// lower index ranks first. NaN ranks below every real score.
fn ranked_indices(scores: &[f32]) -> Vec<usize> {
    let key = |i: usize| {
        let s = scores[i];
        if s.is_nan() {
            f32::NEG_INFINITY
        } else {
            s
        }
    };
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    // Not an ascending argsort reversed: that would put the higher index first on ties
    indices.sort_by(|&a, &b| key(b).total_cmp(&key(a)));
    indices
}

/// Return the `k` most confident predictions, highest first
///
/// Confidences are returned as produced by the classifier, without renormalization.
pub fn rank_top_k(predictions: &PredictionVector, k: usize) -> Vec<RankedPrediction> {
    ranked_indices(predictions.scores())
        .into_iter()
        .take(k)
        .map(|idx| RankedPrediction {
            label: class_name(idx).unwrap_or("unknown").to_string(),
            confidence: predictions.scores()[idx],
        })
        .collect()
}
