//! Pretrained multi-label classifier over title embeddings.
//!
//! The classifier is a one-vs-rest logistic regression exported from the
//! training run as two JSON artifacts: a weights file (`coefficients`
//! matrix plus per-label `intercepts`) and the label set it was trained
//! against. Both are loaded read-only at process start.

use std::path::Path;

use ndarray::{Array1, Array2, ArrayView1};
use serde::Deserialize;

use crate::error::PipelineError;
use crate::math::sigmoid;

/// Serialized weight layout of the classifier artifact.
#[derive(Debug, Deserialize)]
struct ClassifierWeights {
    /// One coefficient row per label, `n_labels × embedding_dim`.
    coefficients: Vec<Vec<f32>>,
    /// One intercept per label.
    intercepts: Vec<f32>,
}

/// One-vs-rest logistic regression over sentence embeddings.
#[derive(Debug)]
pub struct LinearClassifier {
    /// `n_labels × embedding_dim`, row-major.
    coefficients: Array2<f32>,
    intercepts: Array1<f32>,
    labels: Vec<String>,
}

impl LinearClassifier {
    /// Load the classifier from its weights and label-set artifacts.
    ///
    /// Fails with a `ModelLoad` error when either file is missing or the
    /// shapes are inconsistent.
    pub fn load(classifier_path: &Path, labels_path: &Path) -> Result<Self, PipelineError> {
        let weights_raw =
            std::fs::read_to_string(classifier_path).map_err(|e| PipelineError::ModelLoad {
                path: classifier_path.to_path_buf(),
                message: e.to_string(),
            })?;
        let weights: ClassifierWeights =
            serde_json::from_str(&weights_raw).map_err(|e| PipelineError::ModelLoad {
                path: classifier_path.to_path_buf(),
                message: e.to_string(),
            })?;

        let labels_raw =
            std::fs::read_to_string(labels_path).map_err(|e| PipelineError::ModelLoad {
                path: labels_path.to_path_buf(),
                message: e.to_string(),
            })?;
        let labels: Vec<String> =
            serde_json::from_str(&labels_raw).map_err(|e| PipelineError::ModelLoad {
                path: labels_path.to_path_buf(),
                message: e.to_string(),
            })?;

        let classifier = Self::from_parts(weights.coefficients, weights.intercepts, labels)
            .map_err(|message| PipelineError::ModelLoad {
                path: classifier_path.to_path_buf(),
                message,
            })?;

        tracing::info!(
            "Loaded classifier: {} labels x {} dims",
            classifier.labels.len(),
            classifier.coefficients.ncols()
        );
        Ok(classifier)
    }

    /// Assemble a classifier from in-memory weights, validating shapes.
    pub fn from_parts(
        coefficients: Vec<Vec<f32>>,
        intercepts: Vec<f32>,
        labels: Vec<String>,
    ) -> Result<Self, String> {
        if coefficients.len() != labels.len() {
            return Err(format!(
                "coefficient rows ({}) do not match label count ({})",
                coefficients.len(),
                labels.len()
            ));
        }
        if intercepts.len() != labels.len() {
            return Err(format!(
                "intercepts ({}) do not match label count ({})",
                intercepts.len(),
                labels.len()
            ));
        }
        let dim = coefficients.first().map(Vec::len).unwrap_or(0);
        if coefficients.iter().any(|row| row.len() != dim) {
            return Err("coefficient rows have inconsistent dimensions".to_string());
        }

        let flat: Vec<f32> = coefficients.into_iter().flatten().collect();
        let coefficients = Array2::from_shape_vec((labels.len(), dim), flat)
            .map_err(|e| e.to_string())?;

        Ok(Self {
            coefficients,
            intercepts: Array1::from_vec(intercepts),
            labels,
        })
    }

    /// The label set, in classifier label order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Per-label probabilities for one title embedding.
    ///
    /// `sigmoid(coefficients · embedding + intercept)` per label — the
    /// one-vs-rest decision function of the exported model.
    pub fn predict_proba(&self, embedding: &[f32]) -> Result<Vec<f32>, PipelineError> {
        if embedding.len() != self.coefficients.ncols() {
            return Err(PipelineError::inference(
                "classifier",
                format!(
                    "embedding dimension {} does not match model dimension {}",
                    embedding.len(),
                    self.coefficients.ncols()
                ),
            ));
        }

        let x = ArrayView1::from(embedding);
        let probs = (0..self.labels.len())
            .map(|i| sigmoid(self.coefficients.row(i).dot(&x) + self.intercepts[i]))
            .collect();
        Ok(probs)
    }

    /// Select output tags from a probability vector.
    ///
    /// All labels with probability ≥ `threshold`, in label order. If none
    /// clear the threshold, the `max_tags` highest-probability labels in
    /// descending order instead; the sort is stable, so equal
    /// probabilities keep ascending label-index order.
    pub fn select_tags(&self, probs: &[f32], threshold: f32, max_tags: usize) -> Vec<String> {
        let mut tags: Vec<String> = probs
            .iter()
            .enumerate()
            .filter(|(_, p)| **p >= threshold)
            .map(|(i, _)| self.labels[i].clone())
            .collect();

        if tags.is_empty() {
            let mut order: Vec<usize> = (0..probs.len()).collect();
            order.sort_by(|&a, &b| {
                probs[b]
                    .partial_cmp(&probs[a])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            tags = order
                .into_iter()
                .take(max_tags)
                .map(|i| self.labels[i].clone())
                .collect();
        }

        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label_names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("label{i}")).collect()
    }

    /// Classifier whose probabilities we control directly through
    /// select_tags; weights are irrelevant for selection tests.
    fn classifier_with_labels(n: usize) -> LinearClassifier {
        LinearClassifier::from_parts(vec![vec![0.0]; n], vec![0.0; n], label_names(n)).unwrap()
    }

    #[test]
    fn test_from_parts_rejects_shape_mismatch() {
        let err = LinearClassifier::from_parts(
            vec![vec![0.0; 4]; 2],
            vec![0.0; 2],
            label_names(3),
        )
        .unwrap_err();
        assert!(err.contains("label count"));
    }

    #[test]
    fn test_from_parts_rejects_ragged_rows() {
        let err = LinearClassifier::from_parts(
            vec![vec![0.0; 4], vec![0.0; 3]],
            vec![0.0; 2],
            label_names(2),
        )
        .unwrap_err();
        assert!(err.contains("inconsistent"));
    }

    #[test]
    fn test_predict_proba_known_weights() {
        // Single label, weights [1, 0], intercept 0: p = sigmoid(x[0])
        let clf = LinearClassifier::from_parts(
            vec![vec![1.0, 0.0]],
            vec![0.0],
            vec!["portret".to_string()],
        )
        .unwrap();

        let probs = clf.predict_proba(&[0.0, 5.0]).unwrap();
        assert!((probs[0] - 0.5).abs() < 1e-6);

        let probs = clf.predict_proba(&[10.0, 0.0]).unwrap();
        assert!(probs[0] > 0.99);
    }

    #[test]
    fn test_predict_proba_dimension_mismatch_is_inference_error() {
        let clf = classifier_with_labels(1);
        let err = clf.predict_proba(&[0.0, 0.0]).unwrap_err();
        assert!(matches!(err, PipelineError::Inference { .. }));
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let clf = classifier_with_labels(2);
        let tags = clf.select_tags(&[0.25, 0.24999], 0.25, 5);
        assert_eq!(tags, vec!["label0".to_string()]);
    }

    #[test]
    fn test_threshold_path_preserves_label_order() {
        let clf = classifier_with_labels(3);
        // label2 scores higher than label0 but label order wins
        let tags = clf.select_tags(&[0.3, 0.1, 0.9], 0.25, 5);
        assert_eq!(tags, vec!["label0".to_string(), "label2".to_string()]);
    }

    #[test]
    fn test_fallback_emits_exactly_max_tags_descending() {
        let clf = classifier_with_labels(7);
        let probs = [0.01, 0.07, 0.03, 0.09, 0.02, 0.05, 0.04];
        let tags = clf.select_tags(&probs, 0.25, 5);
        assert_eq!(
            tags,
            vec!["label3", "label1", "label5", "label6", "label2"]
        );
    }

    #[test]
    fn test_fallback_ties_keep_label_index_order() {
        let clf = classifier_with_labels(4);
        let tags = clf.select_tags(&[0.1, 0.2, 0.1, 0.2], 0.25, 3);
        // 0.2s first (indices 1, 3), then the first 0.1 (index 0)
        assert_eq!(tags, vec!["label1", "label3", "label0"]);
    }

    #[test]
    fn test_fallback_caps_at_available_labels() {
        let clf = classifier_with_labels(2);
        let tags = clf.select_tags(&[0.1, 0.2], 0.25, 5);
        assert_eq!(tags.len(), 2);
    }
}
