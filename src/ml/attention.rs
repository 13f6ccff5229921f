// ============================================================
// Layer 5: Attention Classifier
// ============================================================
// Adapts the burn model + training loop to the Classifier
// trait so the pipeline can drive it like any other estimator.
//
// Optional extras:
//   with_validation(x, y) : rows scored after every epoch
//                           (monitoring only, never trained on)
//   with_metrics_log(dir) : per-epoch metrics.csv in `dir`

use anyhow::{ensure, Result};
use burn::prelude::*;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::dataset::RowDataset;
use crate::domain::traits::Classifier;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::TabularAttentionModel;
use crate::ml::trainer::{run_training, InferBackend, TrainingRun};

/// Hyperparameters for the attention network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionConfig {
    pub d_model:       usize,
    pub num_heads:     usize,
    pub num_layers:    usize,
    pub d_ff:          usize,
    pub dropout:       f64,
    pub weight_decay:  f64,
    pub learning_rate: f64,
    pub epochs:        usize,
    pub batch_size:    usize,
}

impl Default for AttentionConfig {
    fn default() -> Self {
        Self {
            d_model:       32,
            num_heads:     4,
            num_layers:    2,
            d_ff:          64,
            dropout:       0.1,
            weight_decay:  1e-4,
            learning_rate: 1e-3,
            epochs:        50,
            batch_size:    16,
        }
    }
}

pub struct AttentionClassifier {
    config:      AttentionConfig,
    seed:        u64,
    validation:  Option<(Array2<f64>, Vec<usize>)>,
    metrics_dir: Option<PathBuf>,
    model:       Option<TabularAttentionModel<InferBackend>>,
    n_features:  usize,
    history:     Vec<EpochMetrics>,
}

impl AttentionClassifier {
    pub fn new(config: AttentionConfig, seed: u64) -> Self {
        Self {
            config,
            seed,
            validation:  None,
            metrics_dir: None,
            model:       None,
            n_features:  0,
            history:     Vec::new(),
        }
    }

    pub fn with_validation(mut self, features: Array2<f64>, labels: Vec<usize>) -> Self {
        self.validation = Some((features, labels));
        self
    }

    pub fn with_metrics_log(mut self, dir: impl Into<PathBuf>) -> Self {
        self.metrics_dir = Some(dir.into());
        self
    }
}

impl Classifier for AttentionClassifier {
    fn name(&self) -> String {
        format!(
            "attention-{}x{}h{}",
            self.config.num_layers, self.config.d_model, self.config.num_heads
        )
    }

    fn fit(&mut self, features: &Array2<f64>, labels: &[usize], n_classes: usize) -> Result<()> {
        ensure!(n_classes >= 2, "need at least 2 classes, got {}", n_classes);

        let train = RowDataset::from_matrix(features, labels)?;
        let val = match &self.validation {
            Some((x, y)) => {
                ensure!(
                    x.ncols() == features.ncols(),
                    "validation rows have {} features, training rows have {}",
                    x.ncols(),
                    features.ncols()
                );
                Some(RowDataset::from_matrix(x, y)?)
            }
            None => None,
        };
        let logger = self.metrics_dir.as_ref().map(|dir| MetricsLogger::new(dir)).transpose()?;

        let run = TrainingRun {
            config:     &self.config,
            n_features: features.ncols(),
            n_classes,
            seed:       self.seed,
            logger:     logger.as_ref(),
        };
        let (model, history) = run_training(run, train, val)?;
        if let Some(last) = history.last() {
            tracing::info!(
                "{} finished after {} epochs: train_loss={:.4}, train_acc={:.1}%",
                self.name(),
                last.epoch,
                last.train_loss,
                last.train_acc * 100.0
            );
        }

        self.model      = Some(model);
        self.n_features = features.ncols();
        self.history    = history;
        Ok(())
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>> {
        let Some(model) = &self.model else {
            anyhow::bail!("model has not been fitted");
        };
        ensure!(
            features.ncols() == self.n_features,
            "model was fitted on {} features but got {}",
            self.n_features,
            features.ncols()
        );
        if features.nrows() == 0 {
            return Ok(Vec::new());
        }

        let device = Default::default();
        let flat: Vec<f32> = features.iter().map(|&v| v as f32).collect();
        let input = Tensor::<InferBackend, 1>::from_floats(flat.as_slice(), &device)
            .reshape([features.nrows(), features.ncols()]);

        Ok(model
            .predict_classes(input)
            .into_data()
            .iter::<i64>()
            .map(|c| c as usize)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_config() -> AttentionConfig {
        AttentionConfig {
            d_model:    8,
            num_heads:  2,
            num_layers: 1,
            d_ff:       16,
            dropout:    0.0,
            epochs:     30,
            batch_size: 8,
            learning_rate: 1e-2,
            ..Default::default()
        }
    }

    /// Two classes separated by the sign of every feature
    fn two_blobs() -> (Array2<f64>, Vec<usize>) {
        let mut values = Vec::new();
        let mut labels = Vec::new();
        for i in 0..32 {
            let class = i % 2;
            let sign  = if class == 0 { -1.0 } else { 1.0 };
            let jitter = (i as f64) * 0.01;
            values.extend([sign * (1.0 + jitter), sign * (1.5 - jitter), sign]);
            labels.push(class);
        }
        (Array2::from_shape_vec((32, 3), values).unwrap(), labels)
    }

    #[test]
    fn test_predict_before_fit_is_error() {
        let clf = AttentionClassifier::new(tiny_config(), 42);
        assert!(clf.predict(&Array2::zeros((1, 3))).is_err());
    }

    #[test]
    fn test_rejects_heads_not_dividing_width() {
        let (x, y) = two_blobs();
        let cfg = AttentionConfig { d_model: 10, num_heads: 3, ..tiny_config() };
        let mut clf = AttentionClassifier::new(cfg, 42);
        assert!(clf.fit(&x, &y, 2).is_err());
    }

    #[test]
    fn test_zero_heads_is_error_not_panic() {
        let (x, y) = two_blobs();
        let cfg = AttentionConfig { num_heads: 0, ..tiny_config() };
        let mut clf = AttentionClassifier::new(cfg, 42);
        assert!(clf.fit(&x, &y, 2).is_err());
    }

    #[test]
    fn test_learns_separable_data_and_logs_epochs() {
        let (x, y) = two_blobs();
        let dir = tempfile::tempdir().unwrap();
        let mut clf = AttentionClassifier::new(tiny_config(), 42)
            .with_validation(x.clone(), y.clone())
            .with_metrics_log(dir.path());
        clf.fit(&x, &y, 2).unwrap();

        let pred    = clf.predict(&x).unwrap();
        let correct = pred.iter().zip(&y).filter(|(p, t)| p == t).count();
        assert_eq!(pred.len(), 32);
        assert!(correct >= 28, "only {correct}/32 correct");

        assert_eq!(clf.history.len(), 30);
        assert_eq!(clf.history.last().map(|m| m.epoch), Some(30));
        let csv = std::fs::read_to_string(dir.path().join("metrics.csv")).unwrap();
        assert_eq!(csv.lines().count(), 31);
    }

    #[test]
    fn test_feature_mismatch_is_error() {
        let (x, y) = two_blobs();
        let mut clf = AttentionClassifier::new(AttentionConfig { epochs: 1, ..tiny_config() }, 1);
        clf.fit(&x, &y, 2).unwrap();
        assert!(clf.predict(&Array2::zeros((2, 4))).is_err());
    }
}
