// ============================================================
// Layer 5: Gradient-Boosted Trees (gbdt crate)
// ============================================================
// Multi-class boosting as one-vs-rest:
//   - one binary GBDT per class, LogLikelyhood loss,
//     labels +1 (this class) / -1 (every other class)
//   - prediction = argmax over the per-class scores
//
// Three hyperparameter presets mirror the defaults commonly
// used with the big boosting libraries:
//
//   flavor  depth  shrinkage  rounds  min leaf
//   xgb       6      0.30      100       1
//   lgbm      5      0.10      100      20
//   catb      6      0.03      300       1
//
// Row and feature subsampling stay at 1.0 so a fit is fully
// deterministic.

use anyhow::{ensure, Result};
use gbdt::{
    config::Config,
    decision_tree::{Data, DataVec, ValueType},
    gradient_boost::GBDT,
};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::domain::traits::Classifier;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoosterFlavor {
    #[default]
    Xgb,
    Lgbm,
    Catb,
}

impl BoosterFlavor {
    pub fn label(self) -> &'static str {
        match self {
            BoosterFlavor::Xgb  => "xgb",
            BoosterFlavor::Lgbm => "lgbm",
            BoosterFlavor::Catb => "catb",
        }
    }

    /// Preset hyperparameters for this flavor
    pub fn defaults(self) -> BoosterConfig {
        let (max_depth, learning_rate, rounds, min_leaf_size) = match self {
            BoosterFlavor::Xgb  => (6, 0.3, 100, 1),
            BoosterFlavor::Lgbm => (5, 0.1, 100, 20),
            BoosterFlavor::Catb => (6, 0.03, 300, 1),
        };
        BoosterConfig { flavor: self, max_depth, learning_rate, rounds, min_leaf_size }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoosterConfig {
    pub flavor:        BoosterFlavor,
    pub max_depth:     u32,
    pub learning_rate: f64,
    pub rounds:        usize,
    pub min_leaf_size: usize,
}

impl Default for BoosterConfig {
    fn default() -> Self {
        BoosterFlavor::default().defaults()
    }
}

/// Scorer for one class in the one-vs-rest ensemble
enum ClassScorer {
    /// Class absent from training data; never predicted
    Absent,
    /// Every training row belongs to this class
    Always,
    Trained(GBDT),
}

pub struct GradientBoostedTrees {
    config:     BoosterConfig,
    scorers:    Vec<ClassScorer>,
    n_features: usize,
}

impl GradientBoostedTrees {
    pub fn new(config: BoosterConfig) -> Self {
        Self { config, scorers: Vec::new(), n_features: 0 }
    }

    fn gbdt_config(&self, n_features: usize) -> Config {
        let mut cfg = Config::new();
        cfg.set_feature_size(n_features);
        cfg.set_max_depth(self.config.max_depth);
        cfg.set_iterations(self.config.rounds);
        cfg.set_shrinkage(self.config.learning_rate as ValueType);
        cfg.set_min_leaf_size(self.config.min_leaf_size);
        cfg.set_loss("LogLikelyhood");
        cfg.set_data_sample_ratio(1.0);
        cfg.set_feature_sample_ratio(1.0);
        cfg.set_training_optimization_level(2);
        cfg.set_debug(false);
        cfg
    }
}

fn row_values(features: &Array2<f64>) -> Vec<Vec<ValueType>> {
    features
        .rows()
        .into_iter()
        .map(|row| row.iter().map(|&v| v as ValueType).collect())
        .collect()
}

impl Classifier for GradientBoostedTrees {
    fn name(&self) -> String {
        format!("gbdt-{}", self.config.flavor.label())
    }

    fn fit(&mut self, features: &Array2<f64>, labels: &[usize], n_classes: usize) -> Result<()> {
        ensure!(n_classes >= 2, "need at least 2 classes, got {}", n_classes);
        ensure!(features.nrows() == labels.len(), "feature rows and labels differ in length");
        ensure!(features.nrows() > 0, "cannot fit on an empty training set");
        ensure!(self.config.rounds > 0, "boosting rounds must be positive");

        let rows = row_values(features);
        self.n_features = features.ncols();
        self.scorers.clear();

        for class in 0..n_classes {
            let positives = labels.iter().filter(|&&l| l == class).count();
            if positives == 0 {
                tracing::warn!("Class index {} has no training rows", class);
                self.scorers.push(ClassScorer::Absent);
                continue;
            }
            if positives == labels.len() {
                self.scorers.push(ClassScorer::Always);
                continue;
            }

            let mut data: DataVec = rows
                .iter()
                .zip(labels)
                .map(|(row, &l)| {
                    let target = if l == class { 1.0 } else { -1.0 };
                    Data::new_training_data(row.clone(), 1.0, target, None)
                })
                .collect();

            let mut model = GBDT::new(&self.gbdt_config(self.n_features));
            model.fit(&mut data);
            tracing::debug!("Fitted one-vs-rest ensemble for class {} ({} positives)", class, positives);
            self.scorers.push(ClassScorer::Trained(model));
        }

        tracing::info!(
            "{}: {} ensembles x {} rounds, depth {}",
            self.name(),
            n_classes,
            self.config.rounds,
            self.config.max_depth
        );
        Ok(())
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>> {
        ensure!(!self.scorers.is_empty(), "model has not been fitted");
        ensure!(
            features.ncols() == self.n_features,
            "model was fitted on {} features but got {}",
            self.n_features,
            features.ncols()
        );

        let test: DataVec = row_values(features)
            .into_iter()
            .map(|row| Data::new_test_data(row, None))
            .collect();
        let n = test.len();

        let scores: Vec<Vec<f64>> = self
            .scorers
            .iter()
            .map(|scorer| match scorer {
                ClassScorer::Absent  => vec![f64::NEG_INFINITY; n],
                ClassScorer::Always  => vec![f64::INFINITY; n],
                ClassScorer::Trained(model) => model
                    .predict(&test)
                    .into_iter()
                    .map(|v| {
                        let v = v as f64;
                        if v.is_nan() { f64::NEG_INFINITY } else { v }
                    })
                    .collect(),
            })
            .collect();

        Ok((0..n)
            .map(|row| {
                let mut best = 0;
                for class in 1..scores.len() {
                    if scores[class][row] > scores[best][row] {
                        best = class;
                    }
                }
                best
            })
            .collect())
    }
}
