// ============================================================
// Layer 2: PipelineUseCase
// ============================================================
// Orchestrates one classification run in order:
//
//   Step 1: Load the CSV                 (Layer 4 - data)
//   Step 2: Coerce to numeric, drop rows (Layer 4 - data)
//   Step 3: Encode labels                (Layer 4 - data)
//   Step 4: Train/test split             (Layer 4 - data)
//   Step 5: Fit scaler on train, apply   (Layer 4 - data)
//   Step 6: Fit the estimator            (Layer 5 - ml)
//   Step 7: Predict + evaluate           (Layer 3 - domain)
//   Step 8: Save config and reports      (Layer 6 - infra)

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::{
    label_encoder::{LabelEncoder, LabelEncoding},
    loader::CsvLoader,
    preprocessor::Preprocessor,
    scaler::StandardScaler,
    splitter::train_test_split,
};
use crate::domain::{
    dataset::Dataset,
    evaluation::{evaluate, ClassificationReport},
    traits::{Classifier, TableSource},
};
use crate::infra::report_store::ReportStore;
use crate::ml::{
    attention::{AttentionClassifier, AttentionConfig},
    booster::{BoosterConfig, GradientBoostedTrees},
};

// ─── Configuration ───────────────────────────────────────────────────────────
/// Where the data comes from and how it is prepared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    pub csv_path:       String,
    pub label_column:   String,
    pub drop_column:    Option<String>,
    pub label_encoding: LabelEncoding,
    pub label_offset:   Option<i64>,
    pub test_fraction:  f64,
    pub stratify:       bool,
    pub seed:           u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv_path:       "data/antibodies.csv".to_string(),
            label_column:   "class".to_string(),
            drop_column:    Some("id".to_string()),
            label_encoding: LabelEncoding::Auto,
            label_offset:   None,
            test_fraction:  0.2,
            stratify:       true,
            seed:           42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EstimatorConfig {
    Booster(BoosterConfig),
    Attention(AttentionConfig),
}

/// Everything needed to reproduce a run.
/// Serialisable so it can be saved next to the reports and replayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub data:       DataConfig,
    pub estimator:  EstimatorConfig,
    pub report_dir: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data:       DataConfig::default(),
            estimator:  EstimatorConfig::Booster(BoosterConfig::default()),
            report_dir: None,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid pipeline config in '{}'", path.display()))
    }
}

// ─── Outcome ─────────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub estimator:    String,
    pub dropped_rows: usize,
    pub n_train:      usize,
    pub n_test:       usize,
    pub classes:      Vec<String>,
    pub train_report: ClassificationReport,
    pub test_report:  ClassificationReport,
}

// ─── PipelineUseCase ─────────────────────────────────────────────────────────
pub struct PipelineUseCase {
    config: PipelineConfig,
}

impl PipelineUseCase {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<PipelineOutcome> {
        let cfg  = &self.config;
        let data = &cfg.data;
        ensure!(
            data.test_fraction > 0.0 && data.test_fraction < 1.0,
            "test fraction must be between 0 and 1 (exclusive), got {}",
            data.test_fraction
        );

        // ── Step 1: Load ──────────────────────────────────────────────────────
        tracing::info!("Loading '{}'", data.csv_path);
        let table = CsvLoader::new(&data.csv_path).load_table()?;
        tracing::info!("Loaded {} rows, {} columns", table.row_count(), table.headers.len());

        // ── Step 2: Numeric coercion ──────────────────────────────────────────
        let mut preprocessor = Preprocessor::new(&data.label_column);
        if let Some(col) = &data.drop_column {
            preprocessor = preprocessor.dropping(col);
        }
        let numeric = preprocessor.process(&table)?;

        // ── Step 3: Labels ────────────────────────────────────────────────────
        let encoder = LabelEncoder::fit(&numeric.raw_labels, data.label_encoding, data.label_offset)?;
        let labels  = encoder.transform(&numeric.raw_labels)?;
        ensure!(
            encoder.n_classes() >= 2,
            "need at least 2 classes, found {}",
            encoder.n_classes()
        );
        let dataset = Dataset {
            feature_names: numeric.feature_names,
            features:      numeric.features,
            labels,
            classes:       encoder.classes().to_vec(),
        };
        tracing::info!(
            "{} usable rows, {} features, {} classes {:?}",
            dataset.n_rows(),
            dataset.n_features(),
            dataset.n_classes(),
            dataset.class_counts()
        );

        // ── Step 4: Split ─────────────────────────────────────────────────────
        let split = train_test_split(&dataset.labels, data.test_fraction, data.seed, data.stratify)?;
        let train = dataset.select(&split.train);
        let test  = dataset.select(&split.test);
        tracing::info!("Split: {} train, {} test", train.n_rows(), test.n_rows());

        // ── Step 5: Scale (fit on train only) ─────────────────────────────────
        let scaler  = StandardScaler::fit(&train.features)?;
        let x_train = scaler.transform(&train.features)?;
        let x_test  = scaler.transform(&test.features)?;

        // ── Step 6: Fit ───────────────────────────────────────────────────────
        let store = cfg.report_dir.as_ref().map(|dir| ReportStore::new(dir)).transpose()?;
        let mut model: Box<dyn Classifier> = match &cfg.estimator {
            EstimatorConfig::Booster(b) => Box::new(GradientBoostedTrees::new(b.clone())),
            EstimatorConfig::Attention(a) => {
                let mut clf = AttentionClassifier::new(a.clone(), data.seed)
                    .with_validation(x_test.clone(), test.labels.clone());
                if let Some(store) = &store {
                    clf = clf.with_metrics_log(store.dir());
                }
                Box::new(clf)
            }
        };
        tracing::info!("Fitting {}", model.name());
        model.fit(&x_train, &train.labels, dataset.n_classes())?;

        // ── Step 7: Evaluate ──────────────────────────────────────────────────
        let train_pred   = model.predict(&x_train)?;
        let test_pred    = model.predict(&x_test)?;
        let train_report = evaluate(&train.labels, &train_pred, &dataset.classes)?;
        let test_report  = evaluate(&test.labels, &test_pred, &dataset.classes)?;
        tracing::info!(
            "Accuracy: train={:.4}, test={:.4}",
            train_report.accuracy,
            test_report.accuracy
        );

        // ── Step 8: Persist ───────────────────────────────────────────────────
        if let Some(store) = &store {
            store.save_config(cfg)?;
            store.save_report("train", &train_report)?;
            store.save_report("test", &test_report)?;
            tracing::info!("Reports written to '{}'", store.dir().display());
        }

        Ok(PipelineOutcome {
            estimator:    model.name(),
            dropped_rows: numeric.dropped_rows,
            n_train:      train.n_rows(),
            n_test:       test.n_rows(),
            classes:      dataset.classes,
            train_report,
            test_report,
        })
    }
}
