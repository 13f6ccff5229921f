// ============================================================
// Layer 3: Core Traits (Abstractions)
// ============================================================
// The application layer only talks to these traits:
//   - CsvLoader implements TableSource
//   - GradientBoostedTrees and AttentionClassifier implement
//     Classifier, so one pipeline drives every estimator
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)
//            Rust Book §17 (Trait Objects)

use anyhow::Result;
use ndarray::Array2;

use crate::domain::dataset::RawTable;

// ─── TableSource ──────────────────────────────────────────────────────────────
/// Any component that can produce a raw string table.
pub trait TableSource {
    fn load_table(&self) -> Result<RawTable>;
}

// ─── Classifier ───────────────────────────────────────────────────────────────
/// A trainable multi-class classifier over a dense feature matrix.
///
/// Labels are zero-based class indices in `0..n_classes`.
/// `predict` must fail (not panic) when called before `fit` or
/// with a different number of feature columns than `fit` saw.
pub trait Classifier {
    /// Short human-readable name used in logs and reports
    fn name(&self) -> String;

    fn fit(&mut self, features: &Array2<f64>, labels: &[usize], n_classes: usize) -> Result<()>;

    fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>>;
}
