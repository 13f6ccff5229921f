// ============================================================
// Layer 6: Metrics Logger
// ============================================================
// Records attention-network training metrics to a CSV file
// after each epoch.
//
// Metrics recorded per epoch:
//   - epoch:      the epoch number (1, 2, 3, ...)
//   - train_loss: average cross-entropy over training batches
//   - val_loss:   average cross-entropy on the held-out rows
//   - train_acc:  fraction of training rows classified correctly
//   - val_acc:    fraction of held-out rows classified correctly
//
// Output file: <report_dir>/metrics.csv
//
//   epoch,train_loss,val_loss,train_acc,val_acc
//   1,1.791200,1.772300,0.187500,0.200000
//   2,1.650100,1.601800,0.312500,0.350000
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

const HEADER: &str = "epoch,train_loss,val_loss,train_acc,val_acc";

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Average cross-entropy loss over all training batches
    pub train_loss: f64,

    /// Average cross-entropy loss on the validation rows
    /// (NaN when no validation rows were supplied)
    pub val_loss: f64,

    /// Fraction of training rows predicted correctly, in [0, 1]
    pub train_acc: f64,

    /// Fraction of validation rows predicted correctly, in [0, 1]
    pub val_acc: f64,
}

impl EpochMetrics {
    pub fn new(
        epoch:      usize,
        train_loss: f64,
        val_loss:   f64,
        train_acc:  f64,
        val_acc:    f64,
    ) -> Self {
        Self { epoch, train_loss, val_loss, train_acc, val_acc }
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    /// Full path to the CSV file
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger writing `metrics.csv` into `dir`.
    /// Any previous file is replaced, so one file holds one run.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create metrics directory '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        let mut f = fs::File::create(&csv_path)
            .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
        writeln!(f, "{HEADER}")?;
        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot append to '{}'", self.csv_path.display()))?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6},{:.6}",
            m.epoch,
            m.train_loss,
            m.val_loss,
            m.train_acc,
            m.val_acc,
        )?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_loss={:.4}",
            m.epoch,
            m.train_loss,
            m.val_loss,
        );

        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_header_and_rows() {
        let dir    = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(&EpochMetrics::new(1, 1.5, 1.25, 0.5, 0.25)).unwrap();
        logger.log(&EpochMetrics::new(2, 1.0, 1.0, 0.75, 0.5)).unwrap();

        let text  = fs::read_to_string(&logger.csv_path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines[1], "1,1.500000,1.250000,0.500000,0.250000");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_new_logger_starts_fresh_file() {
        let dir = tempfile::tempdir().unwrap();
        MetricsLogger::new(dir.path()).unwrap()
            .log(&EpochMetrics::new(1, 1.0, 1.0, 0.0, 0.0)).unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();
        let text   = fs::read_to_string(&logger.csv_path).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
