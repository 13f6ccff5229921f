// ============================================================
// Layer 6: Report Store
// ============================================================
// Persists the outputs of one pipeline run as JSON.
//
// Files written to the report directory:
//   run_config.json    ← effective PipelineConfig (replay with --config)
//   train_report.json  ← ClassificationReport on the training rows
//   test_report.json   ← ClassificationReport on the held-out rows
//   metrics.csv        ← per-epoch log (attention network only,
//                        written by MetricsLogger)

use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::pipeline::PipelineConfig;
use crate::domain::evaluation::ClassificationReport;

pub const CONFIG_FILE: &str = "run_config.json";

pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    /// Create the store, creating the directory (and parents) if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create report directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save_config(&self, cfg: &PipelineConfig) -> Result<PathBuf> {
        self.write_json(CONFIG_FILE, cfg)
    }

    /// Save a report as `<name>_report.json`
    pub fn save_report(&self, name: &str, report: &ClassificationReport) -> Result<PathBuf> {
        self.write_json(&format!("{name}_report.json"), report)
    }

    fn write_json<T: Serialize>(&self, file: &str, value: &T) -> Result<PathBuf> {
        let path = self.dir.join(file);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        tracing::debug!("Saved '{}'", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::evaluation::evaluate;

    #[test]
    fn test_saves_config_and_reports() {
        let dir   = tempfile::tempdir().unwrap();
        let store = ReportStore::new(dir.path().join("out")).unwrap();

        let cfg  = PipelineConfig::default();
        let path = store.save_config(&cfg).unwrap();
        assert_eq!(PipelineConfig::from_json_file(&path).unwrap(), cfg);

        let classes = vec!["a".to_string(), "b".to_string()];
        let report  = evaluate(&[0, 1], &[0, 0], &classes).unwrap();
        let path    = store.save_report("test", &report).unwrap();
        assert!(path.ends_with("test_report.json"));
        let back: ClassificationReport =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(back, report);
    }
}
