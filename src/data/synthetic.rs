// ============================================================
// Layer 4: Synthetic Dataset Generator
// ============================================================
// Produces a CSV with the same shape as the real antibody
// table:
//
//   id, f1, f2, ..., fN, class
//
// Classes are integers starting at 1 and assigned round-robin,
// so every class gets floor(rows / classes) or one more row.
// Each (class, feature) pair has its own centre drawn from
// [-3, 3]; a row's value is its class centre plus uniform noise
// in [-1, 1). A fixed seed always yields the same file.

use anyhow::{ensure, Context, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::dataset::RawTable;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticConfig {
    pub rows:     usize,
    pub features: usize,
    pub classes:  usize,
    pub seed:     u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self { rows: 100, features: 10, classes: 6, seed: 42 }
    }
}

pub const ID_COLUMN: &str    = "id";
pub const LABEL_COLUMN: &str = "class";

pub fn generate(cfg: &SyntheticConfig) -> Result<RawTable> {
    ensure!(cfg.classes >= 2, "need at least 2 classes, got {}", cfg.classes);
    ensure!(cfg.features >= 1, "need at least 1 feature");
    ensure!(cfg.rows >= cfg.classes, "need at least one row per class");

    let mut rng = StdRng::seed_from_u64(cfg.seed);

    let centres: Vec<Vec<f64>> = (0..cfg.classes)
        .map(|_| (0..cfg.features).map(|_| rng.gen_range(-3.0..3.0)).collect())
        .collect();

    let mut headers = vec![ID_COLUMN.to_string()];
    headers.extend((1..=cfg.features).map(|j| format!("f{j}")));
    headers.push(LABEL_COLUMN.to_string());

    let rows = (0..cfg.rows)
        .map(|i| {
            let class = i % cfg.classes;
            let mut row = Vec::with_capacity(cfg.features + 2);
            row.push((i + 1).to_string());
            for centre in &centres[class] {
                let noise: f64 = rng.gen_range(-1.0..1.0);
                row.push(format!("{:.6}", centre + noise));
            }
            row.push((class + 1).to_string());
            row
        })
        .collect();

    Ok(RawTable::new(headers, rows))
}

/// Write a RawTable as CSV, header first.
pub fn write_csv(table: &RawTable, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create directory '{}'", parent.display()))?;
    }
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Cannot create CSV file '{}'", path.display()))?;
    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    tracing::info!("Wrote {} rows to '{}'", table.row_count(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::CsvLoader;
    use crate::domain::traits::TableSource;

    #[test]
    fn test_shape_and_balance() {
        let t = generate(&SyntheticConfig::default()).unwrap();
        assert_eq!(t.headers.len(), 12);
        assert_eq!(t.row_count(), 100);
        let label_idx = t.column_index(LABEL_COLUMN).unwrap();
        for class in 1..=6 {
            let n = t.rows.iter().filter(|r| r[label_idx] == class.to_string()).count();
            assert!(n == 16 || n == 17, "class {class} has {n} rows");
        }
    }

    #[test]
    fn test_seeded_output_is_reproducible() {
        let cfg = SyntheticConfig { seed: 7, ..Default::default() };
        assert_eq!(generate(&cfg).unwrap(), generate(&cfg).unwrap());
    }

    #[test]
    fn test_write_then_load() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("synth.csv");
        let t    = generate(&SyntheticConfig { rows: 12, features: 3, classes: 3, seed: 1 }).unwrap();
        write_csv(&t, &path).unwrap();
        let back = CsvLoader::new(&path).load_table().unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_rejects_degenerate_configs() {
        assert!(generate(&SyntheticConfig { classes: 1, ..Default::default() }).is_err());
        assert!(generate(&SyntheticConfig { rows: 3, ..Default::default() }).is_err());
    }
}
