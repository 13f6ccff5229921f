// ============================================================
// Layer 4: Numeric Preprocessor
// ============================================================
// Converts a RawTable into a numeric feature matrix plus the
// raw label strings.
//
// Cleaning steps (applied in order):
//   1. Locate the label column (error if absent)
//   2. Remove the configured drop column (warn if absent)
//   3. Every remaining column becomes a feature
//   4. For each row: coerce every feature cell to f64
//   5. Drop the row if its width is wrong, any feature cell is
//      empty / non-numeric / non-finite, or the label is empty
//
// Dropped rows are counted, not reported individually.
//
// Reference: Rust Book §8 (Strings), §13 (Iterators)

use anyhow::{bail, Result};
use ndarray::Array2;

use crate::domain::dataset::RawTable;

/// Output of the preprocessor, before label encoding.
#[derive(Debug, Clone)]
pub struct NumericTable {
    pub feature_names: Vec<String>,
    pub features:      Array2<f64>,
    pub raw_labels:    Vec<String>,
    pub dropped_rows:  usize,
}

pub struct Preprocessor {
    label_column: String,
    drop_columns: Vec<String>,
}

impl Preprocessor {
    pub fn new(label_column: impl Into<String>) -> Self {
        Self { label_column: label_column.into(), drop_columns: Vec::new() }
    }

    /// Columns that are neither features nor the label (e.g. a row id)
    pub fn dropping(mut self, column: impl Into<String>) -> Self {
        self.drop_columns.push(column.into());
        self
    }

    pub fn process(&self, table: &RawTable) -> Result<NumericTable> {
        // ── Step 1: label column ──────────────────────────────────────────────
        let Some(label_idx) = table.column_index(&self.label_column) else {
            bail!(
                "label column '{}' not found (columns: {})",
                self.label_column,
                table.headers.join(", ")
            );
        };

        // ── Step 2: drop columns ──────────────────────────────────────────────
        let mut skip = vec![label_idx];
        for col in &self.drop_columns {
            match table.column_index(col) {
                Some(i) => skip.push(i),
                None => tracing::warn!("Drop column '{}' not present; nothing removed", col),
            }
        }

        // ── Step 3: feature columns ───────────────────────────────────────────
        let feature_idx: Vec<usize> = (0..table.headers.len())
            .filter(|i| !skip.contains(i))
            .collect();
        if feature_idx.is_empty() {
            bail!("no feature columns left after removing label and drop columns");
        }
        let feature_names: Vec<String> = feature_idx
            .iter()
            .map(|&i| table.headers[i].clone())
            .collect();

        // ── Steps 4-5: coerce and filter rows ─────────────────────────────────
        let width        = table.headers.len();
        let mut values   = Vec::with_capacity(table.row_count() * feature_idx.len());
        let mut labels   = Vec::with_capacity(table.row_count());
        let mut dropped  = 0usize;

        for row in &table.rows {
            if row.len() != width {
                dropped += 1;
                continue;
            }
            let label = row[label_idx].as_str();
            let parsed: Option<Vec<f64>> = feature_idx
                .iter()
                .map(|&i| parse_numeric(&row[i]))
                .collect();
            match parsed {
                Some(feats) if !label.is_empty() => {
                    values.extend(feats);
                    labels.push(label.to_string());
                }
                _ => dropped += 1,
            }
        }

        if dropped > 0 {
            tracing::warn!(
                "Dropped {} of {} rows with missing or non-numeric values",
                dropped,
                table.row_count()
            );
        }

        let features = Array2::from_shape_vec((labels.len(), feature_idx.len()), values)?;

        Ok(NumericTable {
            feature_names,
            features,
            raw_labels: labels,
            dropped_rows: dropped,
        })
    }
}

/// Parse a cell as a finite float. Empty, "NaN", "inf" and text
/// all count as unparseable.
pub fn parse_numeric(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            vec!["id".into(), "f1".into(), "f2".into(), "class".into()],
            rows.iter().map(|r| r.iter().map(|s| s.to_string()).collect()).collect(),
        )
    }

    #[test]
    fn test_drops_id_and_splits_label() {
        let t   = table(&[&["1", "0.5", "2", "A"], &["2", "1.5", "-3e1", "B"]]);
        let out = Preprocessor::new("class").dropping("id").process(&t).unwrap();
        assert_eq!(out.feature_names, vec!["f1", "f2"]);
        assert_eq!(out.raw_labels, vec!["A", "B"]);
        assert_eq!(out.features[[1, 1]], -30.0);
        assert_eq!(out.dropped_rows, 0);
    }

    #[test]
    fn test_drops_unparseable_rows() {
        let t = table(&[
            &["1", "0.5", "2", "A"],
            &["2", "abc", "2", "A"],
            &["3", "", "2", "A"],
            &["4", "NaN", "2", "A"],
            &["5", "1", "2", ""],
            &["6", "1"],
        ]);
        let out = Preprocessor::new("class").dropping("id").process(&t).unwrap();
        assert_eq!(out.features.nrows(), 1);
        assert_eq!(out.dropped_rows, 5);
    }

    #[test]
    fn test_every_retained_value_is_finite() {
        let t = table(&[&["1", "inf", "2", "A"], &["2", "3", "4", "B"]]);
        let out = Preprocessor::new("class").dropping("id").process(&t).unwrap();
        assert!(out.features.iter().all(|v| v.is_finite()));
        assert_eq!(out.raw_labels.len(), out.features.nrows());
    }

    #[test]
    fn test_missing_label_column_is_error() {
        let t = table(&[&["1", "2", "3", "A"]]);
        assert!(Preprocessor::new("target").process(&t).is_err());
    }

    #[test]
    fn test_missing_drop_column_is_tolerated() {
        let t   = table(&[&["1", "2", "3", "A"]]);
        let out = Preprocessor::new("class").dropping("sequence").process(&t).unwrap();
        // id stays as a feature since it was not dropped
        assert_eq!(out.feature_names.len(), 3);
    }

    #[test]
    fn test_parse_numeric() {
        assert_eq!(parse_numeric(" 2.5 "), Some(2.5));
        assert_eq!(parse_numeric("x"), None);
        assert_eq!(parse_numeric("-inf"), None);
    }
}
