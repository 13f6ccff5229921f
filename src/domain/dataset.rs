// ============================================================
// Layer 3: Dataset Domain Types
// ============================================================
// RawTable : the CSV exactly as read, every cell a string
// Dataset  : numeric features + zero-based class indices
// Split    : disjoint train/test row indices into a Dataset
//
// Reference: Rust Book §5 (Structs and Methods)
//            ndarray documentation (Array2, Axis)

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

/// A table of string cells with a header row.
/// Rows may be ragged; the preprocessor decides what to keep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows:    Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Position of a column by exact header name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// A fully numeric dataset ready for splitting and scaling.
///
/// Invariants (upheld by the data layer):
///   - `features` has one row per entry in `labels`
///   - every label is `< classes.len()`
///   - every feature value is finite
#[derive(Debug, Clone)]
pub struct Dataset {
    pub feature_names: Vec<String>,
    pub features:      Array2<f64>,
    pub labels:        Vec<usize>,
    pub classes:       Vec<String>,
}

impl Dataset {
    pub fn n_rows(&self) -> usize {
        self.labels.len()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Number of rows per class index
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes()];
        for &label in &self.labels {
            counts[label] += 1;
        }
        counts
    }

    /// Copy the given rows (in the given order) into a new Dataset
    /// that shares the same schema and class list.
    pub fn select(&self, rows: &[usize]) -> Dataset {
        Dataset {
            feature_names: self.feature_names.clone(),
            features:      self.features.select(Axis(0), rows),
            labels:        rows.iter().map(|&r| self.labels[r]).collect(),
            classes:       self.classes.clone(),
        }
    }
}

/// Row indices of a train/test partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub train: Vec<usize>,
    pub test:  Vec<usize>,
}

impl Split {
    /// True when no row index appears in both halves
    pub fn is_disjoint(&self) -> bool {
        let train: std::collections::HashSet<usize> = self.train.iter().copied().collect();
        self.test.iter().all(|i| !train.contains(i))
    }

    pub fn total(&self) -> usize {
        self.train.len() + self.test.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn tiny() -> Dataset {
        Dataset {
            feature_names: vec!["a".into(), "b".into()],
            features:      array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]],
            labels:        vec![0, 1, 1],
            classes:       vec!["x".into(), "y".into()],
        }
    }

    #[test]
    fn test_select_keeps_rows_aligned() {
        let ds  = tiny();
        let sub = ds.select(&[2, 0]);
        assert_eq!(sub.labels, vec![1, 0]);
        assert_eq!(sub.features, array![[5.0, 6.0], [1.0, 2.0]]);
        assert_eq!(sub.classes, ds.classes);
    }

    #[test]
    fn test_class_counts() {
        assert_eq!(tiny().class_counts(), vec![1, 2]);
    }

    #[test]
    fn test_split_disjoint() {
        let ok  = Split { train: vec![0, 2], test: vec![1] };
        let bad = Split { train: vec![0, 1], test: vec![1] };
        assert!(ok.is_disjoint());
        assert!(!bad.is_disjoint());
        assert_eq!(ok.total(), 3);
    }

    #[test]
    fn test_column_index() {
        let t = RawTable::new(vec!["id".into(), "class".into()], vec![]);
        assert_eq!(t.column_index("class"), Some(1));
        assert_eq!(t.column_index("missing"), None);
    }
}
