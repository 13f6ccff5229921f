// ============================================================
// Layer 4: Label Encoder
// ============================================================
// Maps raw label strings to zero-based class indices.
//
//   Offset      : labels are integers; index = label - base.
//                 base defaults to the smallest label seen, so
//                 classes 1..=6 become 0..=5. The span
//                 base..=max may hold at most MAX_OFFSET_SPAN
//                 values.
//   Categorical : distinct label strings sorted ascending;
//                 index = position in that sorted list.
//   Auto        : Offset when every label is an integer and the
//                 span is at most twice the distinct count (or a
//                 base was given).
//                 Sparse integers (e.g. {1, 1000000}) are ranked
//                 in numeric order instead, one class per value
//                 seen. Categorical when any label is not an
//                 integer.
//
// The class list is kept so reports can print original names.

use anyhow::{anyhow, bail, ensure, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Largest number of classes an offset encoding may create
pub const MAX_OFFSET_SPAN: u64 = 10_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelEncoding {
    #[default]
    Auto,
    Offset,
    Categorical,
}

#[derive(Debug, Clone)]
enum Mapping {
    Offset { base: i64 },
    Ranked { index: BTreeMap<i64, usize> },
    Categorical { index: BTreeMap<String, usize> },
}

#[derive(Debug, Clone)]
pub struct LabelEncoder {
    mapping: Mapping,
    classes: Vec<String>,
}

/// Integer value of a label such as "3" or "3.0"
fn parse_integer_label(label: &str) -> Option<i64> {
    if let Ok(v) = label.parse::<i64>() {
        return Some(v);
    }
    label
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.fract() == 0.0)
        .filter(|v| *v >= i64::MIN as f64 && *v < i64::MAX as f64)
        .map(|v| v as i64)
}

/// Number of integers in lo..=hi, without overflow
fn span(lo: i64, hi: i64) -> u64 {
    (i128::from(hi) - i128::from(lo) + 1).clamp(0, i128::from(u64::MAX)) as u64
}

impl LabelEncoder {
    /// Learn the class list from the observed labels.
    /// `offset_base` only applies to offset encoding.
    pub fn fit(labels: &[String], encoding: LabelEncoding, offset_base: Option<i64>) -> Result<Self> {
        ensure!(!labels.is_empty(), "cannot fit a label encoder on zero labels");

        let integers: Option<BTreeSet<i64>> = labels.iter().map(|l| parse_integer_label(l)).collect();

        match (encoding, integers) {
            (LabelEncoding::Offset, None) => bail!("offset label encoding needs integer labels"),
            (LabelEncoding::Offset, Some(values)) => Self::fit_offset(&values, offset_base),
            (LabelEncoding::Auto, Some(values)) => {
                let (Some(&min), Some(&max)) = (values.first(), values.last()) else {
                    bail!("no integer labels to encode");
                };
                let dense = span(min, max) <= 2 * values.len() as u64;
                if dense || offset_base.is_some() {
                    Self::fit_offset(&values, offset_base)
                } else {
                    tracing::info!(
                        "Integer labels span {}..={} with only {} distinct values; ranking them",
                        min,
                        max,
                        values.len()
                    );
                    Ok(Self::fit_ranked(&values))
                }
            }
            (LabelEncoding::Categorical, _) | (LabelEncoding::Auto, None) => Ok(Self::fit_categorical(labels)),
        }
    }

    fn fit_offset(values: &BTreeSet<i64>, offset_base: Option<i64>) -> Result<Self> {
        let (Some(&min), Some(&max)) = (values.first(), values.last()) else {
            bail!("no integer labels to encode");
        };
        let base = offset_base.unwrap_or(min);
        ensure!(min >= base, "label {} is below the offset base {}", min, base);
        let width = span(base, max);
        ensure!(
            width <= MAX_OFFSET_SPAN,
            "offset encoding from {} to {} would create {} classes (limit {}); use categorical encoding",
            base,
            max,
            width,
            MAX_OFFSET_SPAN
        );

        let classes: Vec<String> = (base..=max).map(|v| v.to_string()).collect();
        let unseen = classes.len() - values.len();
        if unseen > 0 {
            tracing::warn!("{} class value(s) between {} and {} have no rows", unseen, base, max);
        }
        tracing::debug!("Offset label encoding: base={}, {} classes", base, classes.len());
        Ok(Self { mapping: Mapping::Offset { base }, classes })
    }

    fn fit_ranked(values: &BTreeSet<i64>) -> Self {
        let index: BTreeMap<i64, usize> = values.iter().enumerate().map(|(i, &v)| (v, i)).collect();
        let classes = values.iter().map(|v| v.to_string()).collect();
        tracing::debug!("Ranked integer label encoding: {} classes", index.len());
        Self { mapping: Mapping::Ranked { index }, classes }
    }

    fn fit_categorical(labels: &[String]) -> Self {
        let distinct: BTreeSet<&String> = labels.iter().collect();
        let index: BTreeMap<String, usize> =
            distinct.iter().enumerate().map(|(i, &l)| (l.clone(), i)).collect();
        let classes: Vec<String> = index.keys().cloned().collect();
        tracing::debug!("Categorical label encoding: {} classes", classes.len());
        Self { mapping: Mapping::Categorical { index }, classes }
    }

    /// Map labels to indices; unknown labels are an error.
    pub fn transform(&self, labels: &[String]) -> Result<Vec<usize>> {
        labels.iter().map(|l| self.encode(l)).collect()
    }

    pub fn encode(&self, label: &str) -> Result<usize> {
        match &self.mapping {
            Mapping::Offset { base } => {
                let Some(v) = parse_integer_label(label) else {
                    bail!("label '{}' is not an integer", label);
                };
                v.checked_sub(*base)
                    .and_then(|idx| usize::try_from(idx).ok())
                    .filter(|&idx| idx < self.classes.len())
                    .ok_or_else(|| anyhow!("label '{}' is outside the fitted range", label))
            }
            Mapping::Ranked { index } => parse_integer_label(label)
                .and_then(|v| index.get(&v).copied())
                .ok_or_else(|| anyhow!("unknown label '{}'", label)),
            Mapping::Categorical { index } => index
                .get(label)
                .copied()
                .ok_or_else(|| anyhow!("unknown label '{}'", label)),
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_auto_uses_offset_for_integers() {
        let raw = labels(&["1", "3", "2", "6", "4", "5"]);
        let enc = LabelEncoder::fit(&raw, LabelEncoding::Auto, None).unwrap();
        assert_eq!(enc.transform(&raw).unwrap(), vec![0, 2, 1, 5, 3, 4]);
        assert_eq!(enc.classes(), &["1", "2", "3", "4", "5", "6"]);
    }

    #[test]
    fn test_offset_accepts_float_formatted_integers() {
        let raw = labels(&["1.0", "2.0"]);
        let enc = LabelEncoder::fit(&raw, LabelEncoding::Offset, None).unwrap();
        assert_eq!(enc.transform(&raw).unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_explicit_offset_base() {
        let raw = labels(&["1", "2"]);
        let enc = LabelEncoder::fit(&raw, LabelEncoding::Offset, Some(0)).unwrap();
        assert_eq!(enc.transform(&raw).unwrap(), vec![1, 2]);
        assert_eq!(enc.n_classes(), 3);
        assert!(LabelEncoder::fit(&raw, LabelEncoding::Offset, Some(2)).is_err());
    }

    #[test]
    fn test_auto_uses_categorical_for_text() {
        let raw = labels(&["IgG", "IgA", "IgM", "IgA"]);
        let enc = LabelEncoder::fit(&raw, LabelEncoding::Auto, None).unwrap();
        assert_eq!(enc.classes(), &["IgA", "IgG", "IgM"]);
        assert_eq!(enc.transform(&raw).unwrap(), vec![1, 0, 2, 0]);
        assert_eq!(enc.classes()[2], "IgM");
    }

    #[test]
    fn test_offset_rejects_text_labels() {
        let raw = labels(&["a", "b"]);
        assert!(LabelEncoder::fit(&raw, LabelEncoding::Offset, None).is_err());
    }

    #[test]
    fn test_unknown_label_is_error() {
        let enc = LabelEncoder::fit(&labels(&["x", "y"]), LabelEncoding::Categorical, None).unwrap();
        assert!(enc.encode("z").is_err());
    }

    #[test]
    fn test_every_index_is_in_range() {
        let raw = labels(&["10", "12", "11", "12"]);
        let enc = LabelEncoder::fit(&raw, LabelEncoding::Auto, None).unwrap();
        let idx = enc.transform(&raw).unwrap();
        assert!(idx.iter().all(|&i| i < enc.n_classes()));
    }

    #[test]
    fn test_auto_ranks_sparse_integers() {
        let raw = labels(&["1", "1000000", "1", "1000000"]);
        let enc = LabelEncoder::fit(&raw, LabelEncoding::Auto, None).unwrap();
        assert_eq!(enc.n_classes(), 2);
        assert_eq!(enc.classes(), &["1", "1000000"]);
        assert_eq!(enc.transform(&raw).unwrap(), vec![0, 1, 0, 1]);
    }

    #[test]
    fn test_auto_ranks_in_numeric_order() {
        let raw = labels(&["100", "2", "30"]);
        let enc = LabelEncoder::fit(&raw, LabelEncoding::Auto, None).unwrap();
        assert_eq!(enc.classes(), &["2", "30", "100"]);
        assert_eq!(enc.encode("30.0").unwrap(), 1);
        assert!(enc.encode("31").is_err());
    }

    #[test]
    fn test_extreme_integer_labels_do_not_panic() {
        let raw = labels(&["-9223372036854775808", "9223372036854775807"]);
        let enc = LabelEncoder::fit(&raw, LabelEncoding::Auto, None).unwrap();
        assert_eq!(enc.transform(&raw).unwrap(), vec![0, 1]);
        assert!(LabelEncoder::fit(&raw, LabelEncoding::Offset, None).is_err());
    }

    #[test]
    fn test_explicit_offset_rejects_huge_span() {
        let raw = labels(&["1", "1000000"]);
        assert!(LabelEncoder::fit(&raw, LabelEncoding::Offset, None).is_err());
    }

    #[test]
    fn test_offset_encode_out_of_range_is_error() {
        let enc = LabelEncoder::fit(&labels(&["1", "2"]), LabelEncoding::Offset, None).unwrap();
        assert!(enc.encode("-9223372036854775808").is_err());
        assert!(enc.encode("3").is_err());
    }

    #[test]
    fn test_auto_keeps_offset_for_small_gaps() {
        // 1..=6 with class 4 missing is still dense enough
        let raw = labels(&["1", "2", "3", "5", "6"]);
        let enc = LabelEncoder::fit(&raw, LabelEncoding::Auto, None).unwrap();
        assert_eq!(enc.n_classes(), 6);
        assert_eq!(enc.encode("6").unwrap(), 5);
    }
}
