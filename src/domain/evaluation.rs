// ============================================================
// Layer 3: Evaluation
// ============================================================
// Turns (true labels, predicted labels) into:
//   - overall accuracy
//   - per-class precision / recall / F1 / support
//   - macro average (over classes that occur in either label
//     list) and support-weighted average
//   - a confusion matrix (rows = true class, cols = predicted)
//
// A metric whose denominator is zero is reported as 0.0.
//
// The Display impl renders the familiar text report:
//
//                 precision    recall  f1-score   support
//
//              1       0.90      1.00      0.95         9
//              2       1.00      0.89      0.94         9
//
//       accuracy                           0.94        18
//      macro avg       0.95      0.94      0.94        18
//   weighted avg       0.95      0.94      0.94        18

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub class:     String,
    pub precision: f64,
    pub recall:    f64,
    pub f1:        f64,
    pub support:   usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall:    f64,
    pub f1:        f64,
    pub support:   usize,
}

/// `counts[t][p]` is the number of rows whose true class is `t`
/// and predicted class is `p`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub classes: Vec<String>,
    pub counts:  Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn from_labels(y_true: &[usize], y_pred: &[usize], classes: &[String]) -> Self {
        let k = classes.len();
        let mut counts = vec![vec![0usize; k]; k];
        for (&t, &p) in y_true.iter().zip(y_pred) {
            counts[t][p] += 1;
        }
        Self { classes: classes.to_vec(), counts }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|row| row.iter().sum::<usize>()).sum()
    }

    pub fn correct(&self) -> usize {
        (0..self.counts.len()).map(|i| self.counts[i][i]).sum()
    }

    /// Rows whose true class is `class`
    fn row_sum(&self, class: usize) -> usize {
        self.counts[class].iter().sum()
    }

    /// Rows predicted as `class`
    fn col_sum(&self, class: usize) -> usize {
        self.counts.iter().map(|row| row[class]).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub accuracy:     f64,
    pub per_class:    Vec<ClassMetrics>,
    pub macro_avg:    AverageMetrics,
    pub weighted_avg: AverageMetrics,
    pub confusion:    ConfusionMatrix,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

fn harmonic(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Compare predictions against ground truth for a fixed class list.
pub fn evaluate(y_true: &[usize], y_pred: &[usize], classes: &[String]) -> Result<ClassificationReport> {
    ensure!(
        y_true.len() == y_pred.len(),
        "label length mismatch: {} true vs {} predicted",
        y_true.len(),
        y_pred.len()
    );
    ensure!(!classes.is_empty(), "cannot evaluate against an empty class list");
    let k = classes.len();
    ensure!(
        y_true.iter().chain(y_pred).all(|&l| l < k),
        "label index out of range for {} classes",
        k
    );

    let confusion = ConfusionMatrix::from_labels(y_true, y_pred, classes);
    let total     = confusion.total();

    let per_class: Vec<ClassMetrics> = (0..k)
        .map(|c| {
            let tp        = confusion.counts[c][c];
            let support   = confusion.row_sum(c);
            let precision = ratio(tp, confusion.col_sum(c));
            let recall    = ratio(tp, support);
            ClassMetrics {
                class: classes[c].clone(),
                precision,
                recall,
                f1: harmonic(precision, recall),
                support,
            }
        })
        .collect();

    // Macro average covers only classes seen in y_true or y_pred
    let present: Vec<&ClassMetrics> = per_class
        .iter()
        .enumerate()
        .filter(|&(c, m)| m.support > 0 || confusion.col_sum(c) > 0)
        .map(|(_, m)| m)
        .collect();
    let mean = |f: fn(&ClassMetrics) -> f64| -> f64 {
        if present.is_empty() {
            return 0.0;
        }
        present.iter().map(|&m| f(m)).sum::<f64>() / present.len() as f64
    };
    let macro_avg = AverageMetrics {
        precision: mean(|m| m.precision),
        recall:    mean(|m| m.recall),
        f1:        mean(|m| m.f1),
        support:   total,
    };

    let weighted = |f: fn(&ClassMetrics) -> f64| -> f64 {
        if total == 0 {
            return 0.0;
        }
        per_class.iter().map(|m| f(m) * m.support as f64).sum::<f64>() / total as f64
    };
    let weighted_avg = AverageMetrics {
        precision: weighted(|m| m.precision),
        recall:    weighted(|m| m.recall),
        f1:        weighted(|m| m.f1),
        support:   total,
    };

    Ok(ClassificationReport {
        accuracy: ratio(confusion.correct(), total),
        per_class,
        macro_avg,
        weighted_avg,
        confusion,
    })
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let w = self
            .per_class
            .iter()
            .map(|m| m.class.len())
            .max()
            .unwrap_or(0)
            .max("weighted avg".len());

        writeln!(f, "{:>w$} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1-score", "support")?;
        writeln!(f)?;
        for m in &self.per_class {
            writeln!(
                f,
                "{:>w$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                m.class, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>w$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>w$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, avg.precision, avg.recall, avg.f1, avg.support
            )?;
        }
        writeln!(f)?;
        write!(f, "{}", self.confusion)
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = self
            .classes
            .iter()
            .map(|c| c.len())
            .chain(self.counts.iter().flatten().map(|n| n.to_string().len()))
            .max()
            .unwrap_or(1)
            .max(4);
        let label_w = self.classes.iter().map(|c| c.len()).max().unwrap_or(0).max("true\\pred".len());

        write!(f, "{:>label_w$}", "true\\pred")?;
        for c in &self.classes {
            write!(f, " {:>cell$}", c)?;
        }
        writeln!(f)?;
        for (c, row) in self.classes.iter().zip(&self.counts) {
            write!(f, "{:>label_w$}", c)?;
            for n in row {
                write!(f, " {:>cell$}", n)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes(n: usize) -> Vec<String> {
        (1..=n).map(|i| i.to_string()).collect()
    }

    #[test]
    fn test_perfect_predictions() {
        let y = vec![0, 1, 2, 0, 1, 2];
        let r = evaluate(&y, &y, &classes(3)).unwrap();
        assert_eq!(r.accuracy, 1.0);
        assert!(r.per_class.iter().all(|m| m.f1 == 1.0));
        assert_eq!(r.confusion.correct(), 6);
    }

    #[test]
    fn test_known_binary_case() {
        // true:  0 0 0 1 1
        // pred:  0 0 1 1 0
        let y_true = vec![0, 0, 0, 1, 1];
        let y_pred = vec![0, 0, 1, 1, 0];
        let r = evaluate(&y_true, &y_pred, &classes(2)).unwrap();

        assert!((r.accuracy - 0.6).abs() < 1e-12);
        let c0 = &r.per_class[0];
        assert!((c0.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((c0.recall - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(c0.support, 3);
        let c1 = &r.per_class[1];
        assert!((c1.precision - 0.5).abs() < 1e-12);
        assert!((c1.recall - 0.5).abs() < 1e-12);
        assert_eq!(r.confusion.counts, vec![vec![2, 1], vec![1, 1]]);

        // weighted avg of recall equals accuracy
        assert!((r.weighted_avg.recall - r.accuracy).abs() < 1e-12);
    }

    #[test]
    fn test_class_never_predicted_scores_zero() {
        let y_true = vec![0, 1, 2];
        let y_pred = vec![0, 0, 0];
        let r = evaluate(&y_true, &y_pred, &classes(3)).unwrap();
        assert_eq!(r.per_class[1].precision, 0.0);
        assert_eq!(r.per_class[1].f1, 0.0);
        assert_eq!(r.per_class[2].recall, 0.0);
    }

    #[test]
    fn test_macro_average_skips_absent_classes() {
        // class "2" never occurs in truth or predictions
        let y = vec![0, 2, 0, 2];
        let r = evaluate(&y, &y, &classes(3)).unwrap();
        assert_eq!(r.macro_avg.f1, 1.0);
        assert_eq!(r.macro_avg.precision, 1.0);
        assert_eq!(r.per_class.len(), 3);
        assert_eq!(r.per_class[1].support, 0);
    }

    #[test]
    fn test_macro_average_keeps_predicted_only_class() {
        // class 1 is predicted but has no support: it still counts
        let r = evaluate(&[0, 0], &[0, 1], &classes(3)).unwrap();
        assert!((r.macro_avg.recall - 0.25).abs() < 1e-12);
        assert!((r.macro_avg.precision - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_length_mismatch() {
        assert!(evaluate(&[0, 1], &[0], &classes(2)).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_label() {
        assert!(evaluate(&[0, 5], &[0, 1], &classes(2)).is_err());
    }

    #[test]
    fn test_report_text_lists_every_class() {
        let y_true = vec![0, 1, 2, 3];
        let y_pred = vec![0, 1, 2, 2];
        let r    = evaluate(&y_true, &y_pred, &classes(4)).unwrap();
        let text = r.to_string();
        assert!(text.contains("precision"));
        assert!(text.contains("weighted avg"));
        assert!(text.contains("accuracy"));
        for line in ["1", "2", "3", "4"] {
            assert!(text.lines().any(|l| l.trim_start().starts_with(line)));
        }
    }
}
