// ============================================================
// Layer 4: Standard Scaler
// ============================================================
// z = (x - mean) / std, per feature column.
//
// Statistics come from the training partition only. Once
// built, a StandardScaler has no way to refit: `fit` is the
// only constructor and `transform` takes `&self`, so the test
// partition is always transformed with training statistics.
//
// std is the population standard deviation (ddof = 0). A
// constant column gets scale 1.0 so it maps to all zeros
// instead of dividing by zero. "Constant" is relative to the
// column: var <= n*eps*var + (n*mean*eps)^2, i.e. the spread
// is no larger than accumulated rounding error.

use anyhow::{ensure, Result};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean:  Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(features: &Array2<f64>) -> Result<Self> {
        ensure!(features.nrows() > 0, "cannot fit a scaler on zero rows");

        let mean = features
            .mean_axis(Axis(0))
            .map(|m| m.to_vec())
            .unwrap_or_default();
        let std = features.std_axis(Axis(0), 0.0);
        let n   = features.nrows() as f64;
        let is_constant = |s: f64, m: f64| {
            let var = s * s;
            var <= n * f64::EPSILON * var + (n * m * f64::EPSILON).powi(2)
        };

        let mut constant = 0;
        let scale: Vec<f64> = std
            .iter()
            .zip(&mean)
            .map(|(&s, &m)| {
                if is_constant(s, m) {
                    constant += 1;
                    1.0
                } else {
                    s
                }
            })
            .collect();

        tracing::debug!(
            "Scaler fitted on {} rows x {} features ({} constant)",
            features.nrows(),
            features.ncols(),
            constant
        );

        Ok(Self { mean, scale })
    }

    pub fn transform(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        ensure!(
            features.ncols() == self.mean.len(),
            "scaler was fitted on {} features but got {}",
            self.mean.len(),
            features.ncols()
        );
        let mut out = features.to_owned();
        for mut row in out.rows_mut() {
            for ((v, m), s) in row.iter_mut().zip(&self.mean).zip(&self.scale) {
                *v = (*v - m) / s;
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_training_data_becomes_standardized() {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0]];
        let s = StandardScaler::fit(&x).unwrap();
        let z = s.transform(&x).unwrap();

        let mean = z.mean_axis(Axis(0)).unwrap();
        let std  = z.std_axis(Axis(0), 0.0);
        for j in 0..2 {
            assert!(mean[j].abs() < 1e-12);
            assert!((std[j] - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_test_data_uses_training_statistics() {
        let train = array![[0.0], [2.0]];
        let test  = array![[4.0]];
        let s = StandardScaler::fit(&train).unwrap();
        // mean 1, std 1 → (4 - 1) / 1 = 3
        assert_eq!(s.transform(&test).unwrap()[[0, 0]], 3.0);
        assert_eq!(s.mean, vec![1.0]);
    }

    #[test]
    fn test_constant_column_maps_to_zero() {
        let x = array![[5.0, 1.0], [5.0, 2.0]];
        let s = StandardScaler::fit(&x).unwrap();
        let z = s.transform(&x).unwrap();
        assert_eq!(s.scale[0], 1.0);
        assert!(z.column(0).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_tiny_but_real_spread_is_scaled() {
        let x = array![[1e-17], [-1e-17]];
        let s = StandardScaler::fit(&x).unwrap();
        assert!(s.scale[0] < 1e-16);
        let z = s.transform(&x).unwrap();
        assert!((z[[0, 0]] - 1.0).abs() < 1e-9);
        assert!((z[[1, 0]] + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_large_constant_column_is_constant() {
        let x = array![[1e12, 0.0], [1e12, 1.0], [1e12, 2.0]];
        let s = StandardScaler::fit(&x).unwrap();
        assert_eq!(s.scale[0], 1.0);
        assert!(s.transform(&x).unwrap().column(0).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_feature_count_mismatch_is_error() {
        let s = StandardScaler::fit(&array![[1.0, 2.0]]).unwrap();
        assert!(s.transform(&array![[1.0]]).is_err());
    }

    #[test]
    fn test_empty_input_is_error() {
        let x = Array2::<f64>::zeros((0, 3));
        assert!(StandardScaler::fit(&x).is_err());
    }
}
