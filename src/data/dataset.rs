use anyhow::{ensure, Result};
use burn::data::dataset::Dataset;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// One scaled feature row with its class index, in the f32
/// layout the network consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowSample {
    pub features: Vec<f32>,
    pub label:    usize,
}

pub struct RowDataset {
    samples: Vec<RowSample>,
}

impl RowDataset {
    pub fn from_matrix(features: &Array2<f64>, labels: &[usize]) -> Result<Self> {
        ensure!(
            features.nrows() == labels.len(),
            "{} feature rows but {} labels",
            features.nrows(),
            labels.len()
        );
        let samples = features
            .rows()
            .into_iter()
            .zip(labels)
            .map(|(row, &label)| RowSample {
                features: row.iter().map(|&v| v as f32).collect(),
                label,
            })
            .collect();
        Ok(Self { samples })
    }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl Dataset<RowSample> for RowDataset {
    fn get(&self, index: usize) -> Option<RowSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_from_matrix_keeps_row_order() {
        let ds = RowDataset::from_matrix(&array![[1.0, 2.0], [3.0, 4.0]], &[1, 0]).unwrap();
        assert_eq!(ds.len(), 2);
        let second = ds.get(1).unwrap();
        assert_eq!(second.features, vec![3.0f32, 4.0]);
        assert_eq!(second.label, 0);
        assert!(ds.get(2).is_none());
    }

    #[test]
    fn test_length_mismatch_is_error() {
        assert!(RowDataset::from_matrix(&array![[1.0]], &[0, 1]).is_err());
    }
}
