// ============================================================
// Layer 4: Row Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<RowSample>
// into tensors.
//
//   Input:  N RowSamples, each with F features
//   Output: RowBatch { features: [N, F], targets: [N] }
//
// Features are flattened row-major then reshaped:
//   [r1_f1, ..., r1_fF, r2_f1, ..., rN_fF] → [N, F]
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::RowSample;

// ─── RowBatch ─────────────────────────────────────────────────────────────────
/// A batch of feature rows ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct RowBatch<B: Backend> {
    /// Scaled features, shape: [batch_size, n_features]
    pub features: Tensor<B, 2>,

    /// Class indices, shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

// ─── RowBatcher ───────────────────────────────────────────────────────────────
/// Holds the target device so tensors are created in the right place.
#[derive(Clone, Debug)]
pub struct RowBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> RowBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<RowSample, RowBatch<B>> for RowBatcher<B> {
    fn batch(&self, items: Vec<RowSample>) -> RowBatch<B> {
        let batch_size = items.len();
        let n_features = items.first().map_or(0, |s| s.features.len());

        let flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.features.iter().copied())
            .collect();

        let targets: Vec<i32> = items
            .iter()
            .map(|s| s.label as i32)
            .collect();

        let features = Tensor::<B, 1>::from_floats(flat.as_slice(), &self.device)
            .reshape([batch_size, n_features]);

        let targets = Tensor::<B, 1, Int>::from_ints(targets.as_slice(), &self.device);

        RowBatch { features, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shapes() {
        let batcher = RowBatcher::<NdArray>::new(Default::default());
        let items = vec![
            RowSample { features: vec![1.0, 2.0, 3.0], label: 2 },
            RowSample { features: vec![4.0, 5.0, 6.0], label: 0 },
        ];
        let batch = batcher.batch(items);
        assert_eq!(batch.features.dims(), [2, 3]);
        assert_eq!(batch.targets.dims(), [2]);

        let targets: Vec<i64> = batch.targets.into_data().iter::<i64>().collect();
        assert_eq!(targets, vec![2, 0]);
    }
}
