// ============================================================
// Layer 4: Train/Test Splitter
// ============================================================
// Partitions row indices into a training set and a held-out
// test set.
//
//   test size  = ceil(test_fraction * n_rows)
//   train size = n_rows - test size
//
// Plain mode shuffles all rows once and cuts.
// Stratified mode shuffles each class separately and takes a
// proportional slice of every class for the test set; any
// rows left after flooring the per-class quotas go to the
// classes with the largest fractional remainder, so the total
// test size is the same as in plain mode.
//
// Both modes draw from a StdRng seeded by the caller, so the
// same seed always produces the same split.
//
// Reference: rand crate documentation (SeedableRng, SliceRandom)

use anyhow::{ensure, Result};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::domain::dataset::Split;

/// Number of test rows for a given fraction; never 0 or n_rows
/// when at least two rows exist.
pub fn test_size(n_rows: usize, test_fraction: f64) -> usize {
    // small epsilon so 0.3 * 10 = 3.0000000000000004 stays 3
    let raw = ((test_fraction * n_rows as f64) - 1e-9).ceil().max(0.0) as usize;
    raw.clamp(1, n_rows.saturating_sub(1).max(1))
}

/// Split rows `0..labels.len()` into train/test index sets.
///
/// # Arguments
/// * `labels`        - class index per row (used when stratifying)
/// * `test_fraction` - proportion held out, e.g. 0.2 = 20%
/// * `seed`          - RNG seed
/// * `stratify`      - keep class proportions in both halves
pub fn train_test_split(
    labels:        &[usize],
    test_fraction: f64,
    seed:          u64,
    stratify:      bool,
) -> Result<Split> {
    ensure!(
        test_fraction > 0.0 && test_fraction < 1.0,
        "test fraction must be between 0 and 1 (exclusive), got {}",
        test_fraction
    );
    let n = labels.len();
    ensure!(n >= 2, "need at least 2 rows to split, got {}", n);

    let n_test  = test_size(n, test_fraction);
    let mut rng = StdRng::seed_from_u64(seed);

    let (mut train, mut test) = if stratify {
        stratified(labels, n_test, &mut rng)
    } else {
        let mut rows: Vec<usize> = (0..n).collect();
        rows.shuffle(&mut rng);
        let train = rows.split_off(n_test);
        (train, rows)
    };

    train.sort_unstable();
    test.sort_unstable();

    tracing::debug!(
        "Dataset split: {} training, {} test (stratified={})",
        train.len(),
        test.len(),
        stratify
    );

    Ok(Split { train, test })
}

fn stratified(labels: &[usize], n_test: usize, rng: &mut StdRng) -> (Vec<usize>, Vec<usize>) {
    let n_classes = labels.iter().copied().max().map_or(0, |m| m + 1);
    let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
    for (row, &label) in labels.iter().enumerate() {
        by_class[label].push(row);
    }

    if by_class.iter().any(|rows| rows.len() == 1) {
        tracing::warn!("At least one class has a single row; it can only land on one side of the split");
    }

    // Per-class quota: floor of the exact share, then hand out the
    // remainder by largest fractional part (ties → lower class index).
    let n = labels.len() as f64;
    let exact: Vec<f64> = by_class
        .iter()
        .map(|rows| rows.len() as f64 * n_test as f64 / n)
        .collect();
    let mut quota: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();
    let mut order: Vec<usize> = (0..n_classes).collect();
    order.sort_by(|&a, &b| {
        let fa = exact[a] - exact[a].floor();
        let fb = exact[b] - exact[b].floor();
        fb.total_cmp(&fa).then(a.cmp(&b))
    });
    let mut remaining = n_test.saturating_sub(quota.iter().sum());
    for &c in order.iter().cycle().take(n_classes * 2) {
        if remaining == 0 {
            break;
        }
        if quota[c] < by_class[c].len() {
            quota[c] += 1;
            remaining -= 1;
        }
    }

    let mut train = Vec::with_capacity(labels.len() - n_test);
    let mut test  = Vec::with_capacity(n_test);
    for (mut rows, q) in by_class.into_iter().zip(quota) {
        rows.shuffle(rng);
        let rest = rows.split_off(q);
        test.extend(rows);
        train.extend(rest);
    }
    (train, test)
}
