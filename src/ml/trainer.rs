// ============================================================
// Layer 5: Training Loop
// ============================================================
// Train + validation loop using Burn's DataLoader and AdamW.
//
//   - Training runs on TrainBackend (Autodiff<NdArray>)
//   - model.valid() returns the model on InferBackend (NdArray),
//     which also switches dropout off
//   - The validation batcher therefore uses InferBackend
//   - Weight decay in AdamW is the regularization strength
//
// Reference: Burn Book §5, Loshchilov & Hutter (2019) AdamW

use anyhow::{ensure, Result};
use burn::{
    backend::{ndarray::NdArrayDevice, Autodiff, NdArray},
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamWConfig, GradientsParams, Optimizer},
    prelude::*,
};
use std::sync::{Mutex, PoisonError};

use crate::data::{batcher::RowBatcher, dataset::RowDataset};
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::attention::AttentionConfig;
use crate::ml::model::{TabularAttentionConfig, TabularAttentionModel};

pub type TrainBackend = Autodiff<NdArray>;
pub type InferBackend = NdArray;

// The NdArray backend RNG is process-wide; one seeded run at a time.
static SEEDED_RUN: Mutex<()> = Mutex::new(());

pub struct TrainingRun<'a> {
    pub config:     &'a AttentionConfig,
    pub n_features: usize,
    pub n_classes:  usize,
    pub seed:       u64,
    pub logger:     Option<&'a MetricsLogger>,
}

/// Train a fresh model and return it on the inference backend,
/// together with one EpochMetrics per epoch.
pub fn run_training(
    run:           TrainingRun<'_>,
    train_dataset: RowDataset,
    val_dataset:   Option<RowDataset>,
) -> Result<(TabularAttentionModel<InferBackend>, Vec<EpochMetrics>)> {
    let cfg = run.config;
    ensure!(train_dataset.sample_count() > 0, "cannot train on an empty dataset");
    ensure!(cfg.batch_size > 0, "batch size must be positive");
    ensure!(cfg.epochs > 0, "epoch count must be positive");
    ensure!(
        cfg.d_model > 0 && cfg.num_heads > 0,
        "d_model ({}) and num_heads ({}) must be positive",
        cfg.d_model,
        cfg.num_heads
    );
    ensure!(
        cfg.d_model % cfg.num_heads == 0,
        "d_model ({}) must be divisible by num_heads ({})",
        cfg.d_model,
        cfg.num_heads
    );

    let _guard = SEEDED_RUN.lock().unwrap_or_else(PoisonError::into_inner);
    let device = NdArrayDevice::default();
    TrainBackend::seed(run.seed);

    // ── Build model ───────────────────────────────────────────────────────────
    let model_cfg = TabularAttentionConfig::new(
        run.n_features, run.n_classes, cfg.d_model,
        cfg.num_heads, cfg.num_layers, cfg.d_ff, cfg.dropout,
    );
    let mut model: TabularAttentionModel<TrainBackend> = model_cfg.init(&device);
    tracing::info!(
        "Model ready: {} layers, d_model={}, heads={}",
        cfg.num_layers, cfg.d_model, cfg.num_heads
    );

    let mut optim = AdamWConfig::new()
        .with_weight_decay(cfg.weight_decay as f32)
        .init();

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_batcher = RowBatcher::<TrainBackend>::new(device.clone());
    let train_loader  = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(run.seed)
        .num_workers(1)
        .build(train_dataset);

    // ── Validation data loader (InnerBackend, no autodiff overhead) ───────────
    let val_loader = val_dataset
        .filter(|ds| ds.sample_count() > 0)
        .map(|ds| {
            DataLoaderBuilder::new(RowBatcher::<InferBackend>::new(device.clone()))
                .batch_size(cfg.batch_size)
                .num_workers(1)
                .build(ds)
        });

    let mut history = Vec::with_capacity(cfg.epochs);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;
        let mut train_correct  = 0usize;
        let mut train_seen     = 0usize;

        for batch in train_loader.iter() {
            let (loss, logits) = model.forward_loss(batch.features, batch.targets.clone());

            train_loss_sum += loss.clone().into_scalar().elem::<f64>();
            train_batches  += 1;
            train_seen     += batch.targets.dims()[0];
            train_correct  += logits
                .argmax(1)
                .flatten::<1>(0, 1)
                .equal(batch.targets)
                .int().sum().into_scalar().elem::<i64>() as usize;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.learning_rate, model, grads);
        }

        let avg_train_loss = if train_batches > 0 { train_loss_sum / train_batches as f64 } else { f64::NAN };
        let train_acc      = if train_seen > 0 { train_correct as f64 / train_seen as f64 } else { 0.0 };

        // ── Validation phase ──────────────────────────────────────────────────
        let (val_loss, val_acc) = match &val_loader {
            Some(loader) => {
                let model_valid = model.valid();
                let mut loss_sum = 0.0f64;
                let mut batches  = 0usize;
                let mut correct  = 0usize;
                let mut seen     = 0usize;
                for batch in loader.iter() {
                    let (loss, logits) = model_valid.forward_loss(batch.features, batch.targets.clone());
                    loss_sum += loss.into_scalar().elem::<f64>();
                    batches  += 1;
                    seen     += batch.targets.dims()[0];
                    correct  += logits
                        .argmax(1)
                        .flatten::<1>(0, 1)
                        .equal(batch.targets)
                        .int().sum().into_scalar().elem::<i64>() as usize;
                }
                let avg = if batches > 0 { loss_sum / batches as f64 } else { f64::NAN };
                let acc = if seen > 0 { correct as f64 / seen as f64 } else { 0.0 };
                (avg, acc)
            }
            None => (f64::NAN, 0.0),
        };

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | train_acc={:.1}% | val_acc={:.1}%",
            epoch, cfg.epochs, avg_train_loss, val_loss,
            train_acc * 100.0, val_acc * 100.0,
        );

        let metrics = EpochMetrics::new(epoch, avg_train_loss, val_loss, train_acc, val_acc);
        if let Some(logger) = run.logger {
            logger.log(&metrics)?;
        }
        history.push(metrics);
    }

    tracing::info!("Training complete after {} epochs", cfg.epochs);
    Ok((model.valid(), history))
}
