// ============================================================
// Layer 5: ML / Estimator Layer
// ============================================================
// Every estimator lives here behind the domain Classifier trait.
// Only this layer and the data batcher touch burn or gbdt.
//
//   booster.rs   : one-vs-rest gradient-boosted trees (gbdt),
//                  three hyperparameter presets
//   model.rs     : tabular attention network (burn modules):
//                  per-feature tokens, multi-head self-attention,
//                  GELU feed-forward, LayerNorm, residuals,
//                  mean pooling, linear class head
//   trainer.rs   : AdamW training loop with per-epoch validation
//   attention.rs : Classifier impl wrapping model + trainer
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Vaswani et al. (2017) Attention Is All You Need

/// One-vs-rest gradient boosting
pub mod booster;

/// Attention network architecture
pub mod model;

/// Training loop with validation and metrics logging
pub mod trainer;

/// Classifier adapter for the attention network
pub mod attention;
