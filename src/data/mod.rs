// ============================================================
// Layer 4: Data Pipeline
// ============================================================
// Everything from a CSV file on disk to scaled matrices and
// burn tensor batches.
//
//   CSV file
//       │
//       ▼
//   CsvLoader       → RawTable of string cells
//       │
//       ▼
//   Preprocessor    → numeric features, raw labels, bad rows dropped
//       │
//       ▼
//   LabelEncoder    → zero-based class indices
//       │
//       ▼
//   splitter        → seeded (optionally stratified) train/test rows
//       │
//       ▼
//   StandardScaler  → fitted on train, applied to both
//       │
//       ▼
//   RowDataset + RowBatcher → tensor batches (attention network only)
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads CSV files into string tables
pub mod loader;

/// Numeric coercion and row filtering
pub mod preprocessor;

/// Label string → class index
pub mod label_encoder;

/// Seeded train/test split, plain or stratified
pub mod splitter;

/// Per-feature standardization
pub mod scaler;

/// Implements Burn's Dataset trait for scaled rows
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Synthetic antibody-shaped CSV generator
pub mod synthetic;
