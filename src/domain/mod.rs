// ============================================================
// Layer 3: Domain Layer
// ============================================================
// Plain Rust structs and traits describing what the pipeline
// works on. No burn types and no file I/O live here.
//
//   dataset.rs    : raw tables, the cleaned Dataset, and Split
//   evaluation.rs : accuracy, per-class metrics, confusion matrix
//                   and the printable classification report
//   traits.rs     : TableSource and Classifier abstractions
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Raw and cleaned tabular data plus the train/test partition
pub mod dataset;

// Metrics computed from true and predicted class indices
pub mod evaluation;

// Core abstractions (traits) that other layers implement
pub mod traits;
