// ============================================================
// Layer 6: Infrastructure Layer
// ============================================================
// File outputs that several layers share:
//
//   metrics.rs      : per-epoch training metrics appended to a
//                     CSV (attention network runs)
//
//   report_store.rs : run config and classification reports
//                     written as pretty JSON, so a run can be
//                     inspected or replayed later
//
// Reference: Rust Book §9 (Error Handling with anyhow)

/// Training metrics CSV logger
pub mod metrics;

/// JSON persistence for run config and evaluation reports
pub mod report_store;
