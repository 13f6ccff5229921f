// ============================================================
// Layer 2: Application / Use Cases
// ============================================================
// Workflow coordination only: no math, no printing, no direct
// parsing. The pipeline tells the other layers what to do in
// what order.
//
// Reference: Rust Book §7 (Module System)

// The load → encode → split → scale → fit → evaluate workflow
pub mod pipeline;
