// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Persistence and bookkeeping shared by the use cases:
//
//   checkpoint.rs — model weights plus the architecture and
//                   training configs, all under one path stem
//
//   metrics.rs    — per-epoch loss CSV and the final R² / MAE
//                   report on the test partition
//
// Reference: Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Epoch loss logging and regression metrics
pub mod metrics;
