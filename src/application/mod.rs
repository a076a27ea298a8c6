// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal:
// training a model, or using an exported one.
//
// No ML math here, only workflow coordination. Final results
// (metrics, predictions) are printed by the CLI or, for the
// end-of-training report, by TrainUseCase itself.

// The training workflow
pub mod train_use_case;

// Prediction, move ranking and re-export
pub mod predict_use_case;
