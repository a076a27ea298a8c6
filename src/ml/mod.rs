// ============================================================
// Layer 5 — ML / Model Layer (Burn + ONNX Runtime)
// ============================================================
// Everything that touches burn or ort lives here:
//
//   model.rs      — the evaluation CNN and its config
//   trainer.rs    — epoch loop, per-epoch losses, evaluation
//   exporter.rs   — checkpoint → ONNX graph
//   predictor.rs  — ONNX graph → score for a FEN
//
// Backends:
//   InnerBackend  NdArray (CPU) by default, Wgpu with the
//                 `wgpu` cargo feature
//   TrainBackend  Autodiff<InnerBackend>
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)

/// Convolutional evaluation network
pub mod model;

/// Training loop and held-out evaluation
pub mod trainer;

/// Checkpoint → ONNX graph export
pub mod exporter;

/// ONNX Runtime inference
pub mod predictor;

#[cfg(not(feature = "wgpu"))]
pub type InnerBackend = burn::backend::NdArray;

#[cfg(feature = "wgpu")]
pub type InnerBackend = burn::backend::Wgpu;

pub type TrainBackend = burn::backend::Autodiff<InnerBackend>;

pub type InferenceDevice = <InnerBackend as burn::prelude::Backend>::Device;
