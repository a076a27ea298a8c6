// ============================================================
// ONNX Layer
// ============================================================
// Writes and reads the portable graph format:
//
//   proto.rs    — prost message types (subset of onnx.proto)
//   builder.rs  — GraphBuilder, attribute/tensor helpers
//
// No burn types here; ml::exporter translates the trained
// model into builder calls.

/// ONNX protobuf messages
pub mod proto;

/// Graph construction helpers
pub mod builder;

pub use builder::{Dim, GraphBuilder};
pub use proto::ModelProto;
