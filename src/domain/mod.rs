// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types for the chess side of the system:
//   - the board tensor and the FEN encoder
//   - labelled evaluation records
//   - the traits other layers implement
//   - legal-move ranking on top of any evaluator
//
// No burn, ort or file I/O in here.

/// FEN → 12×8×8 board tensor
pub mod position;

/// (fen, centipawn score) rows
pub mod record;

/// RecordSource / PositionEvaluator abstractions
pub mod traits;

/// Legal-move ranking by evaluation change
pub mod move_scorer;
