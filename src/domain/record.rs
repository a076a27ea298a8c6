// ============================================================
// Layer 3 — Evaluation Record
// ============================================================
// One labelled row of training data: a position and its
// engine score in centipawns, exactly as it appears in the CSV.
//
// The network is trained on pawns, not centipawns, so every
// consumer reads the label through normalized_score().

use serde::{Deserialize, Serialize};

/// Centipawns per pawn: the label normalisation divisor
pub const SCORE_SCALE: f32 = 100.0;

/// A (fen, score) row. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalRecord {
    /// Forsyth–Edwards Notation of the position
    pub fen: String,

    /// Evaluation in centipawns from the data source
    pub score: i64,
}

impl EvalRecord {
    pub fn new(fen: impl Into<String>, score: i64) -> Self {
        Self { fen: fen.into(), score }
    }

    /// Score in pawns (centipawns / 100)
    pub fn normalized_score(&self) -> f32 {
        self.score as f32 / SCORE_SCALE
    }
}
