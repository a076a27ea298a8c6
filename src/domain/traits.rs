// ============================================================
// Layer 3 — Core Traits
// ============================================================
// The two seams of the pipeline:
//   RecordSource       — where labelled positions come from
//                        (CsvLoader today)
//   PositionEvaluator  — anything that scores a FEN
//                        (the ONNX-backed Predictor)
//
// The application layer and the move scorer are written
// against these traits, not the concrete types.

use anyhow::Result;

use crate::domain::position::BoardTensor;
use crate::domain::record::EvalRecord;

// ─── RecordSource ─────────────────────────────────────────────────────────────
/// A source of labelled positions.
pub trait RecordSource {
    /// Load every record. Any unreadable or malformed row is an error.
    fn load_all(&self) -> Result<Vec<EvalRecord>>;
}

// ─── PositionEvaluator ────────────────────────────────────────────────────────
/// Scores positions in pawns from White's point of view
/// (the convention of the training labels).
pub trait PositionEvaluator {
    /// Score already-encoded boards, one output per board.
    fn evaluate_boards(&mut self, boards: &[BoardTensor]) -> Result<Vec<f32>>;

    /// Encode and score a single FEN.
    fn evaluate(&mut self, fen: &str) -> Result<f32> {
        let board = crate::domain::position::encode_fen(fen)?;
        let scores = self.evaluate_boards(std::slice::from_ref(&board))?;
        scores
            .first()
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Evaluator returned no output for '{fen}'"))
    }
}
