// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Inference workflows over an exported ONNX graph:
//
//   predict    — score one FEN (one session, one call)
//   best_moves — rank the legal moves of a FEN
//   export     — re-export an existing checkpoint
//
// The session is opened once in `new` and lives as long as the
// use case.

use anyhow::Result;
use std::path::Path;

use crate::domain::move_scorer::{parse_square, MoveScorer, ScoredMove};
use crate::domain::traits::PositionEvaluator;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{exporter::export_to_onnx, predictor::Predictor, InferenceDevice};

pub struct PredictUseCase {
    scorer: MoveScorer<Predictor>,
}

impl PredictUseCase {
    pub fn new(onnx_path: impl AsRef<Path>) -> Result<Self> {
        let predictor = Predictor::load(onnx_path)?;
        Ok(Self { scorer: MoveScorer::new(predictor) })
    }

    /// Evaluation of `fen` in pawns, White's point of view
    pub fn predict(&mut self, fen: &str) -> Result<f32> {
        self.scorer.evaluator_mut().evaluate(fen)
    }

    /// Legal moves of `fen`, best first. `from` restricts to one square ("e2").
    pub fn best_moves(&mut self, fen: &str, from: Option<&str>) -> Result<Vec<ScoredMove>> {
        let from = from.map(parse_square).transpose()?;
        self.scorer.score_moves(fen, from)
    }
}

/// Rebuild the ONNX graph from a saved checkpoint.
pub fn export_checkpoint(checkpoint_stem: &str, onnx_path: &str) -> Result<()> {
    let checkpoint = CheckpointManager::new(checkpoint_stem);
    export_to_onnx(&checkpoint, onnx_path, &InferenceDevice::default())
}
