// ============================================================
// Layer 5 — ONNX Predictor
// ============================================================
// Scores positions with the exported graph through ONNX Runtime.
// No burn here: the exported file is all inference needs.
//
//   FEN → encode_fen → [n,12,8,8] f32 → session.run → [n,1]
//
// A Predictor owns one session for its whole lifetime, so the
// CLI can score many positions (e.g. every legal move) without
// reloading the graph. `predict` is the one-shot form that
// opens and drops a session per call.
//
// Scores are in pawns from White's point of view, the scale of
// the training labels (centipawns / 100).

use anyhow::{anyhow, ensure, Context, Result};
use ndarray::Array4;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::path::Path;

use crate::domain::position::{BoardTensor, BOARD_SIZE, BOARD_TENSOR_LEN, NUM_CHANNELS};
use crate::domain::traits::PositionEvaluator;
use crate::ml::exporter::{INPUT_NAME, OUTPUT_NAME};

/// Default location of the exported graph
pub const DEFAULT_ONNX_PATH: &str = "model.onnx";

/// An ONNX Runtime session over an exported evaluation graph.
pub struct Predictor {
    session: Session,
}

impl Predictor {
    /// Open the graph at `path` and check it has the expected
    /// `board` input and `evaluation` output.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        ensure!(
            path.exists(),
            "ONNX model '{}' not found. Run 'train' or 'export' first.",
            path.display()
        );

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(1)?
            .commit_from_file(path)
            .with_context(|| format!("Cannot load ONNX model '{}'", path.display()))?;

        ensure!(
            session.inputs.iter().any(|i| i.name == INPUT_NAME),
            "'{}' has no '{INPUT_NAME}' input",
            path.display()
        );
        ensure!(
            session.outputs.iter().any(|o| o.name == OUTPUT_NAME),
            "'{}' has no '{OUTPUT_NAME}' output",
            path.display()
        );

        tracing::debug!("Loaded ONNX model '{}'", path.display());
        Ok(Self { session })
    }
}

impl PositionEvaluator for Predictor {
    fn evaluate_boards(&mut self, boards: &[BoardTensor]) -> Result<Vec<f32>> {
        if boards.is_empty() {
            return Ok(Vec::new());
        }

        let mut flat = Vec::with_capacity(boards.len() * BOARD_TENSOR_LEN);
        for board in boards {
            board.extend_into(&mut flat);
        }
        let array = Array4::from_shape_vec(
            (boards.len(), NUM_CHANNELS, BOARD_SIZE, BOARD_SIZE),
            flat,
        )?;
        let input = Tensor::from_array(array)?;

        let outputs = self
            .session
            .run(ort::inputs![INPUT_NAME => input])
            .map_err(|e| anyhow!("ONNX inference failed: {e}"))?;
        let (_, scores) = outputs[OUTPUT_NAME]
            .try_extract_tensor::<f32>()
            .map_err(|e| anyhow!("Unexpected '{OUTPUT_NAME}' output: {e}"))?;

        ensure!(
            scores.len() == boards.len(),
            "Model returned {} scores for {} boards",
            scores.len(),
            boards.len()
        );
        Ok(scores.to_vec())
    }
}

/// Score one FEN with the graph at `onnx_path`.
/// The session is created for this call and released on return.
pub fn predict(fen: &str, onnx_path: impl AsRef<Path>) -> Result<f32> {
    Predictor::load(onnx_path)?.evaluate(fen)
}
