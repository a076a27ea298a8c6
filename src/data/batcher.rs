// ============================================================
// Layer 4 — Board Batcher
// ============================================================
// Implements Burn's Batcher trait: stacks N ChessItems into
//
//   boards:  [N, 12, 8, 8]  float
//   targets: [N, 1]         float (score in pawns)
//
// Every BoardTensor flattens to the same 768 floats, so the
// boards are appended into one buffer and reshaped once.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::ChessItem;
use crate::domain::position::{BoardTensor, BOARD_SIZE, BOARD_TENSOR_LEN, NUM_CHANNELS};

// ─── ChessBatch ───────────────────────────────────────────────────────────────
/// A mini-batch ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct ChessBatch<B: Backend> {
    /// Board planes, shape [batch_size, 12, 8, 8]
    pub boards: Tensor<B, 4>,

    /// Normalised scores, shape [batch_size, 1]
    pub targets: Tensor<B, 2>,
}

// ─── ChessBatcher ─────────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct ChessBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> ChessBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

/// Stack boards into a single [N, 12, 8, 8] tensor.
/// Shared with the exporter tests and anything else that needs
/// to feed raw boards to the model.
pub fn boards_to_tensor<B: Backend>(boards: &[BoardTensor], device: &B::Device) -> Tensor<B, 4> {
    let mut flat = Vec::with_capacity(boards.len() * BOARD_TENSOR_LEN);
    for board in boards {
        board.extend_into(&mut flat);
    }
    Tensor::from_data(
        TensorData::new(flat, [boards.len(), NUM_CHANNELS, BOARD_SIZE, BOARD_SIZE]),
        device,
    )
}

impl<B: Backend> Batcher<ChessItem, ChessBatch<B>> for ChessBatcher<B> {
    fn batch(&self, items: Vec<ChessItem>) -> ChessBatch<B> {
        let batch_size = items.len();

        let boards: Vec<BoardTensor> = items.iter().map(|item| item.board).collect();
        let boards = boards_to_tensor::<B>(&boards, &self.device);

        let targets: Vec<f32> = items.iter().map(|item| item.target).collect();
        let targets = Tensor::<B, 2>::from_data(
            TensorData::new(targets, [batch_size, 1]),
            &self.device,
        );

        ChessBatch { boards, targets }
    }
}
