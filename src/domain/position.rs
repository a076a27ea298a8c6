// ============================================================
// Layer 3 — Board Encoding
// ============================================================
// Turns a FEN string into the fixed 12×8×8 binary tensor the
// network consumes.
//
// Channel layout (one plane per piece type and colour):
//   0 P   1 N   2 B   3 R   4 Q   5 K
//   6 p   7 n   8 b   9 r  10 q  11 k
//
// Square s (a1 = 0 … h8 = 63) lands at:
//   row = 7 - s / 8     (rank 8 is row 0)
//   col = s % 8
//
// Training (dataset items) and inference (predictor) both call
// encode_fen.
//
// Only piece placement is encoded. Side to move, castling
// rights, en-passant square and move counters are dropped.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shakmaty::{fen::Fen, Square};

/// Number of piece planes in a board tensor
pub const NUM_CHANNELS: usize = 12;

/// Board edge length
pub const BOARD_SIZE: usize = 8;

/// Number of floats in a flattened board tensor (12 * 8 * 8)
pub const BOARD_TENSOR_LEN: usize = NUM_CHANNELS * BOARD_SIZE * BOARD_SIZE;

/// Piece symbols in channel order.
pub const PIECE_CHANNELS: [char; NUM_CHANNELS] = [
    'P', 'N', 'B', 'R', 'Q', 'K', 'p', 'n', 'b', 'r', 'q', 'k',
];

/// Channel index for a FEN piece symbol, or None for anything else.
pub fn channel_of(symbol: char) -> Option<usize> {
    PIECE_CHANNELS.iter().position(|&c| c == symbol)
}

/// Tensor (row, col) for a square index in 0..64.
pub const fn square_to_row_col(square: usize) -> (usize, usize) {
    (7 - square / 8, square % 8)
}

/// Binary piece-occupancy planes for one position.
/// Indexed as `[channel][row][col]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardTensor(pub [[[f32; BOARD_SIZE]; BOARD_SIZE]; NUM_CHANNELS]);

impl BoardTensor {
    /// An empty board (all zeros)
    pub fn zeros() -> Self {
        Self([[[0.0; BOARD_SIZE]; BOARD_SIZE]; NUM_CHANNELS])
    }

    pub fn get(&self, channel: usize, row: usize, col: usize) -> f32 {
        self.0[channel][row][col]
    }

    fn set(&mut self, channel: usize, row: usize, col: usize) {
        self.0[channel][row][col] = 1.0;
    }

    /// Flatten in channel-major, then row, then column order:
    /// the memory layout of a [12, 8, 8] tensor.
    pub fn to_vec(&self) -> Vec<f32> {
        self.0
            .iter()
            .flat_map(|plane| plane.iter().flat_map(|row| row.iter().copied()))
            .collect()
    }

    /// Append the flattened planes to an existing buffer.
    /// Used when stacking many boards into one batch.
    pub fn extend_into(&self, out: &mut Vec<f32>) {
        for plane in &self.0 {
            for row in plane {
                out.extend_from_slice(row);
            }
        }
    }

    /// Number of cells set to 1.0 (one per occupied square)
    pub fn count_ones(&self) -> usize {
        self.0
            .iter()
            .flatten()
            .flatten()
            .filter(|&&v| v == 1.0)
            .count()
    }
}

impl Default for BoardTensor {
    fn default() -> Self {
        Self::zeros()
    }
}

/// Encode a FEN string into a BoardTensor.
///
/// Validation is whatever the FEN parser performs; a syntactically
/// valid but illegal position is still encoded.
pub fn encode_fen(fen: &str) -> Result<BoardTensor> {
    let parsed = Fen::from_ascii(fen.trim().as_bytes())
        .with_context(|| format!("Malformed FEN '{fen}'"))?;
    let board = &parsed.0.board;

    let mut tensor = BoardTensor::zeros();
    for index in 0..64u32 {
        let Some(piece) = board.piece_at(Square::new(index)) else {
            continue;
        };
        // Every shakmaty piece maps to one of the 12 symbols
        let Some(channel) = channel_of(piece.char()) else {
            continue;
        };
        let (row, col) = square_to_row_col(index as usize);
        tensor.set(channel, row, col);
    }

    Ok(tensor)
}
