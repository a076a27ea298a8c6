use anyhow::{Context, Result};
use burn::data::dataset::Dataset;
use shakmaty::fen::Fen;

use crate::domain::position::{encode_fen, BoardTensor};
use crate::domain::record::EvalRecord;

/// One encoded training item: board planes and the score in pawns.
#[derive(Debug, Clone)]
pub struct ChessItem {
    pub board:  BoardTensor,
    pub target: f32,
}

/// Labelled positions, encoded on every access.
pub struct ChessDataset {
    records: Vec<EvalRecord>,
}

impl ChessDataset {
    pub fn new(records: Vec<EvalRecord>) -> Self { Self { records } }

    pub fn records(&self) -> &[EvalRecord] { &self.records }

    /// Check every FEN parses, so a bad row fails the run up front
    /// instead of being dropped by the data loader mid-epoch.
    pub fn validate(&self) -> Result<()> {
        for (i, r) in self.records.iter().enumerate() {
            Fen::from_ascii(r.fen.trim().as_bytes())
                .with_context(|| format!("Record {i} has a malformed FEN '{}'", r.fen))?;
        }
        Ok(())
    }

    /// Fallible access: encodes the board for `index`.
    pub fn item(&self, index: usize) -> Result<Option<ChessItem>> {
        let Some(record) = self.records.get(index) else {
            return Ok(None);
        };
        let board = encode_fen(&record.fen)?;
        Ok(Some(ChessItem { board, target: record.normalized_score() }))
    }
}

impl Dataset<ChessItem> for ChessDataset {
    fn get(&self, index: usize) -> Option<ChessItem> {
        match self.item(index) {
            Ok(item) => item,
            Err(e) => {
                tracing::error!("Skipping record {index}: {e:#}");
                None
            }
        }
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
