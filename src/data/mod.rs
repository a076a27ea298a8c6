// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// From the CSV file to tensor batches:
//
//   chess_data.csv
//       │
//       ▼
//   CsvLoader          → Vec<EvalRecord>
//       │
//       ▼
//   sampler/splitter   → fixed-size sample, train/test partitions
//       │
//       ▼
//   ChessDataset       → Burn Dataset, encodes FENs on access
//       │
//       ▼
//   ChessBatcher       → [N,12,8,8] boards + [N,1] targets
//       │
//       ▼
//   DataLoader         → feeds batches to the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads headerless fen,score CSV files
pub mod loader;

/// Seeded sampling and train/test splitting
pub mod splitter;

/// Implements Burn's Dataset trait for labelled positions
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
