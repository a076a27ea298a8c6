// ============================================================
// Layer 4 — CSV Loader
// ============================================================
// Reads the training data file: two unnamed columns, no header.
//
//   rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1,25
//   r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3,-13
//
// Column 1 is the FEN, column 2 the score in integer centipawns.
// A row that can't be read stops the whole load.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::domain::record::EvalRecord;
use crate::domain::traits::RecordSource;

/// Loads `fen,score` rows from a headerless CSV file.
pub struct CsvLoader {
    path: PathBuf,
}

impl CsvLoader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

impl RecordSource for CsvLoader {
    fn load_all(&self) -> Result<Vec<EvalRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .with_context(|| format!("Cannot open CSV '{}'", self.path.display()))?;

        let mut records = Vec::new();
        for (line, row) in reader.deserialize::<(String, i64)>().enumerate() {
            let (fen, score) = row.with_context(|| {
                format!("Bad row {} in '{}'", line + 1, self.path.display())
            })?;
            records.push(EvalRecord::new(fen, score));
        }

        tracing::info!(
            "Loaded {} records from '{}'",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_loads_headerless_rows() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1,25").unwrap();
        writeln!(f, "8/8/8/8/4K3/8/8/7k b - - 0 1,-300").unwrap();

        let records = CsvLoader::new(f.path()).load_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].score, 25);
        assert_eq!(records[1].fen, "8/8/8/8/4K3/8/8/7k b - - 0 1");
        assert_eq!(records[1].score, -300);
    }

    #[test]
    fn test_bad_score_is_error() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "8/8/8/8/4K3/8/8/7k b - - 0 1,lots").unwrap();
        assert!(CsvLoader::new(f.path()).load_all().is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        let loader = CsvLoader::new("definitely/not/here.csv");
        assert!(loader.load_all().is_err());
    }
}
