// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Subcommands: `train`, `predict`, `best-move`, `export`.
// Running the binary with no subcommand trains with defaults.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;
use crate::infra::checkpoint::DEFAULT_STEM;
use crate::ml::predictor::DEFAULT_ONNX_PATH;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the evaluator on a CSV of (fen, centipawn score) rows
    Train(TrainArgs),

    /// Score a FEN with an exported ONNX model
    Predict(PredictArgs),

    /// Rank the legal moves of a position by evaluation change
    BestMove(BestMoveArgs),

    /// Re-export an existing checkpoint to ONNX
    Export(ExportArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Headerless CSV with `fen,score` rows (score in centipawns)
    #[arg(long, default_value = "chess_data.csv")]
    pub csv_path: String,

    /// Checkpoint path stem (writes <stem>.mpk, <stem>.config.json, <stem>.train.json)
    #[arg(long, default_value = DEFAULT_STEM)]
    pub checkpoint: String,

    /// Where to write the exported ONNX graph
    #[arg(long, default_value = DEFAULT_ONNX_PATH)]
    pub onnx_path: String,

    /// Per-epoch loss log
    #[arg(long, default_value = "training_metrics.csv")]
    pub metrics_path: String,

    #[arg(long, default_value_t = 30)]
    pub epochs: usize,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Rows drawn (without replacement) from the CSV
    #[arg(long, default_value_t = 80_000)]
    pub sample_size: usize,

    #[arg(long, default_value_t = 0.2)]
    pub test_fraction: f64,

    /// Seeds sampling, splitting, shuffling and weight init
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Data loader worker threads
    #[arg(long, default_value_t = 1)]
    pub num_workers: usize,
}

impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            csv_path:        a.csv_path,
            checkpoint_path: a.checkpoint,
            onnx_path:       a.onnx_path,
            metrics_path:    a.metrics_path,
            sample_size:     a.sample_size,
            test_fraction:   a.test_fraction,
            seed:            a.seed,
            epochs:          a.epochs,
            batch_size:      a.batch_size,
            lr:              a.lr,
            num_workers:     a.num_workers,
        }
    }
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Position to evaluate, e.g. "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
    pub fen: String,

    /// Exported ONNX model
    #[arg(long, default_value = DEFAULT_ONNX_PATH)]
    pub model: String,
}

#[derive(Args, Debug)]
pub struct BestMoveArgs {
    pub fen: String,

    /// Only consider moves leaving this square, e.g. e2
    #[arg(long)]
    pub from: Option<String>,

    #[arg(long, default_value = DEFAULT_ONNX_PATH)]
    pub model: String,

    /// How many ranked moves to list
    #[arg(long, default_value_t = 5)]
    pub top: usize,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[arg(long, default_value = DEFAULT_STEM)]
    pub checkpoint: String,

    #[arg(long, default_value = DEFAULT_ONNX_PATH)]
    pub onnx_path: String,
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_train_defaults_match_config_defaults() {
        let cli = Cli::parse_from(["fen-eval", "train"]);
        let Some(Commands::Train(args)) = cli.command else { panic!("expected train") };
        let from_cli: TrainConfig = args.into();
        let default = TrainConfig::default();

        assert_eq!(from_cli.csv_path, default.csv_path);
        assert_eq!(from_cli.checkpoint_path, default.checkpoint_path);
        assert_eq!(from_cli.onnx_path, default.onnx_path);
        assert_eq!(from_cli.sample_size, default.sample_size);
        assert_eq!(from_cli.epochs, default.epochs);
        assert_eq!(from_cli.batch_size, default.batch_size);
        assert_eq!(from_cli.lr, default.lr);
        assert_eq!(from_cli.seed, default.seed);
    }

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::parse_from(["fen-eval"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_predict_args() {
        let cli = Cli::parse_from(["fen-eval", "predict", "8/8/8/8/4K3/8/8/7k w - - 0 1", "--model", "m.onnx"]);
        let Some(Commands::Predict(args)) = cli.command else { panic!("expected predict") };
        assert_eq!(args.fen, "8/8/8/8/4K3/8/8/7k w - - 0 1");
        assert_eq!(args.model, "m.onnx");
    }

    #[test]
    fn test_best_move_args() {
        let cli = Cli::parse_from(["fen-eval", "best-move", "8/8/8/8/4K3/8/8/7k w - - 0 1", "--from", "e4"]);
        let Some(Commands::BestMove(args)) = cli.command else { panic!("expected best-move") };
        assert_eq!(args.from.as_deref(), Some("e4"));
        assert_eq!(args.model, DEFAULT_ONNX_PATH);
        assert_eq!(args.top, 5);
    }
}
