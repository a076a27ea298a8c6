// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and routes to Layer 2. Results
// meant for the user go to stdout; progress goes to tracing.
//
//   fen-eval                      train with defaults
//   fen-eval train [flags]        train, checkpoint, export
//   fen-eval predict <FEN>        score one position
//   fen-eval best-move <FEN>      rank legal moves
//   fen-eval export [flags]       checkpoint → ONNX again
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{BestMoveArgs, Commands, ExportArgs, PredictArgs};

use crate::application::{
    predict_use_case::{export_checkpoint, PredictUseCase},
    train_use_case::{TrainConfig, TrainUseCase},
};

#[derive(Parser, Debug)]
#[command(
    name = "fen-eval",
    version,
    about = "Train a CNN chess position evaluator, export it to ONNX, and score FENs."
)]
pub struct Cli {
    /// Defaults to training when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            None                           => run_train(TrainConfig::default()),
            Some(Commands::Train(args))    => run_train(args.into()),
            Some(Commands::Predict(args))  => run_predict(args),
            Some(Commands::BestMove(args)) => run_best_move(args),
            Some(Commands::Export(args))   => run_export(args),
        }
    }
}

fn run_train(config: TrainConfig) -> Result<()> {
    tracing::info!("Starting training on '{}'", config.csv_path);
    let onnx_path = config.onnx_path.clone();
    TrainUseCase::new(config).execute()?;
    println!("Training complete. Model exported to '{onnx_path}'.");
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    let mut use_case = PredictUseCase::new(&args.model)?;
    let score = use_case.predict(&args.fen)?;
    println!("Predicted score: {score:.4}");
    Ok(())
}

fn run_best_move(args: BestMoveArgs) -> Result<()> {
    let mut use_case = PredictUseCase::new(&args.model)?;
    let moves = use_case.best_moves(&args.fen, args.from.as_deref())?;

    match moves.first() {
        Some(best) => println!("Suggested: {} (Quality: {:.3})", best.uci, best.quality),
        None       => println!("Suggested: none"),
    }
    for m in moves.iter().take(args.top) {
        println!(
            "  {:<6} score {:>8.4}  delta {:>+8.4}  quality {:.3}",
            m.uci, m.score, m.delta, m.quality
        );
    }
    Ok(())
}

fn run_export(args: ExportArgs) -> Result<()> {
    export_checkpoint(&args.checkpoint, &args.onnx_path)?;
    println!("Exported '{}' to '{}'", args.checkpoint, args.onnx_path);
    Ok(())
}
