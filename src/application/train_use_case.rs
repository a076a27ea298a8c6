// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load the CSV                 (Layer 4 - data)
//   Step 2: Sample without replacement   (Layer 4 - data)
//   Step 3: Train/test split             (Layer 4 - data)
//   Step 4: Build datasets               (Layer 4 - data)
//   Step 5: Save configs                 (Layer 6 - infra)
//   Step 6: Run training loop            (Layer 5 - ml)
//   Step 7: Save checkpoint              (Layer 6 - infra)
//   Step 8: Export to ONNX               (Layer 5 - ml)
//   Step 9: Score the test partition     (Layer 6 - infra)
//
// Steps 2 and 3 each get their own StdRng seeded with
// `cfg.seed`; burn's parameter init and shuffling use the same
// seed inside the trainer.
//
// Reference: Burn Book §5 (Training)

use anyhow::{ensure, Result};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::data::{
    dataset::ChessDataset,
    loader::CsvLoader,
    splitter::{sample_without_replacement, split_train_test},
};
use crate::domain::traits::RecordSource;
use crate::infra::{
    checkpoint::{CheckpointManager, DEFAULT_STEM},
    metrics::{EpochMetrics, MetricsLogger, RegressionReport},
};
use crate::ml::{
    exporter::export_to_onnx,
    model::EvaluationModelConfig,
    predictor::DEFAULT_ONNX_PATH,
    trainer::{evaluate, run_training},
    InferenceDevice,
};

/// Number of test predictions echoed after training
const SHOWN_PREDICTIONS: usize = 5;

// ─── Training Configuration ──────────────────────────────────────────────────
// Saved next to the checkpoint as <stem>.train.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub csv_path:        String,
    /// Checkpoint path stem; files are <stem>.mpk, <stem>.config.json, ...
    pub checkpoint_path: String,
    pub onnx_path:       String,
    pub metrics_path:    String,
    pub sample_size:     usize,
    pub test_fraction:   f64,
    pub seed:            u64,
    pub epochs:          usize,
    pub batch_size:      usize,
    pub lr:              f64,
    pub num_workers:     usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            csv_path:        "chess_data.csv".to_string(),
            checkpoint_path: DEFAULT_STEM.to_string(),
            onnx_path:       DEFAULT_ONNX_PATH.to_string(),
            metrics_path:    "training_metrics.csv".to_string(),
            sample_size:     80_000,
            test_fraction:   0.2,
            seed:            42,
            epochs:          30,
            batch_size:      32,
            lr:              1e-3,
            num_workers:     1,
        }
    }
}

impl TrainConfig {
    fn validate(&self) -> Result<()> {
        ensure!(self.epochs > 0, "epochs must be at least 1");
        ensure!(self.batch_size > 0, "batch size must be at least 1");
        ensure!(self.num_workers > 0, "num_workers must be at least 1");
        ensure!(
            (0.0..1.0).contains(&self.test_fraction),
            "test fraction must be in [0, 1), got {}",
            self.test_fraction
        );
        ensure!(self.lr > 0.0, "learning rate must be positive");
        Ok(())
    }
}

/// What a finished run produced
#[derive(Debug, Clone)]
pub struct TrainSummary {
    pub train_size: usize,
    pub test_size:  usize,
    pub history:    Vec<EpochMetrics>,
    /// None when the test partition is empty
    pub report:     Option<RegressionReport>,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<TrainSummary> {
        let cfg = &self.config;
        cfg.validate()?;
        let device = InferenceDevice::default();

        // ── Step 1: Load the labelled positions ───────────────────────────────
        tracing::info!("Loading training data from '{}'", cfg.csv_path);
        let records = CsvLoader::new(&cfg.csv_path).load_all()?;
        ensure!(!records.is_empty(), "'{}' contains no records", cfg.csv_path);
        tracing::info!("Loaded {} records", records.len());

        // ── Step 2: Fixed-size random sample ──────────────────────────────────
        if cfg.sample_size > records.len() {
            tracing::warn!(
                "Requested {} samples but only {} records exist; using all of them",
                cfg.sample_size,
                records.len()
            );
        }
        let mut sample_rng = StdRng::seed_from_u64(cfg.seed);
        let sampled = sample_without_replacement(records, cfg.sample_size, &mut sample_rng);

        // ── Step 3: Train / test split ────────────────────────────────────────
        let mut split_rng = StdRng::seed_from_u64(cfg.seed);
        let (train_records, test_records) = split_train_test(sampled, cfg.test_fraction, &mut split_rng);
        ensure!(!train_records.is_empty(), "Training partition is empty");
        tracing::info!(
            "Split: {} train, {} test",
            train_records.len(),
            test_records.len()
        );

        // ── Step 4: Datasets (validated by the trainer) ───────────────────────
        let train_dataset = Arc::new(ChessDataset::new(train_records));
        let test_dataset  = Arc::new(ChessDataset::new(test_records));

        // ── Step 5: Save configs before training ──────────────────────────────
        let model_cfg  = EvaluationModelConfig::new();
        let checkpoint = CheckpointManager::new(&cfg.checkpoint_path);
        checkpoint.save_config(&model_cfg)?;
        checkpoint.save_train_config(cfg)?;
        let logger = MetricsLogger::new(&cfg.metrics_path)?;

        // ── Step 6: Training loop ─────────────────────────────────────────────
        let outcome = run_training(
            cfg,
            &model_cfg,
            train_dataset.clone(),
            test_dataset.clone(),
            Some(&logger),
            &device,
        )?;
        tracing::info!("Epoch losses written to '{}'", logger.csv_path().display());

        // ── Step 7 + 8: Persist and export ────────────────────────────────────
        checkpoint.save_model(&outcome.model)?;
        export_to_onnx(&checkpoint, &cfg.onnx_path, &device)?;

        // ── Step 9: Held-out metrics ──────────────────────────────────────────
        let report = if test_dataset.records().is_empty() {
            tracing::warn!("Test partition is empty; skipping R² and MAE");
            None
        } else {
            let (preds, targets) = evaluate(&outcome.model, test_dataset.clone(), cfg.batch_size, &device)?;
            let report = RegressionReport::compute(&preds, &targets)?;
            print!("{}", report.summary(&preds, &targets, SHOWN_PREDICTIONS));
            Some(report)
        };

        Ok(TrainSummary {
            train_size: train_dataset.records().len(),
            test_size:  test_dataset.records().len(),
            history:    outcome.history,
            report,
        })
    }
}
