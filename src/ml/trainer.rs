// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Mini-batch Adam on MSE loss, a fixed number of epochs.
//
//   - TrainBackend (Autodiff) for the training phase
//   - model.valid() → InnerBackend for the test phase
//   - train loader shuffled (seeded), test loader in order
//
// Both datasets are validated up front: burn's loader stops at
// the first item `get` cannot produce, so a bad row would
// otherwise end the epoch early without an error.
//
// Each epoch reports the SUM of per-batch losses for both
// partitions. Nothing is kept between epochs except the
// parameters themselves: no early stopping, no schedule,
// no best-model copy.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use std::sync::Arc;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::ChessBatcher, dataset::ChessDataset};
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::{EvaluationModel, EvaluationModelConfig};
use crate::ml::{InferenceDevice, InnerBackend, TrainBackend};

/// What a finished run hands back to the use case.
pub struct TrainingOutcome {
    /// Final parameters, detached from autodiff
    pub model:   EvaluationModel<InnerBackend>,
    /// One entry per epoch, in order
    pub history: Vec<EpochMetrics>,
}

pub fn run_training(
    cfg:       &TrainConfig,
    model_cfg: &EvaluationModelConfig,
    train:     Arc<ChessDataset>,
    test:      Arc<ChessDataset>,
    metrics:   Option<&MetricsLogger>,
    device:    &InferenceDevice,
) -> Result<TrainingOutcome> {
    train.validate()?;
    test.validate()?;

    // Parameter init and shuffling both follow this seed
    TrainBackend::seed(cfg.seed);

    let mut model: EvaluationModel<TrainBackend> = model_cfg.init(device);
    tracing::info!(
        "Model ready: conv {}→{}→{}, hidden {}",
        model_cfg.input_channels, model_cfg.conv1_channels,
        model_cfg.conv2_channels, model_cfg.hidden,
    );

    let mut optim = AdamConfig::new().init();

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_loader = DataLoaderBuilder::new(ChessBatcher::<TrainBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(cfg.num_workers)
        .build(train);

    // ── Test data loader (InnerBackend, no autodiff) ────────────────────────
    let test_loader = DataLoaderBuilder::new(ChessBatcher::<InnerBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .num_workers(cfg.num_workers)
        .build(test);

    let mut history = Vec::with_capacity(cfg.epochs);

    for epoch in 1..=cfg.epochs {
        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss = 0.0f64;
        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(batch.boards, batch.targets);
            train_loss += loss.clone().into_scalar().elem::<f64>();

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(cfg.lr, model, grads);
        }

        // ── Test phase ────────────────────────────────────────────────────────
        let model_valid = model.valid();
        let mut test_loss = 0.0f64;
        for batch in test_loader.iter() {
            let (loss, _) = model_valid.forward_loss(batch.boards, batch.targets);
            test_loss += loss.into_scalar().elem::<f64>();
        }

        println!(
            "Epoch {}/{} - Train Loss: {:.4} | Test Loss: {:.4}",
            epoch, cfg.epochs, train_loss, test_loss,
        );

        let m = EpochMetrics::new(epoch, train_loss, test_loss);
        if let Some(logger) = metrics {
            logger.log(&m)?;
        }
        history.push(m);
    }

    tracing::info!("Training complete after {} epochs", cfg.epochs);
    Ok(TrainingOutcome { model: model.valid(), history })
}

/// Run the model over `dataset` in order.
/// Returns (predictions, targets), both in pawns.
pub fn evaluate(
    model:      &EvaluationModel<InnerBackend>,
    dataset:    Arc<ChessDataset>,
    batch_size: usize,
    device:     &InferenceDevice,
) -> Result<(Vec<f32>, Vec<f32>)> {
    dataset.validate()?;

    let loader = DataLoaderBuilder::new(ChessBatcher::<InnerBackend>::new(device.clone()))
        .batch_size(batch_size)
        .build(dataset);

    let mut preds   = Vec::new();
    let mut targets = Vec::new();
    for batch in loader.iter() {
        let out = model.forward(batch.boards);
        preds.extend(out.into_data().iter::<f32>());
        targets.extend(batch.targets.into_data().iter::<f32>());
    }
    Ok((preds, targets))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::EvalRecord;

    fn tiny_config(epochs: usize) -> TrainConfig {
        TrainConfig {
            epochs,
            batch_size:  8,
            num_workers: 1,
            ..TrainConfig::default()
        }
    }

    fn synthetic_records() -> Vec<EvalRecord> {
        let positions = [
            ("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", 300),
            ("8/8/8/8/4K3/8/8/7k w - - 0 1", 100),
            ("8/8/8/8/4K3/8/3Q4/7k w - - 0 1", 500),
            ("8/8/3q4/8/4K3/8/8/7k w - - 0 1", 200),
        ];
        (0..32)
            .map(|i| {
                let (fen, score) = positions[i % positions.len()];
                EvalRecord::new(fen, score)
            })
            .collect()
    }

    #[test]
    fn test_training_loss_decreases() {
        let device = InferenceDevice::default();
        let cfg    = tiny_config(12);
        let data   = Arc::new(ChessDataset::new(synthetic_records()));

        let outcome = run_training(
            &cfg,
            &EvaluationModelConfig::new(),
            data.clone(),
            data,
            None,
            &device,
        ).unwrap();

        assert_eq!(outcome.history.len(), 12);
        assert!(outcome.history.iter().all(|m| m.train_loss.is_finite()));

        // Average of the last three epochs below the first three
        let head: f64 = outcome.history[..3].iter().map(|m| m.train_loss).sum();
        let tail: f64 = outcome.history[9..].iter().map(|m| m.train_loss).sum();
        assert!(tail < head, "loss did not go down: head={head} tail={tail}");
    }

    #[test]
    fn test_evaluate_returns_aligned_vectors() {
        let device  = InferenceDevice::default();
        let model: EvaluationModel<InnerBackend> = EvaluationModelConfig::new().init(&device);
        let data    = Arc::new(ChessDataset::new(synthetic_records()));

        let (preds, targets) = evaluate(&model, data, 5, &device).unwrap();
        assert_eq!(preds.len(), 32);
        assert_eq!(targets.len(), 32);
        assert!(preds.iter().all(|p| p.is_finite()));
        // Unshuffled: targets come back in record order
        assert_eq!(targets[0], 3.0);
        assert_eq!(targets[2], 5.0);
        assert_eq!(targets[3], 2.0);
    }

    #[test]
    fn test_empty_test_partition() {
        let device = InferenceDevice::default();
        let cfg    = tiny_config(1);
        let train  = Arc::new(ChessDataset::new(synthetic_records()));
        let test   = Arc::new(ChessDataset::new(Vec::new()));

        let outcome = run_training(&cfg, &EvaluationModelConfig::new(), train, test, None, &device).unwrap();
        assert_eq!(outcome.history[0].test_loss, 0.0);
    }

    #[test]
    fn test_malformed_fen_aborts_instead_of_truncating() {
        let device = InferenceDevice::default();
        let mut records = vec![EvalRecord::new("garbage", 0)];
        records.extend(synthetic_records().into_iter().take(16));
        let bad  = Arc::new(ChessDataset::new(records));
        let good = Arc::new(ChessDataset::new(synthetic_records()));

        let cfg = tiny_config(1);
        let model_cfg = EvaluationModelConfig::new();
        assert!(run_training(&cfg, &model_cfg, bad.clone(), good.clone(), None, &device).is_err());
        assert!(run_training(&cfg, &model_cfg, good, bad.clone(), None, &device).is_err());

        let model: EvaluationModel<InnerBackend> = model_cfg.init(&device);
        assert!(evaluate(&model, bad, 8, &device).is_err());
    }
}
