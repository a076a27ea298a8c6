// ============================================================
// Layer 6 — Metrics
// ============================================================
// Two concerns:
//
//   MetricsLogger     — one CSV row per epoch
//                       epoch,train_loss,test_loss
//   RegressionReport  — R² and mean absolute error of the
//                       final model on the test partition
//
// Losses in the CSV are the per-epoch SUMS of batch losses,
// the same numbers printed on the console.
//
// R² follows the usual convention: 1 − SS_res / SS_tot, and
// when the targets are constant (SS_tot = 0) the score is 1.0
// for a perfect fit and 0.0 otherwise.

use anyhow::{ensure, Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

const CSV_HEADER: &str = "epoch,train_loss,test_loss";

/// Losses for one training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// Starts at 1
    pub epoch:      usize,
    pub train_loss: f64,
    pub test_loss:  f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, test_loss: f64) -> Self {
        Self { epoch, train_loss, test_loss }
    }
}

/// Appends epoch metrics to a CSV file.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Start a fresh log at `csv_path`, truncating any previous run.
    pub fn new(csv_path: impl AsRef<Path>) -> Result<Self> {
        let csv_path = csv_path.as_ref().to_path_buf();
        if let Some(dir) = csv_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let mut f = fs::File::create(&csv_path)
            .with_context(|| format!("Cannot create metrics file '{}'", csv_path.display()))?;
        writeln!(f, "{CSV_HEADER}")?;
        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;
        writeln!(f, "{},{:.6},{:.6}", m.epoch, m.train_loss, m.test_loss)?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, test_loss={:.4}",
            m.epoch, m.train_loss, m.test_loss,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Regression metrics ───────────────────────────────────────────────────────

/// Coefficient of determination.
pub fn r2_score(preds: &[f32], targets: &[f32]) -> f64 {
    let n = targets.len() as f64;
    if n == 0.0 {
        return 0.0;
    }
    let mean = targets.iter().map(|&t| t as f64).sum::<f64>() / n;

    let ss_res: f64 = preds
        .iter()
        .zip(targets)
        .map(|(&p, &t)| (t as f64 - p as f64).powi(2))
        .sum();
    let ss_tot: f64 = targets.iter().map(|&t| (t as f64 - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

pub fn mean_absolute_error(preds: &[f32], targets: &[f32]) -> f64 {
    if targets.is_empty() {
        return 0.0;
    }
    let total: f64 = preds
        .iter()
        .zip(targets)
        .map(|(&p, &t)| (p as f64 - t as f64).abs())
        .sum();
    total / targets.len() as f64
}

/// Held-out quality of the final model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionReport {
    pub r2:  f64,
    pub mae: f64,
}

impl RegressionReport {
    pub fn compute(preds: &[f32], targets: &[f32]) -> Result<Self> {
        ensure!(!targets.is_empty(), "Cannot score an empty test set");
        ensure!(
            preds.len() == targets.len(),
            "{} predictions for {} targets",
            preds.len(),
            targets.len()
        );
        Ok(Self {
            r2:  r2_score(preds, targets),
            mae: mean_absolute_error(preds, targets),
        })
    }

    /// End-of-training console block: both scores, then the first
    /// `shown` prediction/target pairs under a header.
    pub fn summary(&self, preds: &[f32], targets: &[f32], shown: usize) -> String {
        let mut out = format!(
            "\nR² Score: {:.4}\nMean Absolute Error: {:.4}\n\nSample Predictions:\n",
            self.r2, self.mae
        );
        for (p, t) in preds.iter().zip(targets).take(shown) {
            out.push_str(&format!("  Predicted: {:.2} | Actual: {:.2}\n", p, t));
        }
        out
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_writes_header_and_rows() {
        let dir    = tempfile::tempdir().unwrap();
        let path   = dir.path().join("logs").join("training_metrics.csv");
        let logger = MetricsLogger::new(&path).unwrap();
        logger.log(&EpochMetrics::new(1, 10.5, 3.25)).unwrap();
        logger.log(&EpochMetrics::new(2, 8.0, 3.0)).unwrap();

        let text  = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, [CSV_HEADER, "1,10.500000,3.250000", "2,8.000000,3.000000"]);

        // A new run starts from an empty log
        MetricsLogger::new(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_perfect_predictions() {
        let t = [1.0, 2.0, 3.0];
        assert_eq!(r2_score(&t, &t), 1.0);
        assert_eq!(mean_absolute_error(&t, &t), 0.0);
    }

    #[test]
    fn test_mean_predictor_scores_zero() {
        let t = [1.0, 2.0, 3.0];
        let p = [2.0, 2.0, 2.0];
        assert!(r2_score(&p, &t).abs() < 1e-12);
        assert!((mean_absolute_error(&p, &t) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_targets() {
        let t = [0.5, 0.5];
        assert_eq!(r2_score(&[0.5, 0.5], &t), 1.0);
        assert_eq!(r2_score(&[0.4, 0.6], &t), 0.0);
    }

    #[test]
    fn test_report_validates_input() {
        assert!(RegressionReport::compute(&[], &[]).is_err());
        assert!(RegressionReport::compute(&[1.0], &[1.0, 2.0]).is_err());

        let r = RegressionReport::compute(&[1.0, 3.0], &[1.0, 2.0]).unwrap();
        assert!((r.mae - 0.5).abs() < 1e-12);
        assert!((r.r2 - (1.0 - 1.0 / 0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_summary_layout() {
        let preds   = [1.0, 2.5, 3.0, 4.0, 5.0, 6.0];
        let targets = [1.0, 2.0, 3.0, 4.0, 5.0, 6.5];
        let report  = RegressionReport { r2: 0.875, mae: 0.16666 };

        let text  = report.summary(&preds, &targets, 5);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "",
                "R² Score: 0.8750",
                "Mean Absolute Error: 0.1667",
                "",
                "Sample Predictions:",
                "  Predicted: 1.00 | Actual: 1.00",
                "  Predicted: 2.50 | Actual: 2.00",
                "  Predicted: 3.00 | Actual: 3.00",
                "  Predicted: 4.00 | Actual: 4.00",
                "  Predicted: 5.00 | Actual: 5.00",
            ]
        );
    }
}
