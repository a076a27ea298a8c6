// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores the trained network with Burn's
// NamedMpkFileRecorder at full precision.
//
// Everything hangs off one path stem:
//
//   <stem>.mpk          — model weights (MessagePack)
//   <stem>.config.json  — EvaluationModelConfig (architecture)
//   <stem>.train.json   — TrainConfig of the run that produced it
//
// The architecture file is written before training starts and
// is what the loader rebuilds the network from. The exporter
// checks the loaded weights against it.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
};
use serde::{de::DeserializeOwned, Serialize};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::{EvaluationModel, EvaluationModelConfig};

type ModelRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

/// Default checkpoint stem used by the CLI
pub const DEFAULT_STEM: &str = "fen_evaluator_model";

/// Saves and loads the model and its configs under one path stem.
#[derive(Debug, Clone)]
pub struct CheckpointManager {
    stem: PathBuf,
}

impl CheckpointManager {
    /// `stem` is the checkpoint path without extension.
    /// A trailing `.mpk` is accepted and stripped.
    pub fn new(stem: impl Into<PathBuf>) -> Self {
        let mut stem: PathBuf = stem.into();
        if stem.extension().is_some_and(|ext| ext == "mpk") {
            stem.set_extension("");
        }
        Self { stem }
    }

    /// Path of the weights file
    pub fn model_path(&self) -> PathBuf {
        self.with_suffix(".mpk")
    }

    pub fn config_path(&self) -> PathBuf {
        self.with_suffix(".config.json")
    }

    pub fn train_config_path(&self) -> PathBuf {
        self.with_suffix(".train.json")
    }

    /// Write the model weights to `<stem>.mpk`, replacing any previous file.
    pub fn save_model<B: Backend>(&self, model: &EvaluationModel<B>) -> Result<()> {
        self.ensure_parent()?;
        // The recorder appends the extension itself
        ModelRecorder::new()
            .record(model.clone().into_record(), self.stem.clone())
            .with_context(|| {
                format!("Failed to save checkpoint to '{}'", self.model_path().display())
            })?;

        tracing::info!("Saved checkpoint '{}'", self.model_path().display());
        Ok(())
    }

    /// Rebuild the network described by `cfg` and load the saved weights into it.
    pub fn load_model<B: Backend>(
        &self,
        cfg:    &EvaluationModelConfig,
        device: &B::Device,
    ) -> Result<EvaluationModel<B>> {
        let record = ModelRecorder::new()
            .load(self.stem.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Has the model been trained with this architecture?",
                    self.model_path().display()
                )
            })?;

        Ok(cfg.init::<B>(device).load_record(record))
    }

    pub fn save_config(&self, cfg: &EvaluationModelConfig) -> Result<()> {
        write_json(&self.config_path(), cfg)
    }

    pub fn load_config(&self) -> Result<EvaluationModelConfig> {
        read_json(&self.config_path())
    }

    /// Record the hyperparameters of the run next to the weights.
    pub fn save_train_config(&self, cfg: &TrainConfig) -> Result<()> {
        write_json(&self.train_config_path(), cfg)
    }

    fn with_suffix(&self, suffix: &str) -> PathBuf {
        let mut s = self.stem.clone().into_os_string();
        s.push(suffix);
        PathBuf::from(s)
    }

    fn ensure_parent(&self) -> Result<()> {
        match self.stem.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create directory '{}'", dir.display())),
            _ => Ok(()),
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Cannot write '{}'", path.display()))?;
    tracing::debug!("Wrote '{}'", path.display());
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = fs::read_to_string(path).with_context(|| {
        format!("Cannot read '{}'. Make sure you have run 'train' first.", path.display())
    })?;
    serde_json::from_str(&json).with_context(|| format!("'{}' is not valid JSON", path.display()))
}
