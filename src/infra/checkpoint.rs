// ============================================================
// Layer 6 - Checkpoint Manager
// ============================================================
// Saves and restores the classifier's learned parameters (its
// "state dictionary") using Burn's CompactRecorder.
//
// What gets saved:
//   1. Model record (.mpk.gz file), every weight and bias
//   2. latest_epoch.json, which epoch was saved last
//   3. train_config.json, hyperparameters incl. the model shape
//
// The config is saved separately because the record only holds
// tensors: to load it, the inferencer first rebuilds a module of
// the same shape from the config, then loads the record into it.
//
// CompactRecorder:
//   - Named MessagePack, gzip compressed, half precision
//   - load_record() takes tensors as stored, whatever their shape,
//     so load_model() compares every parameter shape against the
//     module it was given and refuses a mismatch
//
// File naming convention:
//   artifacts/
//     model_epoch_1.mpk.gz   ← parameters after epoch 1
//     model_epoch_2.mpk.gz
//     ...
//     latest_epoch.json      ← number of the latest epoch
//     best_epoch.json        ← epoch with the lowest test loss
//     train_config.json      ← hyperparameters
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{bail, Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use std::{fs, path::PathBuf};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::Classifier;

/// Manages saving and loading of model checkpoints.
/// All files are stored in the configured directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a manager rooted at `dir`, creating the directory
    /// (like `mkdir -p`) if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create artifact directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Manager for an existing artifact directory; nothing is created.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn model_path(&self, epoch: usize) -> PathBuf {
        // The recorder appends its own extension
        self.dir.join(format!("model_epoch_{epoch}"))
    }

    /// Save the model record for a given epoch and move the
    /// latest-epoch pointer to it.
    pub fn save_model<B: Backend>(&self, model: &Classifier<B>, epoch: usize) -> Result<()> {
        let path = self.model_path(epoch);

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        let latest_path = self.dir.join("latest_epoch.json");
        fs::write(&latest_path, serde_json::to_string(&epoch)?)
            .with_context(|| format!("Failed to write '{}'", latest_path.display()))?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Load the latest saved record into `model`.
    ///
    /// `model` must already have the saved architecture; build it
    /// from `load_config()` first. A record whose parameter shapes
    /// differ from `model`'s is rejected.
    pub fn load_model<B: Backend>(
        &self,
        model:  Classifier<B>,
        device: &B::Device,
    ) -> Result<Classifier<B>> {
        let epoch = self.latest_epoch()?;
        let path  = self.model_path(epoch);

        tracing::info!("Loading checkpoint from epoch {}", epoch);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you trained the model first?", path.display())
            })?;

        let expected = model.parameter_shapes();
        let loaded = model.load_record(record);

        for ((name, want), (_, found)) in expected.iter().zip(loaded.parameter_shapes()) {
            if *want != found {
                bail!(
                    "Checkpoint '{}' does not match the configured model: \
                     '{}' has shape {:?}, expected {:?}. \
                     Retrain, or point to the artifact directory it was saved with.",
                    path.display(),
                    name,
                    found,
                    want,
                );
            }
        }

        Ok(loaded)
    }

    /// Record `epoch` as the one with the lowest test loss so far.
    pub fn save_best_epoch(&self, epoch: usize) -> Result<()> {
        let path = self.dir.join("best_epoch.json");
        fs::write(&path, serde_json::to_string(&epoch)?)
            .with_context(|| format!("Failed to write '{}'", path.display()))?;

        tracing::debug!("Best epoch is now {}", epoch);
        Ok(())
    }

    /// Forget the best epoch of an earlier run in this directory.
    pub fn clear_best_epoch(&self) -> Result<()> {
        let path = self.dir.join("best_epoch.json");
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Cannot remove stale '{}'", path.display()))?;
        }
        Ok(())
    }

    /// Epoch number recorded by `save_best_epoch`.
    pub fn best_epoch(&self) -> Result<usize> {
        let path = self.dir.join("best_epoch.json");

        let s = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read '{}'. Have you run 'train' first?", path.display()))?;

        Ok(serde_json::from_str::<usize>(&s)?)
    }

    /// Save the training configuration as pretty JSON.
    /// Called before training starts.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("train_config.json");
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// Load the configuration of the run that produced the checkpoints.
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join("train_config.json");

        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. Make sure you have run 'train' first.",
                path.display()
            )
        })?;

        serde_json::from_str(&json)
            .with_context(|| format!("Malformed config in '{}'", path.display()))
    }

    /// Epoch number of the most recent checkpoint.
    pub fn latest_epoch(&self) -> Result<usize> {
        let path = self.dir.join("latest_epoch.json");

        let s = fs::read_to_string(&path)
            .with_context(|| "Cannot find 'latest_epoch.json'. Have you run 'train' first?")?;

        Ok(serde_json::from_str::<usize>(&s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::ClassifierConfig;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fmq-ckpt-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_model_round_trip() {
        let dir = test_dir("model");
        let ckpt = CheckpointManager::new(&dir).unwrap();
        let device = Default::default();
        let config = ClassifierConfig::fashion_mnist(8);

        let saved: Classifier<TestBackend> = config.init(&device);
        ckpt.save_model(&saved, 3).unwrap();
        assert_eq!(ckpt.latest_epoch().unwrap(), 3);

        let fresh: Classifier<TestBackend> = config.init(&device);
        let loaded = ckpt.load_model(fresh, &device).unwrap();

        // Half precision storage: compare with a tolerance
        let input = Tensor::<TestBackend, 3>::ones([1, 28, 28], &device);
        let expected: Vec<f32> = saved.forward(input.clone()).into_data().to_vec().unwrap();
        let actual: Vec<f32> = loaded.forward(input).into_data().to_vec().unwrap();
        for (e, a) in expected.iter().zip(&actual) {
            assert!((e - a).abs() < 0.05, "expected {e}, got {a}");
        }

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_loading_into_a_different_width_fails() {
        let dir = test_dir("width");
        let ckpt = CheckpointManager::new(&dir).unwrap();
        let device = Default::default();

        let saved: Classifier<TestBackend> = ClassifierConfig::fashion_mnist(8).init(&device);
        ckpt.save_model(&saved, 1).unwrap();

        let wider: Classifier<TestBackend> = ClassifierConfig::fashion_mnist(16).init(&device);
        let err = ckpt.load_model(wider, &device).unwrap_err().to_string();
        assert!(err.contains("does not match"), "unexpected error: {err}");
        assert!(err.contains("linear1.weight"), "unexpected error: {err}");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_best_epoch_round_trip() {
        let dir = test_dir("best");
        let ckpt = CheckpointManager::new(&dir).unwrap();
        assert!(ckpt.best_epoch().is_err());

        ckpt.save_best_epoch(2).unwrap();
        assert_eq!(ckpt.best_epoch().unwrap(), 2);

        ckpt.clear_best_epoch().unwrap();
        assert!(ckpt.best_epoch().is_err());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_config_round_trip() {
        let dir = test_dir("config");
        let ckpt = CheckpointManager::new(&dir).unwrap();
        let cfg = TrainConfig { epochs: 7, hidden_size: 64, ..TrainConfig::default() };

        ckpt.save_config(&cfg).unwrap();
        let loaded = ckpt.load_config().unwrap();
        assert_eq!(loaded.epochs, 7);
        assert_eq!(loaded.hidden_size, 64);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let ckpt = CheckpointManager::open(test_dir("missing"));
        assert!(ckpt.latest_epoch().is_err());
        assert!(ckpt.load_config().is_err());
    }
}
