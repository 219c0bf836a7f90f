// ============================================================
// Layer 2 - TrainUseCase
// ============================================================
// Orchestrates the training pipeline in order:
//
//   Step 1: Validate hyperparameters
//   Step 2: Load train + test splits   (Layer 4 - data)
//   Step 3: Attach the image transform (Layer 4 - data)
//   Step 4: Save config                (Layer 6 - infra)
//   Step 5: Run training loop          (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::{ensure, Result};
use burn::data::dataset::transform::MapperDataset;
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::FashionMnistDataset,
    loader::FashionMnistLoader,
    transform::ImageTransform,
};
use crate::domain::traits::Split;
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::model::ClassifierConfig;
use crate::ml::trainer::run_training;

/// Which optimiser updates the parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    /// Plain stochastic gradient descent
    #[default]
    Sgd,
    Adam,
}

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run. Serialised next to the
// checkpoints so inference can rebuild the same model and apply
// the same transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir:     String,
    pub artifact_dir: String,
    pub batch_size:   usize,
    pub epochs:       usize,
    pub lr:           f64,
    pub hidden_size:  usize,
    pub optimizer:    OptimizerKind,
    pub seed:         u64,
    /// Normalize pixels with the dataset mean/std after ToTensor
    pub normalize:    bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:     "data".to_string(),
            artifact_dir: "artifacts".to_string(),
            batch_size:   64,
            epochs:       5,
            lr:           1e-3,
            hidden_size:  512,
            optimizer:    OptimizerKind::Sgd,
            seed:         42,
            normalize:    false,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.batch_size > 0, "batch_size must be at least 1");
        ensure!(self.epochs > 0, "epochs must be at least 1");
        ensure!(self.lr > 0.0 && self.lr.is_finite(), "lr must be a positive number, got {}", self.lr);
        ensure!(self.hidden_size > 0, "hidden_size must be at least 1");
        Ok(())
    }

    pub fn model_config(&self) -> ClassifierConfig {
        ClassifierConfig::fashion_mnist(self.hidden_size)
    }

    /// The transform used for both training and inference
    pub fn image_transform(&self) -> ImageTransform {
        ImageTransform::with_normalization(self.normalize)
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Run the full pipeline and return the per-epoch metrics.
    pub fn execute(&self) -> Result<Vec<EpochMetrics>> {
        let cfg = &self.config;
        cfg.validate()?;

        // ── Step 2: Load both splits ──────────────────────────────────────────
        tracing::info!("Loading Fashion-MNIST from '{}'", cfg.data_dir);
        let loader = FashionMnistLoader::new(&cfg.data_dir);
        let train_raw = FashionMnistDataset::load(&loader, Split::Train)?;
        let test_raw  = FashionMnistDataset::load(&loader, Split::Test)?;

        // ── Step 3: Transforms run lazily as the loader pulls items ───────────
        let transform = cfg.image_transform();
        let train_dataset = MapperDataset::new(train_raw, transform);
        let test_dataset  = MapperDataset::new(test_raw, transform);

        // ── Step 4: Save config for inference ─────────────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.artifact_dir)?;
        ckpt_manager.save_config(cfg)?;
        let metrics = MetricsLogger::new(&cfg.artifact_dir)?;

        // ── Step 5: Training loop (Layer 5) ───────────────────────────────────
        let history = run_training(cfg, train_dataset, test_dataset, &ckpt_manager, &metrics)?;
        tracing::info!("Metrics written to '{}'", metrics.csv_path().display());

        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(TrainConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_hyperparameters() {
        let zero_batch = TrainConfig { batch_size: 0, ..TrainConfig::default() };
        assert!(zero_batch.validate().is_err());

        let negative_lr = TrainConfig { lr: -0.1, ..TrainConfig::default() };
        assert!(negative_lr.validate().is_err());

        let no_epochs = TrainConfig { epochs: 0, ..TrainConfig::default() };
        assert!(no_epochs.validate().is_err());
    }

    #[test]
    fn test_optimizer_serialises_lowercase() {
        let json = serde_json::to_string(&OptimizerKind::Adam).unwrap();
        assert_eq!(json, "\"adam\"");
    }

    #[test]
    fn test_missing_data_fails_before_training() {
        let cfg = TrainConfig {
            data_dir: std::env::temp_dir()
                .join(format!("fmq-no-data-{}", std::process::id()))
                .to_string_lossy()
                .into_owned(),
            ..TrainConfig::default()
        };
        assert!(TrainUseCase::new(cfg).execute().is_err());
    }
}
