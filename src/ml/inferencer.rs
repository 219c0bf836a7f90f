// ============================================================
// Layer 5 - Inferencer
// ============================================================
use anyhow::{anyhow, ensure, Context, Result};
use burn::prelude::*;

use crate::domain::fashion_class::FashionClass;
use crate::domain::image::{IMAGE_HEIGHT, IMAGE_SIZE, IMAGE_WIDTH};
use crate::domain::traits::{ImageClassifier, Prediction};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::backend::{ComputeBackend, ComputeDevice};
use crate::ml::model::Classifier;

pub struct Inferencer<B: Backend = ComputeBackend> {
    model:  Classifier<B>,
    device: B::Device,
}

impl Inferencer<ComputeBackend> {
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager) -> Result<Self> {
        let device = ComputeDevice::default();
        let cfg    = ckpt_manager.load_config()?;
        let model: Classifier<ComputeBackend> = cfg.model_config().init(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Model loaded from checkpoint");
        Ok(Self::new(model, device))
    }
}

impl<B: Backend> Inferencer<B> {
    pub fn new(model: Classifier<B>, device: B::Device) -> Self {
        Self { model, device }
    }

    /// Classify one transformed image (IMAGE_SIZE floats).
    pub fn predict(&self, pixels: &[f32]) -> Result<Prediction> {
        ensure!(
            pixels.len() == IMAGE_SIZE,
            "Expected {IMAGE_SIZE} pixels, got {}",
            pixels.len()
        );

        let input = Tensor::<B, 3>::from_data(
            TensorData::new(pixels.to_vec(), [1, IMAGE_HEIGHT, IMAGE_WIDTH]),
            &self.device,
        );

        let logits = self.model.forward(input);
        let probabilities: Vec<f32> = burn::tensor::activation::softmax(logits, 1)
            .into_data()
            .convert::<f32>()
            .to_vec()
            .map_err(|e| anyhow!("Cannot read probabilities: {e:?}"))?;

        let best = probabilities
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .context("Model produced no logits")?;
        let class = FashionClass::from_index(best)
            .with_context(|| format!("Model predicted unknown class index {best}"))?;

        tracing::debug!("Predicted {} (p={:.4})", class, probabilities[best]);
        Ok(Prediction { class, probabilities })
    }
}

impl<B: Backend> ImageClassifier for Inferencer<B> {
    fn classify(&self, pixels: &[f32]) -> Result<Prediction> {
        self.predict(pixels)
    }
}
