// ============================================================
// Layer 2 - PredictUseCase
// ============================================================
// Loads a trained checkpoint and classifies one test image:
//
//   Step 1: Read train_config.json   (which transform, which shape)
//   Step 2: Rebuild + load the model (Layer 5 - ml)
//   Step 3: Load the test split      (Layer 4 - data)
//   Step 4: Transform + classify the requested image

use anyhow::{bail, Context, Result};

use crate::application::train_use_case::TrainConfig;
use crate::data::loader::FashionMnistLoader;
use crate::domain::fashion_class::FashionClass;
use crate::domain::image::RawImage;
use crate::domain::traits::{ImageClassifier, ImageSource, Split};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::inferencer::Inferencer;

/// What the model said about one test image.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionReport {
    pub index:      usize,
    pub predicted:  FashionClass,
    pub actual:     FashionClass,
    pub confidence: f32,
}

impl PredictionReport {
    pub fn is_correct(&self) -> bool {
        self.predicted == self.actual
    }
}

pub struct PredictUseCase {
    config:     TrainConfig,
    classifier: Box<dyn ImageClassifier>,
    test_split: Vec<RawImage>,
}

impl PredictUseCase {
    /// `data_dir` overrides the directory recorded at training time.
    pub fn new(artifact_dir: &str, data_dir: Option<String>) -> Result<Self> {
        let ckpt_manager = CheckpointManager::open(artifact_dir);
        let config = ckpt_manager.load_config()?;
        let classifier = Inferencer::from_checkpoint(&ckpt_manager)?;

        let data_dir = data_dir.unwrap_or_else(|| config.data_dir.clone());
        let test_split = FashionMnistLoader::new(&data_dir).load_split(Split::Test)?;

        Ok(Self::from_parts(config, Box::new(classifier), test_split))
    }

    pub fn from_parts(
        config:     TrainConfig,
        classifier: Box<dyn ImageClassifier>,
        test_split: Vec<RawImage>,
    ) -> Self {
        Self { config, classifier, test_split }
    }

    pub fn predict(&self, index: usize) -> Result<PredictionReport> {
        let Some(image) = self.test_split.get(index) else {
            bail!(
                "Index {index} is out of range: the test split has {} images",
                self.test_split.len()
            );
        };
        let actual = image
            .class()
            .with_context(|| format!("Image {index} has invalid label {}", image.label))?;

        let pixels = self.config.image_transform().pixels(&image.pixels);
        let prediction = self.classifier.classify(&pixels)?;

        Ok(PredictionReport {
            index,
            predicted:  prediction.class,
            actual,
            confidence: prediction.confidence(),
        })
    }
}
