// ============================================================
// Layer 2 - TransformsUseCase
// ============================================================
// Shows what the transforms do to one training sample: pixel
// range before/after ToTensor (and Normalize when enabled), and
// the one-hot target built from the integer label.

use anyhow::{Context, Result};

use crate::data::loader::FashionMnistLoader;
use crate::data::transform::{ImageTransform, OneHot};
use crate::domain::fashion_class::{FashionClass, NUM_CLASSES};
use crate::domain::image::RawImage;
use crate::domain::traits::{ImageSource, Split};

#[derive(Debug, Clone, PartialEq)]
pub struct PixelStats {
    pub min:  f32,
    pub max:  f32,
    pub mean: f32,
}

impl PixelStats {
    fn of(values: &[f32]) -> Self {
        let min = values.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = values.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let mean = values.iter().sum::<f32>() / values.len().max(1) as f32;
        Self { min, max, mean }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformReport {
    pub index:  usize,
    pub class:  FashionClass,
    pub raw:    PixelStats,
    pub tensor: PixelStats,
    pub one_hot: Vec<f32>,
}

pub struct TransformsUseCase {
    data_dir:  String,
    normalize: bool,
}

impl TransformsUseCase {
    pub fn new(data_dir: impl Into<String>, normalize: bool) -> Self {
        Self { data_dir: data_dir.into(), normalize }
    }

    pub fn execute(&self, index: usize) -> Result<TransformReport> {
        let samples = FashionMnistLoader::new(&self.data_dir).load_split(Split::Train)?;
        let image = samples.get(index).with_context(|| {
            format!("Index {index} is out of range: the training split has {} images", samples.len())
        })?;
        self.describe(index, image)
    }

    pub fn describe(&self, index: usize, image: &RawImage) -> Result<TransformReport> {
        let transform = ImageTransform::with_normalization(self.normalize);

        let raw: Vec<f32> = image.pixels.iter().map(|&p| p as f32).collect();
        let tensor = transform.pixels(&image.pixels);
        let class = image
            .class()
            .with_context(|| format!("Image {index} has invalid label {}", image.label))?;
        let one_hot = OneHot::new(NUM_CLASSES).encode(class.index())?;

        Ok(TransformReport {
            index,
            class,
            raw: PixelStats::of(&raw),
            tensor: PixelStats::of(&tensor),
            one_hot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::image::IMAGE_SIZE;

    fn sample() -> RawImage {
        let mut pixels = vec![0u8; IMAGE_SIZE];
        pixels[0] = 255;
        RawImage::new(pixels, 3)
    }

    #[test]
    fn test_to_tensor_report() {
        let report = TransformsUseCase::new("unused", false).describe(0, &sample()).unwrap();

        assert_eq!(report.class, FashionClass::Dress);
        assert_eq!(report.raw.max, 255.0);
        assert_eq!(report.tensor.max, 1.0);
        assert_eq!(report.tensor.min, 0.0);
        assert_eq!(report.one_hot[3], 1.0);
    }

    #[test]
    fn test_normalized_report_shifts_background_below_zero() {
        let report = TransformsUseCase::new("unused", true).describe(0, &sample()).unwrap();
        assert!(report.tensor.min < 0.0);
    }

    #[test]
    fn test_invalid_label_is_reported() {
        let image = RawImage::new(vec![0; IMAGE_SIZE], 12);
        assert!(TransformsUseCase::new("unused", false).describe(5, &image).is_err());
    }
}
