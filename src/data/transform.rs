// ============================================================
// Layer 4 - Sample Transforms
// ============================================================
// Raw samples are bytes and integer labels; the model wants
// floats. Transforms bridge the two and are applied lazily, each
// time the data loader asks the dataset for an item.
//
//   ToTensor    u8 pixel  → f32 in [0, 1]       (x / 255)
//   Normalize   f32 pixel → (x - mean) / std
//   OneHot      label k   → [0, .., 1 at k, .., 0]
//   Compose     A then B
//
// ImageTransform bundles the image side (ToTensor, optionally
// Normalize) and implements Burn's Mapper trait, so wrapping a
// dataset is just `MapperDataset::new(dataset, transform)`.
//
// The loss consumes integer class indices directly, so OneHot is
// a target transform offered for inspection, not for training.
//
// Reference: Burn Book §4 (Datasets: MapperDataset)

use anyhow::{bail, ensure, Result};
use burn::data::dataset::transform::Mapper;
use serde::{Deserialize, Serialize};

use crate::domain::image::RawImage;

// Fashion-MNIST training-set pixel statistics after ToTensor
pub const FASHION_MEAN: f32 = 0.2860;
pub const FASHION_STD: f32 = 0.3530;

/// Any per-sample transformation.
pub trait Transform<I: ?Sized> {
    type Output;

    fn apply(&self, input: &I) -> Self::Output;
}

// ─── ToTensor ─────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, Default)]
pub struct ToTensor;

impl Transform<[u8]> for ToTensor {
    type Output = Vec<f32>;

    fn apply(&self, input: &[u8]) -> Vec<f32> {
        input.iter().map(|&p| p as f32 / 255.0).collect()
    }
}

// ─── Normalize ────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normalize {
    pub mean: f32,
    pub std: f32,
}

impl Normalize {
    pub fn new(mean: f32, std: f32) -> Result<Self> {
        ensure!(std > 0.0, "Normalize std must be positive, got {std}");
        Ok(Self { mean, std })
    }

    /// Statistics of the Fashion-MNIST training split
    pub fn fashion_mnist() -> Self {
        Self { mean: FASHION_MEAN, std: FASHION_STD }
    }
}

impl Transform<[f32]> for Normalize {
    type Output = Vec<f32>;

    fn apply(&self, input: &[f32]) -> Vec<f32> {
        input.iter().map(|&x| (x - self.mean) / self.std).collect()
    }
}

// ─── OneHot ───────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy)]
pub struct OneHot {
    pub num_classes: usize,
}

impl OneHot {
    pub fn new(num_classes: usize) -> Self {
        Self { num_classes }
    }

    /// Fallible form of `apply` for labels that come from outside the dataset.
    pub fn encode(&self, label: usize) -> Result<Vec<f32>> {
        if label >= self.num_classes {
            bail!("Label {label} out of range for {} classes", self.num_classes);
        }
        Ok(self.apply(&label))
    }
}

impl Transform<usize> for OneHot {
    type Output = Vec<f32>;

    /// Out-of-range labels produce an all-zero vector.
    fn apply(&self, input: &usize) -> Vec<f32> {
        let mut target = vec![0.0; self.num_classes];
        if let Some(slot) = target.get_mut(*input) {
            *slot = 1.0;
        }
        target
    }
}

// ─── Compose ──────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy)]
pub struct Compose<A, B> {
    first: A,
    second: B,
}

impl<A, B> Compose<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<I, A, B> Transform<I> for Compose<A, B>
where
    I: ?Sized,
    A: Transform<I, Output = Vec<f32>>,
    B: Transform<[f32], Output = Vec<f32>>,
{
    type Output = Vec<f32>;

    fn apply(&self, input: &I) -> Vec<f32> {
        self.second.apply(self.first.apply(input).as_slice())
    }
}

// ─── ClassificationItem ───────────────────────────────────────────────────────
/// A transformed sample: float features plus the class index.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationItem {
    pub pixels: Vec<f32>,
    pub label: usize,
}

// ─── ImageTransform ───────────────────────────────────────────────────────────
/// The image pipeline used for training and inference.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageTransform {
    normalize: Option<Normalize>,
}

impl ImageTransform {
    /// ToTensor only
    pub fn new() -> Self {
        Self { normalize: None }
    }

    /// ToTensor then Normalize
    pub fn normalized(normalize: Normalize) -> Self {
        Self { normalize: Some(normalize) }
    }

    /// ToTensor, plus Fashion-MNIST Normalize when `normalize` is set
    pub fn with_normalization(normalize: bool) -> Self {
        if normalize {
            Self::normalized(Normalize::fashion_mnist())
        } else {
            Self::new()
        }
    }

    pub fn pixels(&self, raw: &[u8]) -> Vec<f32> {
        match self.normalize {
            Some(norm) => Compose::new(ToTensor, norm).apply(raw),
            None => ToTensor.apply(raw),
        }
    }
}

impl Mapper<RawImage, ClassificationItem> for ImageTransform {
    fn map(&self, item: &RawImage) -> ClassificationItem {
        ClassificationItem {
            pixels: self.pixels(&item.pixels),
            label: item.label as usize,
        }
    }
}
