use anyhow::Result;
use burn::data::dataset::Dataset;

use crate::domain::image::RawImage;
use crate::domain::traits::{ImageSource, Split};

/// In-memory Fashion-MNIST split, exposed through Burn's Dataset trait.
pub struct FashionMnistDataset {
    items: Vec<RawImage>,
}

impl FashionMnistDataset {
    pub fn from_items(items: Vec<RawImage>) -> Self {
        Self { items }
    }

    pub fn load(source: &impl ImageSource, split: Split) -> Result<Self> {
        Ok(Self::from_items(source.load_split(split)?))
    }
}

impl Dataset<RawImage> for FashionMnistDataset {
    fn get(&self, index: usize) -> Option<RawImage> {
        self.items.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}
