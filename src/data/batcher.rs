// ============================================================
// Layer 4 - Classification Batcher
// ============================================================
// Implements Burn's Batcher trait to stack transformed samples
// into tensors the model can consume in one forward pass.
//
//   Input:  Vec of N ClassificationItems, 784 floats each
//   Output: images  [N, 28, 28]  (float)
//           targets [N]          (int class index)
//
// The images stay 3-D here; flattening to [N, 784] is the
// model's first layer, exactly like a Flatten module.
//
// Reference: Burn Book §4 (Batcher)

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::transform::ClassificationItem;
use crate::domain::image::{IMAGE_HEIGHT, IMAGE_WIDTH};

/// A batch of images ready for the forward pass.
#[derive(Debug, Clone)]
pub struct ClassificationBatch<B: Backend> {
    /// shape: [batch_size, 28, 28]
    pub images: Tensor<B, 3>,

    /// shape: [batch_size], values in 0..10
    pub targets: Tensor<B, 1, Int>,
}

/// Holds the target device so tensors are created where the
/// model lives.
#[derive(Clone, Debug)]
pub struct ClassificationBatcher<B: Backend> {
    device: B::Device,
}

impl<B: Backend> ClassificationBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<ClassificationItem, ClassificationBatch<B>> for ClassificationBatcher<B> {
    fn batch(&self, items: Vec<ClassificationItem>) -> ClassificationBatch<B> {
        let batch_size = items.len();

        let pixels: Vec<f32> = items
            .iter()
            .flat_map(|item| item.pixels.iter().copied())
            .collect();
        let labels: Vec<i64> = items.iter().map(|item| item.label as i64).collect();

        let images = Tensor::<B, 3>::from_data(
            TensorData::new(pixels, [batch_size, IMAGE_HEIGHT, IMAGE_WIDTH]),
            &self.device,
        );
        let targets = Tensor::<B, 1, Int>::from_data(
            TensorData::new(labels, [batch_size]),
            &self.device,
        );

        ClassificationBatch { images, targets }
    }
}
