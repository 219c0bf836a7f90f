// ============================================================
// Layer 3 - RawImage Domain Type
// ============================================================
// One untransformed dataset sample: 28x28 grayscale pixels
// stored row-major as bytes (0 = background, 255 = ink) plus
// the integer class label.
//
// Transforms (Layer 4) turn this into float features; the
// domain type itself never changes representation.

use serde::{Deserialize, Serialize};

use crate::domain::fashion_class::FashionClass;

pub const IMAGE_HEIGHT: usize = 28;
pub const IMAGE_WIDTH: usize = 28;
pub const IMAGE_SIZE: usize = IMAGE_HEIGHT * IMAGE_WIDTH;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawImage {
    /// Row-major pixel intensities, always IMAGE_SIZE long
    pub pixels: Vec<u8>,
    pub label: u8,
}

impl RawImage {
    pub fn new(pixels: Vec<u8>, label: u8) -> Self {
        Self { pixels, label }
    }

    /// The class this image is labelled as, if the label is valid.
    pub fn class(&self) -> Option<FashionClass> {
        FashionClass::from_index(self.label as usize)
    }
}
