// ============================================================
// Layer 3 - FashionClass Domain Type
// ============================================================
// The ten article-of-clothing categories of Fashion-MNIST.
// The discriminant of each variant IS the integer label stored
// in the dataset files, so the order below must never change.
//
//   0 T-shirt/top   5 Sandal
//   1 Trouser       6 Shirt
//   2 Pullover      7 Sneaker
//   3 Dress         8 Bag
//   4 Coat          9 Ankle boot
//
// Reference: Rust Book §6 (Enums and Pattern Matching)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of output classes the classifier predicts.
pub const NUM_CLASSES: usize = 10;

/// One Fashion-MNIST category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FashionClass {
    TShirt = 0,
    Trouser = 1,
    Pullover = 2,
    Dress = 3,
    Coat = 4,
    Sandal = 5,
    Shirt = 6,
    Sneaker = 7,
    Bag = 8,
    AnkleBoot = 9,
}

impl FashionClass {
    /// Every class in label order, so `ALL[i].index() == i`.
    pub const ALL: [FashionClass; NUM_CLASSES] = [
        FashionClass::TShirt,
        FashionClass::Trouser,
        FashionClass::Pullover,
        FashionClass::Dress,
        FashionClass::Coat,
        FashionClass::Sandal,
        FashionClass::Shirt,
        FashionClass::Sneaker,
        FashionClass::Bag,
        FashionClass::AnkleBoot,
    ];

    /// Map a raw dataset label (or a model argmax) back to a class.
    /// Returns None for anything outside 0..10.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The integer label used in the dataset files
    pub fn index(self) -> usize {
        self as usize
    }

    /// Human readable name, as printed in predictions
    pub fn name(self) -> &'static str {
        match self {
            FashionClass::TShirt => "T-shirt/top",
            FashionClass::Trouser => "Trouser",
            FashionClass::Pullover => "Pullover",
            FashionClass::Dress => "Dress",
            FashionClass::Coat => "Coat",
            FashionClass::Sandal => "Sandal",
            FashionClass::Shirt => "Shirt",
            FashionClass::Sneaker => "Sneaker",
            FashionClass::Bag => "Bag",
            FashionClass::AnkleBoot => "Ankle boot",
        }
    }
}

impl fmt::Display for FashionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
