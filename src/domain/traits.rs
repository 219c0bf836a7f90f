// ============================================================
// Layer 3 - Core Traits (Abstractions)
// ============================================================
// The application layer talks to these traits, not to the
// concrete IDX loader or the Burn inferencer. A different image
// store or a different model runtime only has to implement them.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::fashion_class::FashionClass;
use crate::domain::image::RawImage;

// ─── Split ────────────────────────────────────────────────────────────────────
/// Which half of the dataset to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    /// 60,000 images used to fit the parameters
    Train,
    /// 10,000 held-out images used for accuracy reporting
    Test,
}

// ─── ImageSource ──────────────────────────────────────────────────────────────
/// Any component that can load labelled images for a split.
///
/// Implementations:
///   - FashionMnistLoader → reads IDX files from a directory
pub trait ImageSource {
    fn load_split(&self, split: Split) -> Result<Vec<RawImage>>;
}

// ─── Prediction ───────────────────────────────────────────────────────────────
/// Result of classifying one image.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// The arg-max class
    pub class: FashionClass,

    /// Softmax probabilities, one per class in label order
    pub probabilities: Vec<f32>,
}

impl Prediction {
    /// Probability the model assigned to its own prediction
    pub fn confidence(&self) -> f32 {
        self.probabilities
            .get(self.class.index())
            .copied()
            .unwrap_or(0.0)
    }
}

// ─── ImageClassifier ──────────────────────────────────────────────────────────
/// Any component that maps transformed pixels to a class.
///
/// Implementations:
///   - Inferencer → runs the trained Burn model
pub trait ImageClassifier {
    /// `pixels` are already transformed (float, IMAGE_SIZE long).
    fn classify(&self, pixels: &[f32]) -> Result<Prediction>;
}
