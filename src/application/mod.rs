// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// One use case per workflow step. Each orchestrates the other
// layers and returns plain data for Layer 1 to print.
//
// Rules for this layer:
//   - No model math here (that's Layer 5)
//   - No printing here (that's Layer 1)
//   - No direct file access (that's Layers 4 and 6)

// Training the classifier
pub mod train_use_case;

// Classifying a test image with a trained checkpoint
pub mod predict_use_case;

// Layer-by-layer walk-through of the model
pub mod inspect_use_case;

// Showing what the sample transforms do
pub mod transforms_use_case;
