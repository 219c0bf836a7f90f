// ============================================================
// Layer 5 - ML / Model Layer (Burn)
// ============================================================
// All model code lives here:
//
//   backend.rs    Which Burn backend the crate computes on
//
//   model.rs      The feed-forward classifier
//                 Flatten → Linear → ReLU → Linear → ReLU → Linear
//
//   trainer.rs    Train/test loop: forward pass, cross-entropy,
//                 backward pass, optimiser step, checkpoint per epoch
//
//   inferencer.rs Loads a checkpoint and classifies single images
//
//   inspect.rs    Layer-by-layer walk-through on a random batch
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Compute backend aliases
pub mod backend;

/// Feed-forward classifier architecture
pub mod model;

/// Training loop with per-epoch evaluation and checkpointing
pub mod trainer;

/// Inference engine: loads a checkpoint and predicts classes
pub mod inferencer;

/// Layer output inspection
pub mod inspect;
