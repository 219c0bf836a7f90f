// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Cross-cutting concerns that touch the filesystem or network:
//
//   checkpoint.rs  Saving and loading model parameters with
//                  Burn's CompactRecorder, plus the TrainConfig
//                  JSON needed to rebuild the model for inference.
//
//   metrics.rs     Per-epoch loss/accuracy rows in a CSV file.
//
//   download.rs    Fetching the Fashion-MNIST IDX files
//                  (behind the `download` cargo feature).
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;

/// Dataset download
pub mod download;
