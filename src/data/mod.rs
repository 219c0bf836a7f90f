// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// Everything from IDX files on disk to tensor batches.
//
//   IDX files
//       │
//       ▼
//   idx / FashionMnistLoader → bytes to RawImage samples
//       │
//       ▼
//   FashionMnistDataset      → implements Burn's Dataset trait
//       │
//       ▼
//   ImageTransform           → Mapper applied lazily per item
//       │
//       ▼
//   ClassificationBatcher    → stacks items into tensors
//       │
//       ▼
//   DataLoader               → feeds batches to the training loop
//
// Each module owns one step, so each step is tested on its own.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Parses the IDX binary format
pub mod idx;

/// Reads the Fashion-MNIST IDX files from a directory
pub mod loader;

/// Implements Burn's Dataset trait for raw images
pub mod dataset;

/// ToTensor / Normalize / OneHot transforms
pub mod transform;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
