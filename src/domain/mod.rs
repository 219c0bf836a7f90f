// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain Rust types and traits describing what the system works
// with: grayscale clothing images, their ten class labels, and
// the abstractions other layers implement.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain structs, enums and traits
//
// Keeping this layer free of Burn means the label table and the
// image type can be unit tested without building a backend.
//
// Reference: Rust Book §5 (Structs), §6 (Enums), §10 (Traits)

// The ten Fashion-MNIST categories
pub mod fashion_class;

// A single 28x28 grayscale image with its label
pub mod image;

// Core abstractions (traits) that other layers implement
pub mod traits;
