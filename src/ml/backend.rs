// Compute backend selection. NdArray runs anywhere on the CPU;
// the `wgpu` feature switches every model in the crate to the GPU.

#[cfg(not(feature = "wgpu"))]
pub type ComputeBackend = burn::backend::NdArray;

#[cfg(feature = "wgpu")]
pub type ComputeBackend = burn::backend::Wgpu;

/// ComputeBackend with gradient tracking, used only while training.
pub type TrainBackend = burn::backend::Autodiff<ComputeBackend>;

pub type ComputeDevice = <ComputeBackend as burn::tensor::backend::Backend>::Device;
