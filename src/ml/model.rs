use anyhow::{anyhow, Result};
use burn::{
    nn::{loss::CrossEntropyLossConfig, Linear, LinearConfig, Relu},
    prelude::*,
};

use crate::domain::fashion_class::NUM_CLASSES;
use crate::domain::image::IMAGE_SIZE;

#[derive(Config, Debug)]
pub struct ClassifierConfig {
    #[config(default = 784)]
    pub input_size: usize,
    #[config(default = 512)]
    pub hidden_size: usize,
    #[config(default = 10)]
    pub num_classes: usize,
}

impl ClassifierConfig {
    /// Default Fashion-MNIST shape with a custom hidden width.
    pub fn fashion_mnist(hidden_size: usize) -> Self {
        Self::new()
            .with_input_size(IMAGE_SIZE)
            .with_hidden_size(hidden_size)
            .with_num_classes(NUM_CLASSES)
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Classifier<B> {
        Classifier {
            linear1: LinearConfig::new(self.input_size, self.hidden_size).init(device),
            linear2: LinearConfig::new(self.hidden_size, self.hidden_size).init(device),
            linear3: LinearConfig::new(self.hidden_size, self.num_classes).init(device),
            activation: Relu::new(),
        }
    }
}

/// Flatten → Linear → ReLU → Linear → ReLU → Linear
#[derive(Module, Debug)]
pub struct Classifier<B: Backend> {
    pub linear1: Linear<B>,
    pub linear2: Linear<B>,
    pub linear3: Linear<B>,
    pub activation: Relu,
}

/// Name, shape and first values of one learned tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterInfo {
    pub name: String,
    pub shape: Vec<usize>,
    pub head: Vec<f32>,
}

impl<B: Backend> Classifier<B> {
    /// images: [batch, 28, 28] → logits: [batch, num_classes]
    pub fn forward(&self, images: Tensor<B, 3>) -> Tensor<B, 2> {
        let x = images.flatten::<2>(1, 2);
        let x = self.activation.forward(self.linear1.forward(x));
        let x = self.activation.forward(self.linear2.forward(x));
        self.linear3.forward(x)
    }

    pub fn forward_loss(
        &self,
        images:  Tensor<B, 3>,
        targets: Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(images);
        let loss = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), targets);
        (loss, logits)
    }

    /// Every weight and bias in forward order, with its first two values.
    pub fn parameter_summary(&self) -> Result<Vec<ParameterInfo>> {
        let mut params = Vec::new();
        for (name, linear) in self.linears() {
            params.push(parameter_info(format!("{name}.weight"), linear.weight.val())?);
            if let Some(bias) = &linear.bias {
                params.push(parameter_info(format!("{name}.bias"), bias.val())?);
            }
        }
        Ok(params)
    }

    /// Name and shape of every parameter, without reading any values.
    pub fn parameter_shapes(&self) -> Vec<(String, Vec<usize>)> {
        let mut shapes = Vec::new();
        for (name, linear) in self.linears() {
            shapes.push((format!("{name}.weight"), linear.weight.val().dims().to_vec()));
            if let Some(bias) = &linear.bias {
                shapes.push((format!("{name}.bias"), bias.val().dims().to_vec()));
            }
        }
        shapes
    }

    fn linears(&self) -> [(&'static str, &Linear<B>); 3] {
        [("linear1", &self.linear1), ("linear2", &self.linear2), ("linear3", &self.linear3)]
    }
}

fn parameter_info<B: Backend, const D: usize>(name: String, tensor: Tensor<B, D>) -> Result<ParameterInfo> {
    let shape = tensor.dims().to_vec();
    let values: Vec<f32> = tensor
        .into_data()
        .convert::<f32>()
        .to_vec()
        .map_err(|e| anyhow!("Cannot read parameter '{name}': {e:?}"))?;
    let head = values.into_iter().take(2).collect();
    Ok(ParameterInfo { name, shape, head })
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_forward_produces_one_logit_per_class() {
        let device = Default::default();
        let model: Classifier<TestBackend> = ClassifierConfig::fashion_mnist(32).init(&device);
        let images = Tensor::<TestBackend, 3>::zeros([4, 28, 28], &device);

        assert_eq!(model.forward(images).dims(), [4, NUM_CLASSES]);
    }

    #[test]
    fn test_forward_loss_is_scalar_and_finite() {
        let device = Default::default();
        let model: Classifier<TestBackend> = ClassifierConfig::fashion_mnist(16).init(&device);
        let images = Tensor::<TestBackend, 3>::ones([2, 28, 28], &device);
        let targets = Tensor::<TestBackend, 1, Int>::from_data(TensorData::new(vec![1i64, 7], [2]), &device);

        let (loss, logits) = model.forward_loss(images, targets);
        assert_eq!(logits.dims(), [2, NUM_CLASSES]);
        assert!(loss.into_scalar().elem::<f64>().is_finite());
    }

    #[test]
    fn test_parameter_summary_lists_weights_and_biases() {
        let device = Default::default();
        let model: Classifier<TestBackend> = ClassifierConfig::fashion_mnist(20).init(&device);
        let summary = model.parameter_summary().unwrap();

        let names: Vec<&str> = summary.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            ["linear1.weight", "linear1.bias", "linear2.weight", "linear2.bias", "linear3.weight", "linear3.bias"]
        );
        // Burn stores Linear weights as [d_input, d_output]
        assert_eq!(summary[0].shape, vec![IMAGE_SIZE, 20]);
        assert_eq!(summary[5].shape, vec![NUM_CLASSES]);
        assert!(summary.iter().all(|p| p.head.len() == 2));

        let total: usize = summary.iter().map(|p| p.shape.iter().product::<usize>()).sum();
        assert_eq!(total, model.num_params());
    }

    #[test]
    fn test_parameter_shapes_match_summary() {
        let device = Default::default();
        let model: Classifier<TestBackend> = ClassifierConfig::fashion_mnist(12).init(&device);
        let summary = model.parameter_summary().unwrap();
        let shapes = model.parameter_shapes();

        assert_eq!(shapes.len(), summary.len());
        for ((name, shape), info) in shapes.iter().zip(&summary) {
            assert_eq!(name, &info.name);
            assert_eq!(shape, &info.shape);
        }
        assert_eq!(shapes[2], ("linear2.weight".to_string(), vec![12, 12]));
    }
}
