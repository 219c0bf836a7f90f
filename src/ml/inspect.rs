// ============================================================
// Layer 5 - Layer Inspection
// ============================================================
// Walks a random minibatch through the classifier one layer at
// a time and records what each stage produces:
//
//   input    [N, 28, 28]   uniform noise in [0, 1)
//   flatten  [N, 784]
//   linear1  [N, hidden]   ── relu1
//   linear2  [N, hidden]   ── relu2
//   logits   [N, 10]
//   softmax  [N, 10]       each row sums to 1
//
// Nothing here trains; it exists to show the shapes flowing
// through the network and what ReLU does to negative values.

use anyhow::{anyhow, Result};
use burn::{
    prelude::*,
    tensor::{activation::softmax, Distribution},
};

use crate::domain::fashion_class::FashionClass;
use crate::domain::image::{IMAGE_HEIGHT, IMAGE_WIDTH};
use crate::ml::model::Classifier;

/// How many values of the first sample to keep per stage
const PREVIEW_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct LayerReport {
    pub name:    &'static str,
    pub shape:   Vec<usize>,
    /// First values of sample 0 at this stage
    pub preview: Vec<f32>,
    /// Fraction of exact zeros in the whole activation
    pub zero_fraction: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    pub layers:    Vec<LayerReport>,
    pub predicted: Vec<FashionClass>,
}

pub fn inspect_layers<B: Backend>(
    model:      &Classifier<B>,
    batch_size: usize,
    device:     &B::Device,
) -> Result<Inspection> {
    let input = Tensor::<B, 3>::random(
        [batch_size, IMAGE_HEIGHT, IMAGE_WIDTH],
        Distribution::Uniform(0.0, 1.0),
        device,
    );

    let mut layers = vec![report("input", input.clone())?];

    let flat = input.flatten::<2>(1, 2);
    layers.push(report("flatten", flat.clone())?);

    let hidden1 = model.linear1.forward(flat);
    layers.push(report("linear1", hidden1.clone())?);
    let hidden1 = model.activation.forward(hidden1);
    layers.push(report("relu1", hidden1.clone())?);

    let hidden2 = model.linear2.forward(hidden1);
    layers.push(report("linear2", hidden2.clone())?);
    let hidden2 = model.activation.forward(hidden2);
    layers.push(report("relu2", hidden2.clone())?);

    let logits = model.linear3.forward(hidden2);
    layers.push(report("logits", logits.clone())?);

    let probabilities = softmax(logits, 1);
    layers.push(report("softmax", probabilities.clone())?);

    let predicted = probabilities
        .argmax(1)
        .into_data()
        .convert::<i64>()
        .to_vec::<i64>()
        .map_err(|e| anyhow!("Cannot read predictions: {e:?}"))?
        .into_iter()
        .map(|i| {
            FashionClass::from_index(i as usize).ok_or_else(|| anyhow!("Unknown class index {i}"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Inspection { layers, predicted })
}

fn report<B: Backend, const D: usize>(name: &'static str, tensor: Tensor<B, D>) -> Result<LayerReport> {
    let shape = tensor.dims().to_vec();
    let values: Vec<f32> = tensor
        .into_data()
        .convert::<f32>()
        .to_vec()
        .map_err(|e| anyhow!("Cannot read activations of '{name}': {e:?}"))?;

    let zeros = values.iter().filter(|&&v| v == 0.0).count();
    let zero_fraction = if values.is_empty() { 0.0 } else { zeros as f32 / values.len() as f32 };
    let preview = values.into_iter().take(PREVIEW_LEN).collect();

    Ok(LayerReport { name, shape, preview, zero_fraction })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fashion_class::NUM_CLASSES;
    use crate::ml::model::ClassifierConfig;
    use burn::backend::NdArray;

    #[test]
    fn test_layer_shapes() {
        let device = Default::default();
        let model: Classifier<NdArray> = ClassifierConfig::fashion_mnist(20).init(&device);
        let inspection = inspect_layers(&model, 3, &device).unwrap();

        let shapes: Vec<(&str, Vec<usize>)> = inspection
            .layers
            .iter()
            .map(|l| (l.name, l.shape.clone()))
            .collect();
        assert_eq!(
            shapes,
            vec![
                ("input", vec![3, 28, 28]),
                ("flatten", vec![3, 784]),
                ("linear1", vec![3, 20]),
                ("relu1", vec![3, 20]),
                ("linear2", vec![3, 20]),
                ("relu2", vec![3, 20]),
                ("logits", vec![3, NUM_CLASSES]),
                ("softmax", vec![3, NUM_CLASSES]),
            ]
        );
        assert_eq!(inspection.predicted.len(), 3);
    }

    #[test]
    fn test_relu_output_is_non_negative() {
        let device = Default::default();
        let model: Classifier<NdArray> = ClassifierConfig::fashion_mnist(20).init(&device);
        let inspection = inspect_layers(&model, 2, &device).unwrap();

        let relu = inspection.layers.iter().find(|l| l.name == "relu1").unwrap();
        assert!(relu.preview.iter().all(|&v| v >= 0.0));
    }
}
