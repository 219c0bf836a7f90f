// ============================================================
// Layer 2 - InspectUseCase
// ============================================================
// Builds the classifier (fresh, or from a checkpoint when one is
// given) and reports the layer-by-layer activations of a random
// minibatch together with every parameter tensor.

use anyhow::{ensure, Result};

use crate::infra::checkpoint::CheckpointManager;
use crate::ml::backend::{ComputeBackend, ComputeDevice};
use crate::ml::inspect::{inspect_layers, Inspection};
use crate::ml::model::{Classifier, ClassifierConfig, ParameterInfo};

pub struct InspectReport {
    pub inspection: Inspection,
    pub parameters: Vec<ParameterInfo>,
    pub num_params: usize,
}

pub struct InspectUseCase {
    hidden_size:  usize,
    batch_size:   usize,
    artifact_dir: Option<String>,
}

impl InspectUseCase {
    pub fn new(hidden_size: usize, batch_size: usize, artifact_dir: Option<String>) -> Self {
        Self { hidden_size, batch_size, artifact_dir }
    }

    pub fn execute(&self) -> Result<InspectReport> {
        ensure!(self.batch_size > 0, "batch_size must be at least 1");

        let device = ComputeDevice::default();
        let model = self.build_model(&device)?;

        let inspection = inspect_layers(&model, self.batch_size, &device)?;
        Ok(InspectReport {
            inspection,
            parameters: model.parameter_summary()?,
            num_params: burn::module::Module::num_params(&model),
        })
    }

    fn build_model(&self, device: &ComputeDevice) -> Result<Classifier<ComputeBackend>> {
        match &self.artifact_dir {
            Some(dir) => {
                let ckpt_manager = CheckpointManager::open(dir);
                let cfg = ckpt_manager.load_config()?;
                let model = cfg.model_config().init(device);
                ckpt_manager.load_model(model, device)
            }
            None => {
                ensure!(self.hidden_size > 0, "hidden_size must be at least 1");
                tracing::info!("Inspecting an untrained model (hidden_size={})", self.hidden_size);
                Ok(ClassifierConfig::fashion_mnist(self.hidden_size).init(device))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untrained_model_report() {
        let report = InspectUseCase::new(20, 3, None).execute().unwrap();

        assert_eq!(report.inspection.predicted.len(), 3);
        assert_eq!(report.parameters.len(), 6);
        // 784*20+20 + 20*20+20 + 20*10+10
        assert_eq!(report.num_params, 16_330);
    }

    #[test]
    fn test_zero_batch_is_rejected() {
        assert!(InspectUseCase::new(20, 0, None).execute().is_err());
    }
}
