// ============================================================
// Layer 6 - Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch, so
// learning curves can be plotted after the run.
//
// Metrics recorded per epoch:
//   - epoch:      the epoch number (1, 2, 3, ...)
//   - train_loss: average cross-entropy over training batches
//   - test_loss:  average cross-entropy over test batches
//   - accuracy:   fraction of test images classified correctly
//
// Output file: <artifact_dir>/metrics.csv, rewritten at the start
// of every training run so it only ever holds the latest run.
//
//   epoch,train_loss,test_loss,accuracy
//   1,2.154310,2.141002,0.412300
//   2,1.902871,1.880145,0.561900
//
// Reading the curve: train_loss should trend down; test_loss
// rising while train_loss falls means overfitting.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

const HEADER: &str = "epoch,train_loss,test_loss,accuracy";

/// One row of metrics for a single epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// Starts at 1
    pub epoch: usize,

    pub train_loss: f64,

    pub test_loss: f64,

    /// Range [0.0, 1.0]
    pub accuracy: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, test_loss: f64, accuracy: f64) -> Self {
        Self { epoch, train_loss, test_loss, accuracy }
    }

    /// True if this epoch beat the best test loss seen so far
    pub fn is_improvement(&self, best_test_loss: f64) -> bool {
        self.test_loss < best_test_loss
    }

    fn to_csv_row(&self) -> String {
        format!(
            "{},{:.6},{:.6},{:.6}",
            self.epoch, self.train_loss, self.test_loss, self.accuracy
        )
    }
}

/// Writes one CSV row per epoch of the current run.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Starts a fresh log: any metrics.csv left by an earlier run in
    /// the same directory is truncated to just the header.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        let mut f = fs::File::create(&csv_path)
            .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
        writeln!(f, "{HEADER}")?;
        tracing::debug!("Started metrics CSV: '{}'", csv_path.display());

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(f, "{}", m.to_csv_row())?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, test_loss={:.4}, accuracy={:.4}",
            m.epoch,
            m.train_loss,
            m.test_loss,
            m.accuracy,
        );

        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}
