// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// One subcommand per step of the workflow, with every
// hyperparameter exposed as a --flag.
//
// clap's derive macros generate --help text, errors for missing
// arguments and string → number conversion.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};

use crate::application::train_use_case::{OptimizerKind, TrainConfig};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download the Fashion-MNIST IDX files
    Download(DownloadArgs),

    /// Show what the sample transforms do to one training image
    Transforms(TransformsArgs),

    /// Train the classifier and save a checkpoint per epoch
    Train(TrainArgs),

    /// Classify one test image with a trained checkpoint
    Predict(PredictArgs),

    /// Print each layer's output for a random minibatch
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Directory to place the IDX files in
    #[arg(long, default_value = "data")]
    pub data_dir: String,
}

#[derive(Args, Debug)]
pub struct TransformsArgs {
    #[arg(long, default_value = "data")]
    pub data_dir: String,

    /// Which training image to show
    #[arg(long, default_value_t = 0)]
    pub index: usize,

    /// Also apply Normalize after ToTensor
    #[arg(long)]
    pub normalize: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OptimizerArg {
    Sgd,
    Adam,
}

impl From<OptimizerArg> for OptimizerKind {
    fn from(o: OptimizerArg) -> Self {
        match o {
            OptimizerArg::Sgd  => OptimizerKind::Sgd,
            OptimizerArg::Adam => OptimizerKind::Adam,
        }
    }
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory containing the Fashion-MNIST IDX files
    #[arg(long, default_value = "data")]
    pub data_dir: String,

    /// Directory to save checkpoints, config and metrics
    #[arg(long, default_value = "artifacts")]
    pub artifact_dir: String,

    /// Number of images per optimiser step
    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// Number of full passes through the training split
    #[arg(long, default_value_t = 5)]
    pub epochs: usize,

    /// Step size of each parameter update
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Width of the two hidden layers
    #[arg(long, default_value_t = 512)]
    pub hidden_size: usize,

    #[arg(long, value_enum, default_value_t = OptimizerArg::Sgd)]
    pub optimizer: OptimizerArg,

    /// Seed for shuffling the training batches
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Normalize pixels with the dataset mean/std after ToTensor
    #[arg(long)]
    pub normalize: bool,
}

/// Boundary between Layer 1 and Layer 2: the application layer
/// never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir:     a.data_dir,
            artifact_dir: a.artifact_dir,
            batch_size:   a.batch_size,
            epochs:       a.epochs,
            lr:           a.lr,
            hidden_size:  a.hidden_size,
            optimizer:    a.optimizer.into(),
            seed:         a.seed,
            normalize:    a.normalize,
        }
    }
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Directory where `train` saved its checkpoints
    #[arg(long, default_value = "artifacts")]
    pub artifact_dir: String,

    /// Override the data directory recorded at training time
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Which test image to classify
    #[arg(long, default_value_t = 0)]
    pub index: usize,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Number of random images in the minibatch
    #[arg(long, default_value_t = 3)]
    pub batch_size: usize,

    /// Hidden width of the untrained model
    #[arg(long, default_value_t = 512)]
    pub hidden_size: usize,

    /// Inspect a trained checkpoint instead of a fresh model
    #[arg(long)]
    pub artifact_dir: Option<String>,
}
