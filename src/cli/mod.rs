// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// Parses arguments with clap, hands the work to a Layer 2 use
// case and prints what comes back. Nothing is computed here.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, DownloadArgs, InspectArgs, PredictArgs, TrainArgs, TransformsArgs};

#[derive(Parser, Debug)]
#[command(
    name = "fashion-mnist-quickstart",
    version,
    about = "Train a feed-forward classifier on Fashion-MNIST, then save, load and inspect it."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Download(args)   => run_download(args),
            Commands::Transforms(args) => run_transforms(args),
            Commands::Train(args)      => run_train(args),
            Commands::Predict(args)    => run_predict(args),
            Commands::Inspect(args)    => run_inspect(args),
        }
    }
}

fn run_download(args: DownloadArgs) -> Result<()> {
    crate::infra::download::download(std::path::Path::new(&args.data_dir))?;
    println!("Fashion-MNIST is ready in '{}'.", args.data_dir);
    Ok(())
}

fn run_transforms(args: TransformsArgs) -> Result<()> {
    use crate::application::transforms_use_case::TransformsUseCase;

    let report = TransformsUseCase::new(args.data_dir, args.normalize).execute(args.index)?;

    println!("Sample {} ({})", report.index, report.class);
    println!(
        "  raw pixels:     min={:.1} max={:.1} mean={:.3}",
        report.raw.min, report.raw.max, report.raw.mean
    );
    println!(
        "  after transform: min={:.4} max={:.4} mean={:.4}",
        report.tensor.min, report.tensor.max, report.tensor.mean
    );
    println!("  one-hot target: {:?}", report.one_hot);
    Ok(())
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;
    use crate::infra::checkpoint::CheckpointManager;

    tracing::info!("Starting training on data in: {}", args.data_dir);
    let artifact_dir = args.artifact_dir.clone();

    let history = TrainUseCase::new(args.into()).execute()?;

    if let Some(last) = history.last() {
        println!(
            "Training complete: accuracy {:.1}% after {} epochs. Checkpoints saved to '{}'.",
            last.accuracy * 100.0,
            last.epoch,
            artifact_dir
        );
    }
    if let Ok(best) = CheckpointManager::open(&artifact_dir).best_epoch() {
        println!("Lowest test loss at epoch {best} (recorded in best_epoch.json).");
    }
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::PredictUseCase;

    let use_case = PredictUseCase::new(&args.artifact_dir, args.data_dir)?;
    let report = use_case.predict(args.index)?;

    println!("Predicted: \"{}\", Actual: \"{}\"", report.predicted, report.actual);
    tracing::info!(
        "Image {}: {} with confidence {:.1}%",
        report.index,
        if report.is_correct() { "correct" } else { "wrong" },
        report.confidence * 100.0
    );
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    use crate::application::inspect_use_case::InspectUseCase;

    let report = InspectUseCase::new(args.hidden_size, args.batch_size, args.artifact_dir).execute()?;

    for layer in &report.inspection.layers {
        println!(
            "{:<8} {:?}  zeros={:>5.1}%  first values: {:?}",
            layer.name,
            layer.shape,
            layer.zero_fraction * 100.0,
            layer.preview
        );
    }

    let predicted: Vec<String> = report.inspection.predicted.iter().map(|c| c.to_string()).collect();
    println!("\nPredicted classes: {predicted:?}\n");

    println!("Model parameters ({} total):", report.num_params);
    for param in &report.parameters {
        println!("Layer: {} | Size: {:?} | Values : {:?}", param.name, param.shape, param.head);
    }
    Ok(())
}
