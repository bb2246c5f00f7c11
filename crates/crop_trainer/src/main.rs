//! Crop Recommendation Trainer CLI
//!
//! Trains the random forest from a CSV dataset, or reloads the persisted
//! artifacts to predict a crop for one feature row.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use crop_core::CropPredictor;
use crop_trainer::{run_pipeline, MaxFeatures, PipelineConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "crop-trainer")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Deterministic random forest trainer for crop recommendation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train the model and write both artifacts (default)
    Train(TrainArgs),
    /// Predict a crop for one row of feature values
    Predict(PredictArgs),
}

#[derive(Args, Debug, Default)]
struct TrainArgs {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input CSV dataset path (header row required)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Target column name
    #[arg(long)]
    target: Option<String>,

    /// Output path of the model artifact
    #[arg(long)]
    model_out: Option<PathBuf>,

    /// Output path of the label encoder artifact
    #[arg(long)]
    encoder_out: Option<PathBuf>,

    /// Number of trees
    #[arg(long)]
    trees: Option<usize>,

    /// Random seed for the split and the forest
    #[arg(long)]
    seed: Option<u64>,

    /// Fraction of rows held out from training
    #[arg(long)]
    test_size: Option<f64>,

    /// Maximum tree depth (unlimited by default)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Features considered per split (default: square root of the feature count)
    #[arg(long)]
    max_features: Option<usize>,
}

#[derive(Args, Debug)]
struct PredictArgs {
    /// Model artifact path
    #[arg(long, default_value = "crop_model.pkl")]
    model: PathBuf,

    /// Label encoder artifact path
    #[arg(long, default_value = "label_encoder.pkl")]
    encoder: PathBuf,

    /// Comma-separated feature values in training column order
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
    features: Vec<f64>,

    /// Print the N highest-voted crops with their vote shares
    #[arg(long)]
    top: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    match cli.command.unwrap_or(Command::Train(TrainArgs::default())) {
        Command::Train(args) => train(args),
        Command::Predict(args) => predict(args),
    }
}

fn build_config(args: TrainArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_toml_file(path)?,
        None => PipelineConfig::default(),
    };
    config
        .apply_env_overrides()
        .context("Invalid environment override")?;

    if let Some(input) = args.input {
        config.input = input;
    }
    if let Some(target) = args.target {
        config.target_column = target;
    }
    if let Some(path) = args.model_out {
        config.model_output = path;
    }
    if let Some(path) = args.encoder_out {
        config.encoder_output = path;
    }
    if let Some(trees) = args.trees {
        config.forest.n_trees = trees;
    }
    if let Some(seed) = args.seed {
        config.forest.seed = seed;
        config.split_seed = seed;
    }
    if let Some(test_size) = args.test_size {
        config.test_size = test_size;
    }
    if let Some(depth) = args.max_depth {
        config.forest.max_depth = Some(depth);
    }
    if let Some(count) = args.max_features {
        config.forest.max_features = MaxFeatures::Count(count);
    }

    Ok(config)
}

fn train(args: TrainArgs) -> Result<()> {
    info!("Crop Recommendation Trainer v{}", env!("CARGO_PKG_VERSION"));

    let config = build_config(args)?;
    info!("Training configuration:");
    info!("  Trees: {}", config.forest.n_trees);
    info!("  Seed: {} (split {})", config.forest.seed, config.split_seed);
    info!("  Test size: {}", config.test_size);
    info!("  Max depth: {:?}", config.forest.max_depth);
    info!("  Max features: {:?}", config.forest.max_features);

    let report = run_pipeline(&config).context("Training failed")?;

    info!(
        "Rows: {} total, {} train, {} held out",
        report.total_rows, report.train_rows, report.test_rows
    );
    info!("Classes: {}", report.classes.len());
    info!("  Model: {} ({})", report.model_path.display(), report.hashes.model);
    info!("  Encoder: {} ({})", report.encoder_path.display(), report.hashes.encoder);
    println!("Model trained and saved successfully!");

    Ok(())
}

fn predict(args: PredictArgs) -> Result<()> {
    let predictor = CropPredictor::load(&args.model, &args.encoder)
        .context("Failed to load model artifacts")?;

    if let Some(top) = args.top {
        let ranked = predictor
            .recommend(&args.features, top)
            .context("Prediction failed")?;
        for (rank, (crop, share)) in ranked.iter().enumerate() {
            info!("#{} {} ({:.3})", rank + 1, crop, share);
            println!("{}\t{:.3}", crop, share);
        }
        return Ok(());
    }

    let crop = predictor
        .predict(&args.features)
        .context("Prediction failed")?;

    info!("Predicted crop: {}", crop);
    println!("{}", crop);

    Ok(())
}
