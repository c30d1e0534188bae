//! `dualsvm` command line tool
//!
//! Trains dual-QP support vector machines on LibSVM or CSV files, saves them
//! as JSON and applies saved models to new data.

use clap::{Args, Parser, Subcommand, ValueEnum};
use dualsvm::api::{EvaluationMetrics, TrainedModel, SVM};
use dualsvm::core::{Formulation, Result};
use dualsvm::kernel::KernelType;
use dualsvm::persistence::SerializableModel;
use dualsvm::{CSVDataset, Dataset, LibSVMDataset};
use env_logger::Env;
use log::{error, info, warn};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "dualsvm")]
#[command(about = "Support vector machines trained through the dual quadratic program")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log training progress
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log solver iterations and problem shapes
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a model and save it as JSON
    Train(TrainArgs),
    /// Label a data file with a saved model
    Predict(PredictArgs),
    /// Measure a saved model on labelled data
    Evaluate(EvaluateArgs),
    /// Print a saved model
    Info(InfoArgs),
    /// Train and test in one go, nothing is saved
    Quick(QuickArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum DataFormat {
    /// Pick by file extension, LibSVM unless it is `.csv`
    Auto,
    Libsvm,
    Csv,
}

#[derive(Args)]
struct TrainArgs {
    /// Training data file
    #[arg(long)]
    data: PathBuf,

    /// Where to write the model
    #[arg(short, long)]
    output: PathBuf,

    #[arg(short, long, value_enum, default_value = "auto")]
    format: DataFormat,

    #[command(flatten)]
    model: ModelArgs,

    /// Interior point iteration limit
    #[arg(short, long, default_value = "100")]
    max_iterations: usize,
}

/// Kernel and formulation options shared by training commands
#[derive(Args, Clone)]
struct ModelArgs {
    /// Soft margin parameter C
    #[arg(short = 'C', long, default_value = "1.0")]
    c: f64,

    /// Dual formulation to solve
    #[arg(long, default_value = "l1")]
    formulation: CliFormulation,

    /// Kernel function
    #[arg(short, long, default_value = "linear")]
    kernel: CliKernel,

    /// Kernel gamma (RBF defaults to 1 / number of features)
    #[arg(long)]
    gamma: Option<f64>,

    /// Polynomial degree
    #[arg(long, default_value = "3")]
    degree: u32,

    /// Polynomial coef0
    #[arg(long, default_value = "0.0")]
    coef0: f64,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliFormulation {
    /// Soft margin with L1 slack penalty, 0 <= alpha <= C
    #[value(name = "l1")]
    L1,
    /// Soft margin with L2 slack penalty, alpha >= 0
    #[value(name = "l2")]
    L2,
    /// V-matrix formulation, 0 <= alpha <= 1
    #[value(name = "vmatrix")]
    VMatrix,
}

impl From<CliFormulation> for Formulation {
    fn from(cli_formulation: CliFormulation) -> Self {
        match cli_formulation {
            CliFormulation::L1 => Formulation::StandardSoftMargin,
            CliFormulation::L2 => Formulation::L2SoftMargin,
            CliFormulation::VMatrix => Formulation::ExtendedVMatrix,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliKernel {
    /// Dot product
    #[value(name = "linear")]
    Linear,
    /// (gamma * <x, y> + coef0)^degree
    #[value(name = "polynomial")]
    Polynomial,
    /// exp(-gamma * ||x - y||^2)
    #[value(name = "rbf")]
    Rbf,
}

impl ModelArgs {
    fn kernel_type(&self, n_features: usize) -> Result<KernelType> {
        let kernel = match self.kernel {
            CliKernel::Linear => KernelType::Linear,
            CliKernel::Polynomial => KernelType::Polynomial {
                degree: self.degree,
                gamma: self.gamma.unwrap_or(1.0),
                coef0: self.coef0,
            },
            CliKernel::Rbf => KernelType::Rbf {
                gamma: self
                    .gamma
                    .unwrap_or_else(|| 1.0 / n_features.max(1) as f64),
            },
        };
        kernel.validate()?;
        Ok(kernel)
    }

    fn builder(&self, n_features: usize) -> Result<SVM<KernelType>> {
        let kernel = self.kernel_type(n_features)?;
        info!(
            "Kernel: {kernel}, formulation: {}, C = {}",
            Formulation::from(self.formulation),
            self.c
        );
        Ok(SVM::with_kernel(kernel)
            .with_c(self.c)
            .with_formulation(self.formulation.into()))
    }
}

#[derive(Args)]
struct PredictArgs {
    /// Saved model
    #[arg(short, long)]
    model: PathBuf,

    /// Data to label
    #[arg(long)]
    data: PathBuf,

    /// Write predictions here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value = "auto")]
    format: DataFormat,

    /// Append |decision value| to each line
    #[arg(long)]
    confidence: bool,
}

#[derive(Args)]
struct EvaluateArgs {
    /// Saved model
    #[arg(short, long)]
    model: PathBuf,

    /// Labelled test data
    #[arg(long)]
    data: PathBuf,

    #[arg(short, long, value_enum, default_value = "auto")]
    format: DataFormat,

    /// Print the confusion counts and derived rates
    #[arg(long)]
    detailed: bool,
}

#[derive(Args)]
struct InfoArgs {
    /// Saved model
    model: PathBuf,
}

#[derive(Args)]
struct QuickArgs {
    #[command(subcommand)]
    operation: QuickOperation,
}

#[derive(Subcommand)]
enum QuickOperation {
    /// Train on one file and test on another
    Eval {
        train: PathBuf,
        test: PathBuf,
        #[command(flatten)]
        model: ModelArgs,
    },
    /// Sequential hold-out split of a single file
    Cv {
        data: PathBuf,
        /// Fraction of rows used for training, in (0, 1)
        #[arg(short, long, default_value = "0.8")]
        ratio: f64,
        #[command(flatten)]
        model: ModelArgs,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = match (cli.debug, cli.verbose) {
        (true, _) => "debug",
        (false, true) => "info",
        (false, false) => "warn",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Train(args) => train_command(args),
        Commands::Predict(args) => predict_command(args),
        Commands::Evaluate(args) => evaluate_command(args),
        Commands::Info(args) => info_command(args),
        Commands::Quick(args) => quick_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn train_command(args: TrainArgs) -> Result<()> {
    let dataset = load_dataset(&args.data, args.format)?;
    info!(
        "Training on {} samples with {} features from {:?}",
        dataset.len(),
        dataset.dim(),
        args.data
    );

    let model = args
        .model
        .builder(dataset.dim())?
        .with_max_iterations(args.max_iterations)
        .train(&*dataset)?;

    let info = model.info();
    info!(
        "Trained: {} support vectors, bias {:.6}",
        info.n_support_vectors, info.bias
    );

    SerializableModel::from_trained_model(&model).save_to_file(&args.output)?;
    info!("Model written to {:?}", args.output);

    let accuracy = model.evaluate(&*dataset)?;
    info!("Training accuracy: {:.2}%", accuracy * 100.0);

    Ok(())
}

/// Load a saved model along with its reconstructed predictor
fn load_model(path: &Path) -> Result<(SerializableModel, TrainedModel<KernelType>)> {
    info!("Loading model from {path:?}");
    let saved = SerializableModel::load_from_file(path)?;
    let model = saved.to_trained_model()?;
    Ok((saved, model))
}

fn predict_command(args: PredictArgs) -> Result<()> {
    let (_, model) = load_model(&args.model)?;
    let dataset = load_dataset(&args.data, args.format)?;
    let predictions = model.predict_dataset(&*dataset)?;

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    };

    writeln!(out, "# Predictions for {} samples", predictions.len())?;
    writeln!(
        out,
        "# Format: sample_index predicted_label{}",
        if args.confidence { " confidence" } else { "" }
    )?;
    for (i, pred) in predictions.iter().enumerate() {
        if args.confidence {
            writeln!(out, "{i} {:.0} {:.6}", pred.label, pred.confidence())?;
        } else {
            writeln!(out, "{i} {:.0}", pred.label)?;
        }
    }
    out.flush()?;

    if let Some(path) = args.output {
        info!("Predictions written to {path:?}");
    }
    Ok(())
}

fn evaluate_command(args: EvaluateArgs) -> Result<()> {
    let (saved, model) = load_model(&args.model)?;
    let dataset = load_dataset(&args.data, args.format)?;
    let metrics = model.evaluate_detailed(&*dataset)?;

    println!("=== Model Evaluation ===");
    saved.print_summary();
    println!("\nTest Results:");
    println!("  Accuracy: {:.2}%", metrics.accuracy() * 100.0);

    if args.detailed {
        print_metrics(&metrics);
    }
    Ok(())
}

fn print_metrics(metrics: &EvaluationMetrics) {
    println!("\nDetailed Metrics:");
    let counts = [
        ("True Positives", metrics.true_positives),
        ("True Negatives", metrics.true_negatives),
        ("False Positives", metrics.false_positives),
        ("False Negatives", metrics.false_negatives),
    ];
    for (name, count) in counts {
        println!("  {:<16} {count}", format!("{name}:"));
    }
    let rates = [
        ("Precision", metrics.precision()),
        ("Recall", metrics.recall()),
        ("F1 Score", metrics.f1_score()),
        ("Specificity", metrics.specificity()),
    ];
    for (name, rate) in rates {
        println!("  {:<16} {rate:.4}", format!("{name}:"));
    }
}

fn info_command(args: InfoArgs) -> Result<()> {
    let saved = SerializableModel::load_from_file(&args.model)?;
    saved.print_summary();

    println!("\nSupport Vector Details:");
    println!("  Total: {}", saved.support_vectors.len());
    if let Some(first_sv) = saved.support_vectors.first() {
        println!("  Dimensions: {}", first_sv.len());
    }

    println!("\nWeights:");
    let n_show = saved.weights.len().min(10);
    for (i, (w, y)) in saved
        .weights
        .iter()
        .zip(&saved.support_vector_labels)
        .enumerate()
        .take(n_show)
    {
        println!("  α{i}: {w:.6} (y = {y:+.0})");
    }
    if saved.weights.len() > n_show {
        println!("  ... ({} more)", saved.weights.len() - n_show);
    }

    Ok(())
}

fn quick_command(args: QuickArgs) -> Result<()> {
    match args.operation {
        QuickOperation::Eval { train, test, model } => {
            let train_set = load_dataset(&train, DataFormat::Auto)?;
            let test_set = load_dataset(&test, DataFormat::Auto)?;
            let trained = model.builder(train_set.dim())?.train(&*train_set)?;
            let accuracy = trained.evaluate(&*test_set)?;

            println!("=== Quick Evaluation Results ===");
            println!("Training file: {train:?}");
            println!("Test file: {test:?}");
            println!("C parameter: {}", model.c);
            println!("Formulation: {}", Formulation::from(model.formulation));
            println!("Test accuracy: {:.2}%", accuracy * 100.0);
        }
        QuickOperation::Cv { data, ratio, model } => {
            let dataset = load_dataset(&data, DataFormat::Auto)?;
            info!("Hold-out split of {data:?} with ratio {ratio}");
            let accuracy = model
                .builder(dataset.dim())?
                .validate_holdout(&*dataset, ratio)?;

            println!("=== Hold-out Validation Results ===");
            println!("Data file: {data:?}");
            println!("Train/test ratio: {ratio:.1}/{:.1}", 1.0 - ratio);
            println!("C parameter: {}", model.c);
            println!("Formulation: {}", Formulation::from(model.formulation));
            println!("Validation accuracy: {:.2}%", accuracy * 100.0);
        }
    }
    Ok(())
}

fn load_dataset(path: &Path, format: DataFormat) -> Result<Box<dyn Dataset>> {
    let format = match format {
        DataFormat::Auto => detect_format(path),
        explicit => explicit,
    };
    info!("Reading {path:?} as {format:?}");

    Ok(match format {
        DataFormat::Csv => Box::new(CSVDataset::from_file(path)?),
        _ => Box::new(LibSVMDataset::from_file(path)?),
    })
}

fn detect_format(path: &Path) -> DataFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("csv") => DataFormat::Csv,
        Some("libsvm") | Some("svm") => DataFormat::Libsvm,
        Some(other) => {
            warn!("Unrecognised extension .{other}, reading as LibSVM");
            DataFormat::Libsvm
        }
        None => {
            warn!("No file extension, reading as LibSVM");
            DataFormat::Libsvm
        }
    }
}
