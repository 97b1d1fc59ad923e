//! Donorcast CLI
//!
//! Command-line interface for census-income exploration, encoding, model
//! training, and single-record donor prediction.

use clap::{Parser, Subcommand};
use colored::*;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use donorcast_core::explore::{self, ExploreConfig};
use donorcast_core::inference::InferenceSession;
use donorcast_core::preprocessing::{align_to_training, DummyEncoder};
use donorcast_core::training::{IncomeModel, TrainingConfig};
use donorcast_core::utils::{binarize_income, save_predictions, DataLoader};

#[derive(Parser)]
#[command(name = "donorcast")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Census-income analysis and donor prediction", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show dataset information
    Info {
        /// Input CSV file
        #[arg(short, long)]
        data: PathBuf,
    },

    /// Summarize feature distributions split by income class
    Explore {
        /// Training CSV file
        #[arg(short, long)]
        data: PathBuf,

        /// Optional second CSV stacked onto the first
        #[arg(long)]
        extra: Option<PathBuf>,

        /// Directory for per-feature summary CSVs
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Unique-value bound before a column counts as continuous
        #[arg(long, default_value = "20")]
        max_unique: usize,

        /// Histogram bins for continuous columns
        #[arg(long, default_value = "20")]
        bins: usize,
    },

    /// One-hot encode a dataset
    Encode {
        /// Input CSV file
        #[arg(short, long)]
        data: PathBuf,

        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,

        /// Unique-value bound before a column counts as continuous
        #[arg(long, default_value = "20")]
        max_unique: usize,
    },

    /// Train the income classifier
    Train {
        /// Training CSV file
        #[arg(long)]
        train: PathBuf,

        /// Test CSV file for evaluation
        #[arg(long)]
        test: PathBuf,

        /// Output model file
        #[arg(short, long, default_value = "model.json")]
        output: PathBuf,

        /// Unique-value bound before a column counts as continuous.
        /// Use 43..=72 to also encode native-country into the full layout.
        #[arg(long, default_value = "43")]
        max_unique: usize,

        /// Gradient-descent iterations
        #[arg(long, default_value = "1000")]
        max_iter: usize,

        /// Learning rate
        #[arg(long, default_value = "0.1")]
        learning_rate: f64,

        /// Optional CSV of test rows with predictions appended
        #[arg(long)]
        results: Option<PathBuf>,
    },

    /// Predict the donor class for one JSON-described individual
    Predict {
        /// Trained model file
        #[arg(short, long)]
        model: PathBuf,

        /// JSON file describing the individual
        #[arg(short, long, conflicts_with = "json")]
        input: Option<PathBuf>,

        /// Inline JSON object
        #[arg(short, long)]
        json: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "donorcast=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info { data } => cmd_info(&data)?,
        Commands::Explore {
            data,
            extra,
            output,
            max_unique,
            bins,
        } => cmd_explore(&data, extra.as_deref(), output.as_deref(), max_unique, bins)?,
        Commands::Encode {
            data,
            output,
            max_unique,
        } => cmd_encode(&data, &output, max_unique)?,
        Commands::Train {
            train,
            test,
            output,
            max_unique,
            max_iter,
            learning_rate,
            results,
        } => cmd_train(
            &train,
            &test,
            &output,
            max_unique,
            max_iter,
            learning_rate,
            results.as_deref(),
        )?,
        Commands::Predict { model, input, json } => {
            cmd_predict(&model, input.as_deref(), json.as_deref())?
        }
    }

    Ok(())
}

fn cmd_info(data_path: &Path) -> anyhow::Result<()> {
    println!("{}", "Donorcast - Data Info".blue().bold());
    println!();

    let df = DataLoader::new().load_csv(data_path)?;

    println!("File: {}", data_path.display());
    println!("Rows: {}", df.height());
    println!("Columns: {}", df.width());
    println!();

    println!("{:<20} {:<15} {:>10} {:>10}", "Column", "Type", "Nulls", "Unique");
    println!("{}", "─".repeat(60));

    for col in df.get_columns() {
        println!(
            "{:<20} {:<15} {:>10} {:>10}",
            col.name(),
            format!("{:?}", col.dtype()),
            col.null_count(),
            col.n_unique().unwrap_or(0)
        );
    }

    Ok(())
}

fn cmd_explore(
    data_path: &Path,
    extra_path: Option<&Path>,
    output_dir: Option<&Path>,
    max_unique: usize,
    bins: usize,
) -> anyhow::Result<()> {
    println!("{}", "Donorcast - Explore".blue().bold());
    println!();

    print!("Loading data... ");
    let loader = DataLoader::new();
    let df = match extra_path {
        Some(extra) => loader.load_split(data_path, extra)?,
        None => loader.load_csv(data_path)?,
    };
    println!("{} ({} rows × {} cols)", "✓".green(), df.height(), df.width());

    let config = ExploreConfig {
        max_unique,
        bins,
        ..Default::default()
    };
    let summaries = explore::summarize_features(&df, &config)?;

    for summary in &summaries {
        println!();
        println!("{}", summary.feature.cyan().bold());
        for (class, dist) in [
            (">50K", &summary.high_donors),
            ("<=50K", &summary.regular_donors),
        ] {
            match dist {
                explore::Distribution::Categorical(counts) => {
                    for (category, count) in counts {
                        println!("  {:<6} {:<30} {:>8}", class, category, count);
                    }
                }
                explore::Distribution::Histogram(hist_bins) => {
                    for bin in hist_bins {
                        if bin.count > 0 {
                            println!(
                                "  {:<6} {:>12.1}..{:<12.1} {:>8}",
                                class, bin.lower, bin.upper, bin.count
                            );
                        }
                    }
                }
            }
        }
    }

    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir)?;
        for summary in &summaries {
            explore::write_summary_csv(summary, dir)?;
        }
        println!();
        println!(
            "{} wrote {} summaries to {}",
            "✓".green(),
            summaries.len(),
            dir.display()
        );
    }

    Ok(())
}

fn cmd_encode(data_path: &Path, output_path: &Path, max_unique: usize) -> anyhow::Result<()> {
    println!("{}", "Donorcast - Encode".blue().bold());
    println!();

    print!("Loading data... ");
    let df = DataLoader::new().load_csv(data_path)?;
    println!("{} ({} rows × {} cols)", "✓".green(), df.height(), df.width());

    print!("Encoding... ");
    let start = Instant::now();
    let df = binarize_income(&df, "income")?;
    let mut encoder = DummyEncoder::new(max_unique);
    let encoded = encoder.fit_transform(&df)?;
    println!("{} ({:?})", "✓".green(), start.elapsed());

    print!("Saving to {}... ", output_path.display());
    let mut file = std::fs::File::create(output_path)?;
    CsvWriter::new(&mut file).finish(&mut encoded.clone())?;
    println!("{}", "✓".green());

    println!();
    println!("Output: {} rows × {} cols", encoded.height(), encoded.width());
    Ok(())
}

fn cmd_train(
    train_path: &Path,
    test_path: &Path,
    output_path: &Path,
    max_unique: usize,
    max_iter: usize,
    learning_rate: f64,
    results_path: Option<&Path>,
) -> anyhow::Result<()> {
    println!("{}", "Donorcast - Training".blue().bold());
    println!();

    print!("Loading data... ");
    let loader = DataLoader::new();
    let train = binarize_income(&loader.load_csv(train_path)?, "income")?;
    let test = binarize_income(&loader.load_csv(test_path)?, "income")?;
    println!(
        "{} ({} train rows, {} test rows)",
        "✓".green(),
        train.height(),
        test.height()
    );

    print!("Encoding... ");
    let mut encoder = DummyEncoder::new(max_unique);
    let train_encoded = encoder.fit_transform(&train)?;
    let train_columns: Vec<String> = train_encoded
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();
    let test_encoded = align_to_training(&train_columns, &encoder.transform(&test)?, "income")?;
    println!("{} ({} feature columns)", "✓".green(), train_columns.len() - 1);

    print!("Training logistic regression... ");
    let start = Instant::now();
    let config = TrainingConfig::new("income")
        .with_max_iter(max_iter)
        .with_learning_rate(learning_rate);
    let mut model = IncomeModel::new(config);
    model.fit(&train_encoded)?;
    println!("{} ({:?})", "✓".green(), start.elapsed());

    println!();
    println!("{}", "Results".yellow().bold());
    println!("{}", "─".repeat(30));
    if let Some(metrics) = model.metrics() {
        if let Some(accuracy) = metrics.accuracy {
            println!("Validation accuracy: {:.4}", accuracy);
        }
        println!("Samples: {}", metrics.n_samples);
        println!("Features: {}", metrics.n_features);
    }
    let test_accuracy = model.score(&test_encoded)?;
    println!("Test accuracy: {:.4}", test_accuracy);

    print!("Saving model to {}... ", output_path.display());
    model.save(
        output_path
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("non-UTF8 output path"))?,
    )?;
    println!("{}", "✓".green());

    if let Some(results) = results_path {
        let predictions: Vec<i64> = model
            .predict(&test_encoded)?
            .iter()
            .map(|p| *p as i64)
            .collect();
        save_predictions(&test, &predictions, results)?;
        println!("{} wrote predictions to {}", "✓".green(), results.display());
    }

    Ok(())
}

fn cmd_predict(
    model_path: &Path,
    input_path: Option<&Path>,
    inline_json: Option<&str>,
) -> anyhow::Result<()> {
    println!("{}", "Donorcast - Predict".blue().bold());
    println!();

    let json = match (input_path, inline_json) {
        (Some(path), _) => std::fs::read_to_string(path)?,
        (None, Some(json)) => json.to_string(),
        (None, None) => anyhow::bail!("provide --input <file> or --json <object>"),
    };

    print!("Loading model... ");
    let session = InferenceSession::load(
        model_path
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("non-UTF8 model path"))?,
    )?;
    println!("{}", "✓".green());

    let class = session.predict_json(&json)?;
    println!();
    println!("Prediction: {}", class.label().green().bold());

    Ok(())
}
