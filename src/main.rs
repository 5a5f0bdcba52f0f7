use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use recipe_normalizer::config::{OracleConfig, PipelineConfig};
use recipe_normalizer::oracle::HttpOracle;
use recipe_normalizer::pipeline::{load_recipes, write_output, BatchOutput};
use recipe_normalizer::{RecipeBatch, RecipeNormalizer};

/// Normalize scraped recipe records into structured recipes
#[derive(Debug, Parser)]
#[command(name = "recipe_normalizer", version, about)]
struct Cli {
    /// JSON file with an array of recipes, or an object with a "recipes" array
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the structured recipes
    #[arg(short, long, default_value = "structured_recipes.json")]
    output: PathBuf,

    /// Consult the HTTP disambiguation oracle for uncertain ingredients
    #[arg(long)]
    oracle: bool,

    /// Rewrite measurements in instructions as words
    #[arg(long)]
    rewrite_measurements: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    info!("Starting recipe normalizer");

    let mut config = PipelineConfig::from_env();
    if cli.rewrite_measurements {
        config.rewrite_measurements = true;
    }
    config.validate().context("Invalid pipeline configuration")?;

    let mut normalizer = RecipeNormalizer::new(config);
    if cli.oracle {
        match HttpOracle::new(OracleConfig::from_env()) {
            Ok(oracle) => normalizer = normalizer.with_oracle(Box::new(oracle)),
            Err(e) => warn!(error = %e, "Oracle unavailable, running deterministic only"),
        }
    }

    let records = load_recipes(&cli.input)?;
    info!(records = records.len(), input = %cli.input.display(), "Loaded recipes");

    let report = RecipeBatch::new(normalizer).process_all(&records);
    let count = report.recipes.len();

    write_output(&cli.output, &BatchOutput::new(report.recipes))
        .context("Failed to save structured recipes")?;

    info!(
        recipes = count,
        skipped = report.skipped,
        output = %cli.output.display(),
        "Structured recipes written"
    );

    Ok(())
}
