//! APG Analyzer - Main Entry Point

use anyhow::Context;
use apg_pipeline::{init_logging, read_wave_file, ApgPipeline, PipelineConfig, DEFAULT_WAVE_COLUMN};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Analyse an APG waveform and print the report as JSON
#[derive(Parser, Debug)]
#[command(name = "apg-analyze", version, about)]
struct Cli {
    /// CSV file holding the waveform
    #[arg(short, long)]
    input: PathBuf,

    /// Column with the APG samples
    #[arg(short, long, default_value = DEFAULT_WAVE_COLUMN)]
    column: String,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// ONNX classifier for the vascular age estimate
    #[arg(long)]
    model: Option<PathBuf>,

    /// Log as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    info!("=== APG Analyzer v{} ===", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PipelineConfig::from_env().context("Failed to load config from environment")?,
    };
    if let Some(model) = cli.model {
        config.model_path = Some(model);
    }

    let pipeline = ApgPipeline::new(config).context("Failed to build pipeline")?;
    let series = read_wave_file(&cli.input, &cli.column)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    info!(samples = series.len(), "Analysing {}", cli.input.display());

    let report = pipeline.analyze(&series).await.context("Analysis failed")?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
