//! APG Analysis Pipeline
//!
//! Facade over the preprocessing, landmark, grading and inference crates. One call turns a raw
//! waveform into an [`AnalysisReport`]; grading and inference failures degrade the report
//! instead of failing it.

mod analyzer;
mod config;
mod report;
mod source;

pub use analyzer::ApgPipeline;
pub use config::{PipelineConfig, ENV_PREFIX};
pub use report::{Advice, AnalysisReport, RoleMap};
pub use source::{read_wave_column, read_wave_file, SourceError, DEFAULT_WAVE_COLUMN};

use thiserror::Error;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

/// Errors building or running the pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Prep(#[from] signal_prep::PrepError),
    #[error(transparent)]
    Extractor(#[from] landmark_engine::ExtractorError),
    #[error(transparent)]
    Grading(#[from] vascular_grading::GradingError),
    #[error(transparent)]
    Inference(#[from] age_inference::InferenceError),
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Initialize logging to stderr, as JSON lines when `json` is set.
///
/// Later calls leave the first subscriber in place.
pub fn init_logging(json: bool) {
    let builder = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .with_writer(std::io::stderr);

    let installed = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    if installed.is_err() {
        debug!("Tracing subscriber already installed");
    }
}
