use std::path::PathBuf;

use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Anything that reaches `main` as an `AppError` ends the run with a non-zero exit.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Dataset error in {}: {message}", .path.display())]
    Dataset { path: PathBuf, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Inference too slow: took {elapsed_secs:.2}s (threshold: {threshold_secs}s)")]
    LatencyExceeded {
        elapsed_secs: f64,
        threshold_secs: f64,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
