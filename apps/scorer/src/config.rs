use anyhow::{Context, Result};

const DEFAULT_BASE_URL: &str = "https://router.huggingface.co";
const DEFAULT_MODEL: &str = "meta-llama/Llama-3.1-8B-Instruct";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_SEED: u64 = 0;

/// Process configuration loaded from environment variables.
/// Nothing here is required; the token is optional and every other value has a default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer token for the inference service. `None` means unauthenticated requests.
    pub hf_token: Option<String>,
    pub inference_base_url: String,
    pub model: String,
    pub request_timeout_secs: u64,
    /// Sampling seed forwarded with every request so reruns can be reproduced.
    /// Defaults to 0.
    pub seed: u64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            hf_token: optional_env("HF_TOKEN"),
            inference_base_url: optional_env("INFERENCE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: optional_env("INFERENCE_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            request_timeout_secs: optional_env("INFERENCE_TIMEOUT_SECS")
                .map(|v| v.parse::<u64>())
                .transpose()
                .context("INFERENCE_TIMEOUT_SECS must be a whole number of seconds")?
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            seed: parse_seed(optional_env("INFERENCE_SEED"))?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn parse_seed(value: Option<String>) -> Result<u64> {
    Ok(value
        .map(|v| v.parse::<u64>())
        .transpose()
        .context("INFERENCE_SEED must be an unsigned integer")?
        .unwrap_or(DEFAULT_SEED))
}

/// Reads an env var, treating empty or whitespace-only values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
