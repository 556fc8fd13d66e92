//! Latency check against the configured inference service.
//!
//! Sends one short severity prompt, times the round trip, and fails when the
//! service errors or answers slower than the threshold. Used before a long batch
//! to confirm the token, model and endpoint actually work.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::assessment::prompts::{build_smoke_prompt, SMOKE_SAMPLE_POST};
use crate::errors::AppError;
use crate::llm_client::{CompletionClient, CompletionRequest};

pub const DEFAULT_LATENCY_THRESHOLD_SECS: f64 = 10.0;
pub const SMOKE_MAX_TOKENS: u32 = 100;

#[derive(Debug, Clone)]
pub struct SmokeReport {
    pub latency: Duration,
    pub output: String,
}

/// Turns a `--max-latency-secs` value into a threshold. Rejects zero, negative,
/// non-finite and out-of-range values instead of panicking on them.
pub fn latency_threshold(secs: f64) -> Result<Duration, AppError> {
    if !(secs.is_finite() && secs > 0.0) {
        return Err(AppError::InvalidArgument(
            "--max-latency-secs must be positive".into(),
        ));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| {
        AppError::InvalidArgument(format!("--max-latency-secs {secs} is out of range: {e}"))
    })
}

pub async fn run_smoke_test(
    client: &dyn CompletionClient,
    post: Option<&str>,
    threshold: Duration,
    max_tokens: u32,
) -> Result<SmokeReport, AppError> {
    let prompt = build_smoke_prompt(post.unwrap_or(SMOKE_SAMPLE_POST));

    info!("Sending request to inference service (model: {})...", client.model());
    let start = Instant::now();
    let output = client
        .complete(CompletionRequest {
            prompt: &prompt,
            max_tokens,
        })
        .await?;
    let latency = start.elapsed();

    info!(
        "Response received in {:.2} seconds.",
        latency.as_secs_f64()
    );
    debug!("Raw Output: {output}");

    if latency > threshold {
        return Err(AppError::LatencyExceeded {
            elapsed_secs: latency.as_secs_f64(),
            threshold_secs: threshold.as_secs_f64(),
        });
    }

    Ok(SmokeReport { latency, output })
}
