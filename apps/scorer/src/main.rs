mod assessment;
mod config;
mod dataset;
mod errors;
mod llm_client;
mod models;
mod output;
mod smoke;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assessment::scorer::{
    score_posts, ScoringOptions, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_NEW_TOKENS,
};
use crate::config::Config;
use crate::dataset::{load_posts, DatasetColumns};
use crate::errors::AppError;
use crate::llm_client::{ClientSettings, CompletionClient, HfInferenceClient};
use crate::output::{failed_path_for, AssessmentSink};
use crate::smoke::{latency_threshold, run_smoke_test, DEFAULT_LATENCY_THRESHOLD_SECS, SMOKE_MAX_TOKENS};

/// Command-line arguments for scorer
#[derive(Parser, Debug)]
#[command(name = "scorer")]
#[command(about = "Scores social-media posts for C-SSRS suicide-risk severity with an LLM")]
#[command(version)]
struct Cli {
    /// Model identifier; overrides INFERENCE_MODEL
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score every post in a CSV dataset
    Score(ScoreArgs),
    /// Send one short request and check the response latency
    Smoke(SmokeArgs),
}

#[derive(Args, Debug)]
struct ScoreArgs {
    /// CSV dataset with an id column and a content column
    #[arg(short, long, default_value = "c-ssrs.csv")]
    input: PathBuf,

    /// JSONL file for valid assessments
    #[arg(short, long, default_value = "output.jsonl")]
    output: PathBuf,

    /// JSONL file for posts that never produced a valid assessment
    /// [default: <output> with `.jsonl` replaced by `_failed.jsonl`]
    #[arg(long)]
    failed_output: Option<PathBuf>,

    #[arg(long, default_value = "id")]
    id_column: String,

    #[arg(long, default_value = "content")]
    content_column: String,

    /// Attempts per post before it is written to the failed stream
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,

    /// Generated-token cap per request
    #[arg(long, default_value_t = DEFAULT_MAX_NEW_TOKENS)]
    max_tokens: u32,

    /// Posts scored concurrently; output order is unaffected
    #[arg(long, default_value_t = 1)]
    concurrency: usize,
}

#[derive(Args, Debug)]
struct SmokeArgs {
    /// Fail when the round trip takes longer than this
    #[arg(long, default_value_t = DEFAULT_LATENCY_THRESHOLD_SECS)]
    max_latency_secs: f64,

    #[arg(long, default_value_t = SMOKE_MAX_TOKENS)]
    max_tokens: u32,

    /// Post text to send instead of the built-in sample
    #[arg(long)]
    post: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(model) = cli.model {
        config.model = model;
    }

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting C-SSRS scorer v{}", env!("CARGO_PKG_VERSION"));

    if config.hf_token.is_none() {
        warn!("HF_TOKEN not found. API calls might fail.");
    }

    let client = HfInferenceClient::new(ClientSettings {
        base_url: config.inference_base_url.clone(),
        model: config.model.clone(),
        token: config.hf_token.clone(),
        timeout: Duration::from_secs(config.request_timeout_secs),
        seed: Some(config.seed),
    })
    .context("Failed to construct inference client")?;
    info!(
        "Inference client initialized (model: {}, endpoint: {})",
        client.model(),
        config.inference_base_url
    );

    match cli.command {
        Command::Score(args) => run_score(&client, args).await,
        Command::Smoke(args) => run_smoke(&client, args).await,
    }
}

async fn run_score(client: &dyn CompletionClient, args: ScoreArgs) -> Result<()> {
    if args.max_attempts == 0 {
        return Err(AppError::InvalidArgument("--max-attempts must be at least 1".into()).into());
    }
    if args.concurrency == 0 {
        return Err(AppError::InvalidArgument("--concurrency must be at least 1".into()).into());
    }

    let columns = DatasetColumns {
        id: args.id_column,
        content: args.content_column,
    };
    let posts = load_posts(&args.input, &columns)
        .with_context(|| format!("Failed to load dataset {}", args.input.display()))?;
    info!("Loaded {} posts from {}", posts.len(), args.input.display());

    let failed_output = args
        .failed_output
        .unwrap_or_else(|| failed_path_for(&args.output));
    let mut sink = AssessmentSink::create(&args.output, &failed_output)
        .context("Failed to create output files")?;

    let options = ScoringOptions {
        max_attempts: args.max_attempts,
        max_tokens: args.max_tokens,
        concurrency: args.concurrency,
    };
    let summary = score_posts(client, &posts, &options, &mut sink).await?;

    info!(
        "Scored {} posts: {} valid, {} failed, {} completion attempts",
        summary.total, summary.valid, summary.failed, summary.attempts
    );
    info!("Saved valid assessments to {}", args.output.display());
    info!("Saved failed samples to {}", failed_output.display());
    Ok(())
}

async fn run_smoke(client: &dyn CompletionClient, args: SmokeArgs) -> Result<()> {
    let threshold = latency_threshold(args.max_latency_secs)?;

    match run_smoke_test(client, args.post.as_deref(), threshold, args.max_tokens).await {
        Ok(report) => {
            info!(
                "Success! Latency {:.2}s is within the {:.2}s threshold.",
                report.latency.as_secs_f64(),
                threshold.as_secs_f64()
            );
            info!("Raw Output: {}", report.output);
            Ok(())
        }
        Err(e) => {
            error!("Inference Failed: {e}");
            Err(e.into())
        }
    }
}
