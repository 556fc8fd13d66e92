//! Batch driver: scores every post with a bounded number of attempts.
//!
//! Per post: build prompt → complete → extract first JSON object → validate.
//! The first valid attempt wins. A post that exhausts its attempts is written to
//! the failed stream with whatever the last attempt extracted. Every post ends
//! up in exactly one of the two streams, in input order.

use std::io::Write;

use futures_util::stream::{self, StreamExt};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::assessment::extract::extract_first_object;
use crate::assessment::prompts::build_assessment_prompt;
use crate::assessment::validation::validate_assessment;
use crate::errors::AppError;
use crate::llm_client::{CompletionClient, CompletionRequest};
use crate::models::assessment::{FailureRecord, ScoredRecord};
use crate::models::post::Post;
use crate::output::AssessmentSink;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
/// Room for six reasoning strings plus the severity.
pub const DEFAULT_MAX_NEW_TOKENS: u32 = 512;

#[derive(Debug, Clone, Copy)]
pub struct ScoringOptions {
    pub max_attempts: u32,
    pub max_tokens: u32,
    /// Posts in flight at once. Output order is input order regardless.
    pub concurrency: usize,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_tokens: DEFAULT_MAX_NEW_TOKENS,
            concurrency: 1,
        }
    }
}

/// Terminal state of one post.
#[derive(Debug, Clone, PartialEq)]
pub enum PostOutcome {
    Valid(ScoredRecord),
    Failed(FailureRecord),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPost {
    pub outcome: PostOutcome,
    pub attempts: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub valid: usize,
    pub failed: usize,
    pub attempts: u64,
}

/// Runs the attempt loop for a single post. Never fails: transport errors and
/// malformed replies both just consume an attempt.
pub async fn assess_post(
    client: &dyn CompletionClient,
    post: &Post,
    options: &ScoringOptions,
) -> ScoredPost {
    let prompt = build_assessment_prompt(&post.content);
    let request = CompletionRequest {
        prompt: &prompt,
        max_tokens: options.max_tokens,
    };

    let mut last_extracted: Option<Map<String, Value>> = None;

    for attempt in 1..=options.max_attempts {
        last_extracted = match client.complete(request).await {
            Ok(text) => extract_first_object(&text),
            Err(e) => {
                warn!(
                    "[Retry {attempt}] post_index: {} - completion failed: {e}",
                    post.id
                );
                None
            }
        };

        let Some(raw) = &last_extracted else {
            warn!("[Retry {attempt}] post_index: {} - no JSON object in reply", post.id);
            continue;
        };

        match validate_assessment(raw) {
            Ok(assessment) => {
                return ScoredPost {
                    outcome: PostOutcome::Valid(ScoredRecord {
                        assessment,
                        post_index: post.id.clone(),
                    }),
                    attempts: attempt,
                };
            }
            Err(e) => {
                warn!("[Retry {attempt}] post_index: {} - invalid response: {e}", post.id);
            }
        }
    }

    ScoredPost {
        outcome: PostOutcome::Failed(FailureRecord {
            post_index: post.id.clone(),
            content: post.content.clone(),
            raw_outputs: last_extracted.filter(|raw| !raw.is_empty()),
        }),
        attempts: options.max_attempts,
    }
}

/// Scores all posts and writes each outcome as soon as it is next in input order.
///
/// Only output I/O errors abort the batch.
pub async fn score_posts<V: Write, F: Write>(
    client: &dyn CompletionClient,
    posts: &[Post],
    options: &ScoringOptions,
    sink: &mut AssessmentSink<V, F>,
) -> Result<BatchSummary, AppError> {
    let mut summary = BatchSummary {
        total: posts.len(),
        ..BatchSummary::default()
    };

    let mut results = stream::iter(posts)
        .map(move |post| assess_post(client, post, options))
        .buffered(options.concurrency.max(1));

    while let Some(scored) = results.next().await {
        summary.attempts += u64::from(scored.attempts);
        match scored.outcome {
            PostOutcome::Valid(record) => {
                info!(
                    "post_index: {} - severity {} after {} attempt(s)",
                    record.post_index, record.assessment.severity, scored.attempts
                );
                sink.write_valid(&record)?;
                summary.valid += 1;
            }
            PostOutcome::Failed(record) => {
                warn!(
                    "post_index: {} - no valid assessment after {} attempts",
                    record.post_index, scored.attempts
                );
                sink.write_failed(&record)?;
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}
