use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::post::PostId;

/// A validated C-SSRS assessment. Only constructed by the validator, so
/// `severity` is always within 0..=6 and every reasoning field is non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    #[serde(rename = "Q1")]
    pub q1: String,
    #[serde(rename = "Q2")]
    pub q2: String,
    #[serde(rename = "Q3")]
    pub q3: String,
    #[serde(rename = "Q4")]
    pub q4: String,
    #[serde(rename = "Q5")]
    pub q5: String,
    #[serde(rename = "Q6")]
    pub q6: String,
    pub severity: u8,
}

/// Line written to the valid stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub assessment: Assessment,
    pub post_index: PostId,
}

/// Line written to the failed stream once a post exhausts its attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub post_index: PostId,
    pub content: String,
    /// The object extracted on the final attempt, if one parsed.
    pub raw_outputs: Option<Map<String, Value>>,
}
