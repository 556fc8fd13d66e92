use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque post identifier as it appeared in the dataset.
///
/// Integer-looking cells round-trip as JSON integers so `post_index` matches the
/// dataset's own numbering; anything else is kept verbatim as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostId {
    Int(i64),
    Text(String),
}

impl PostId {
    pub fn from_cell(cell: &str) -> Self {
        let trimmed = cell.trim();
        match trimmed.parse::<i64>() {
            Ok(n) => PostId::Int(n),
            Err(_) => PostId::Text(cell.to_string()),
        }
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostId::Int(n) => write!(f, "{n}"),
            PostId::Text(s) => f.write_str(s),
        }
    }
}

/// One input post. Never mutated after loading.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub content: String,
}
