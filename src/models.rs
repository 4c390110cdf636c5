//! Core data models used throughout keyword-tiers.
//!
//! These types represent the keyword rows, their derived scores, and the
//! partition produced from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single coerced CSV cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Empty cell.
    Null,
    /// A computed number, written in shortest round-trip form.
    Number(f64),
    /// A number read from input. `raw` is the cell as it appeared in the
    /// source and is what gets written back.
    Parsed { value: f64, raw: String },
    Text(String),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Parsed { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Number(n) => write!(f, "{}", n),
            Value::Parsed { raw, .. } => f.write_str(raw),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// One row of the source table.
///
/// `fields` follows the header order of the table it was read from and is
/// never modified. The two scoring signals are extracted at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordRecord {
    pub fields: Vec<Value>,
    pub search_volume: Option<f64>,
    pub sustained_growth_score: Option<f64>,
}

impl KeywordRecord {
    pub fn new(
        fields: Vec<Value>,
        search_volume: Option<f64>,
        sustained_growth_score: Option<f64>,
    ) -> Self {
        Self {
            fields,
            search_volume,
            sustained_growth_score,
        }
    }
}

/// A keyword row together with its derived priority score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub record: KeywordRecord,
    pub priority_score: f64,
}

/// Summary written next to the two tiers.
///
/// `top_tier_min_score` / `top_tier_max_score` are the scores of the last
/// and first top-tier records; both are absent when the top tier is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionMetadata {
    pub total_keywords: usize,
    pub top_tier_count: usize,
    pub long_tail_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_tier_min_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_tier_max_score: Option<f64>,
    pub generated_at: DateTime<Utc>,
}

/// Result of ranking and splitting a keyword set.
#[derive(Debug, Clone)]
pub struct Partition {
    pub top_tier: Vec<ScoredRecord>,
    pub long_tail: Vec<ScoredRecord>,
    pub metadata: PartitionMetadata,
}
