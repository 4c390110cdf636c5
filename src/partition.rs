//! Ranking and two-tier partitioning.
//!
//! Pure functions over in-memory records: no filesystem access, no clock
//! reads. Callers pass the timestamp recorded in the metadata.
//!
//! # Algorithm
//!
//! 1. Score every record with [`priority_score`].
//! 2. Stable sort by score, descending. Records with equal scores keep
//!    their input order, so identical input always yields identical tiers.
//! 3. Split at `cutoff`: `[0, cutoff)` is the top tier, the rest is the
//!    long tail.

use chrono::{DateTime, Utc};

use crate::models::{KeywordRecord, Partition, PartitionMetadata, ScoredRecord};
use crate::score::priority_score;

/// Default number of keywords in the top tier.
pub const DEFAULT_CUTOFF: usize = 15_000;

/// Attach a priority score to every record, preserving input order.
pub fn score_records(records: Vec<KeywordRecord>) -> Vec<ScoredRecord> {
    records
        .into_iter()
        .map(|record| {
            let priority_score =
                priority_score(record.search_volume, record.sustained_growth_score);
            ScoredRecord {
                record,
                priority_score,
            }
        })
        .collect()
}

/// Sort by priority score, descending. `sort_by` is stable.
pub fn rank(scored: &mut [ScoredRecord]) {
    scored.sort_by(|a, b| b.priority_score.total_cmp(&a.priority_score));
}

/// Score, rank and split `records` at `cutoff`.
///
/// Fewer than `cutoff` records puts everything in the top tier and leaves
/// the long tail empty.
pub fn partition(
    records: Vec<KeywordRecord>,
    cutoff: usize,
    generated_at: DateTime<Utc>,
) -> Partition {
    let mut scored = score_records(records);
    rank(&mut scored);
    split_ranked(scored, cutoff, generated_at)
}

/// Split an already ranked sequence.
pub fn split_ranked(
    mut ranked: Vec<ScoredRecord>,
    cutoff: usize,
    generated_at: DateTime<Utc>,
) -> Partition {
    let total_keywords = ranked.len();
    let long_tail = ranked.split_off(cutoff.min(total_keywords));
    let top_tier = ranked;

    let metadata = PartitionMetadata {
        total_keywords,
        top_tier_count: top_tier.len(),
        long_tail_count: long_tail.len(),
        top_tier_min_score: top_tier.last().map(|r| r.priority_score),
        top_tier_max_score: top_tier.first().map(|r| r.priority_score),
        generated_at,
    };

    Partition {
        top_tier,
        long_tail,
        metadata,
    }
}
