//! Partition statistics.
//!
//! Reads the metadata document of the last run and prints a short summary.
//! Used by `kwt stats` to check what the serving side will pick up.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;
use crate::models::PartitionMetadata;
use crate::progress::format_number;

/// Read a metadata document written by `kwt partition`.
pub fn load_metadata(path: &Path) -> Result<PartitionMetadata> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read metadata: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse metadata: {}", path.display()))
}

/// Run the stats command: load the metadata and print a summary.
pub fn run_stats(config: &Config) -> Result<()> {
    let path = config.output.metadata_path();
    let meta = load_metadata(&path)?;
    print!("{}", render_stats(&meta, &path));
    Ok(())
}

pub fn render_stats(meta: &PartitionMetadata, path: &Path) -> String {
    let share = if meta.total_keywords > 0 {
        (meta.top_tier_count * 100) / meta.total_keywords
    } else {
        0
    };
    let range = match (meta.top_tier_min_score, meta.top_tier_max_score) {
        (Some(min), Some(max)) => format!("{:.4} .. {:.4}", min, max),
        _ => "n/a".to_string(),
    };

    let mut lines = vec![
        "Keyword Tiers — Partition Stats".to_string(),
        "===============================".to_string(),
        String::new(),
        format!("  Metadata:    {}", path.display()),
        format!("  Generated:   {}", format_generated(meta)),
        String::new(),
        format!("  Keywords:    {}", format_number(meta.total_keywords as u64)),
        format!(
            "  Top tier:    {} ({}%)",
            format_number(meta.top_tier_count as u64),
            share
        ),
        format!("  Long tail:   {}", format_number(meta.long_tail_count as u64)),
        format!("  Score range: {}", range),
    ];
    lines.push(String::new());
    lines.join("\n")
}

/// Absolute timestamp plus a coarse age, e.g. "2025-03-01 12:00 UTC (3 hours ago)".
fn format_generated(meta: &PartitionMetadata) -> String {
    let ts = meta.generated_at.timestamp();
    format!(
        "{} UTC ({})",
        meta.generated_at.format("%Y-%m-%d %H:%M"),
        format_ts_relative(ts)
    )
}

/// Format a Unix timestamp as a relative time string (e.g. "3 hours ago").
fn format_ts_relative(ts: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let delta = now - ts;

    if delta < 0 {
        return "in the future".to_string();
    }

    if delta < 60 {
        "just now".to_string()
    } else if delta < 3600 {
        let mins = delta / 60;
        format!("{} min{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if delta < 86400 {
        let hours = delta / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else {
        let days = delta / 86400;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    }
}
