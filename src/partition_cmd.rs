//! The `kwt partition` command.
//!
//! Load → score → rank → split → write, in that order. Any failure before
//! the final write leaves the output directory exactly as it was.

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::Utc;

use crate::config::Config;
use crate::error::Result;
use crate::models::Partition;
use crate::output::{write_partition, OutputPaths};
use crate::partition::{rank, score_records, split_ranked};
use crate::progress::{format_number, ProgressEvent, ProgressReporter};
use crate::table::load_table;

/// Everything a completed run produced, for reporting.
#[derive(Debug)]
pub struct PartitionRun {
    pub input: PathBuf,
    pub headers: Vec<String>,
    pub partition: Partition,
    pub paths: OutputPaths,
}

pub fn run_partition(config: &Config, reporter: &dyn ProgressReporter) -> Result<PartitionRun> {
    let table = load_table(&config.input.path, &config.schema)?;
    reporter.report(ProgressEvent::Loaded {
        rows: table.records.len() as u64,
    });

    let mut scored = score_records(table.records);
    rank(&mut scored);
    reporter.report(ProgressEvent::Ranked {
        rows: scored.len() as u64,
    });

    let partition = split_ranked(scored, config.scoring.cutoff, Utc::now());
    let paths = OutputPaths::from_config(&config.output);
    write_partition(&table.headers, &partition, &paths)?;
    reporter.report(ProgressEvent::Saved {
        top_tier: partition.top_tier.len() as u64,
        long_tail: partition.long_tail.len() as u64,
    });

    Ok(PartitionRun {
        input: config.input.path.clone(),
        headers: table.headers,
        partition,
        paths,
    })
}

/// Number of leading keywords listed in the summary.
const PREVIEW_LEN: usize = 5;

/// Human-readable report printed to stdout after a successful run.
pub fn render_summary(run: &PartitionRun, keyword_column: &str) -> String {
    let meta = &run.partition.metadata;
    let mut out = String::new();

    let _ = writeln!(out, "Keyword partition complete");
    let _ = writeln!(out, "==========================");
    let _ = writeln!(out);
    let _ = writeln!(out, "  Input:       {}", run.input.display());
    let _ = writeln!(
        out,
        "  Loaded:      {} keywords",
        format_number(meta.total_keywords as u64)
    );
    let _ = writeln!(
        out,
        "  Top tier:    {}",
        format_number(meta.top_tier_count as u64)
    );
    let _ = writeln!(
        out,
        "  Long tail:   {}",
        format_number(meta.long_tail_count as u64)
    );
    match (meta.top_tier_min_score, meta.top_tier_max_score) {
        (Some(min), Some(max)) => {
            let _ = writeln!(out, "  Score range: {:.4} .. {:.4}", min, max);
        }
        _ => {
            let _ = writeln!(out, "  Score range: n/a (no keywords)");
        }
    }

    if let Some(col) = run.headers.iter().position(|h| h == keyword_column) {
        let preview: Vec<_> = run.partition.top_tier.iter().take(PREVIEW_LEN).collect();
        if !preview.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "  Highest priority:");
            for scored in preview {
                let _ = writeln!(
                    out,
                    "    {:>10.4}  {}",
                    scored.priority_score, scored.record.fields[col]
                );
            }
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "  Wrote:");
    let _ = writeln!(out, "    {}", run.paths.top_tier.display());
    let _ = writeln!(out, "    {}", run.paths.long_tail.display());
    let _ = writeln!(out, "    {}", run.paths.metadata.display());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KeywordError;
    use crate::progress::NoProgress;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct Recorder(Mutex<Vec<ProgressEvent>>);

    impl ProgressReporter for Recorder {
        fn report(&self, event: ProgressEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    fn config_for(dir: &std::path::Path, csv: &str, cutoff: usize) -> Config {
        let input = dir.join("keywords.csv");
        fs::write(&input, csv).unwrap();
        let mut config = Config::default();
        config.input.path = input;
        config.output.dir = dir.join("out");
        config.scoring.cutoff = cutoff;
        config
    }

    const SCENARIO: &str = "keyword,search_volume,sustained_growth_score\n\
                            a,1000,0.5\n\
                            b,1000000,-1\n\
                            c,10,0\n";

    #[test]
    fn reports_milestones_in_order() {
        let tmp = TempDir::new().unwrap();
        let config = config_for(tmp.path(), SCENARIO, 2);
        let recorder = Recorder(Mutex::new(Vec::new()));

        run_partition(&config, &recorder).unwrap();

        let events = recorder.0.into_inner().unwrap();
        assert_eq!(
            events,
            vec![
                ProgressEvent::Loaded { rows: 3 },
                ProgressEvent::Ranked { rows: 3 },
                ProgressEvent::Saved {
                    top_tier: 2,
                    long_tail: 1
                },
            ]
        );
    }

    #[test]
    fn summary_lists_counts_and_top_keywords() {
        let tmp = TempDir::new().unwrap();
        let config = config_for(tmp.path(), SCENARIO, 2);
        let run = run_partition(&config, &NoProgress).unwrap();

        let text = render_summary(&run, "keyword");
        assert!(text.contains("Loaded:      3 keywords"));
        assert!(text.contains("Top tier:    2"));
        assert!(text.contains("Long tail:   1"));
        assert!(text.contains("Score range: 6.0000 .. 18.0000"));
        assert!(text.contains("18.0000  a"));
    }

    #[test]
    fn parse_failure_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let csv = "keyword,search_volume,sustained_growth_score\na,ten,0\n";
        let config = config_for(tmp.path(), csv, 2);

        let err = run_partition(&config, &NoProgress).unwrap_err();
        assert!(matches!(err, KeywordError::NotNumeric { .. }));
        assert!(!config.output.dir.exists());
    }

    #[test]
    fn empty_input_summary_has_no_range() {
        let tmp = TempDir::new().unwrap();
        let config = config_for(
            tmp.path(),
            "keyword,search_volume,sustained_growth_score\n",
            2,
        );
        let run = run_partition(&config, &NoProgress).unwrap();
        assert!(render_summary(&run, "keyword").contains("n/a (no keywords)"));
        assert!(run.paths.metadata.exists());
    }
}
