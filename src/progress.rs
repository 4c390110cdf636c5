//! Run progress reporting.
//!
//! Reports milestones during `kwt partition` and `kwt embeddings chunk` so
//! operators can see how far a run got. Progress is emitted on **stderr**
//! so stdout remains parseable for scripts.

use std::io::Write;

/// A single progress event.
#[derive(Clone, Debug, PartialEq)]
pub enum ProgressEvent {
    /// Input table parsed.
    Loaded { rows: u64 },
    /// Every row scored and ranked.
    Ranked { rows: u64 },
    /// All partition artifacts are in place.
    Saved { top_tier: u64, long_tail: u64 },
    /// One embedding chunk file written.
    ChunkWritten { chunk: u64, total: u64 },
}

/// Reports run progress. Implementations write to stderr (human or JSON).
pub trait ProgressReporter: Send + Sync {
    /// Emit a progress event.
    fn report(&self, event: ProgressEvent);
}

/// Human-friendly progress on stderr: "partition  loaded  12,345 keywords".
pub struct StderrProgress;

impl ProgressReporter for StderrProgress {
    fn report(&self, event: ProgressEvent) {
        let line = match &event {
            ProgressEvent::Loaded { rows } => {
                format!("partition  loaded  {} keywords\n", format_number(*rows))
            }
            ProgressEvent::Ranked { rows } => {
                format!("partition  scored  {} keywords\n", format_number(*rows))
            }
            ProgressEvent::Saved {
                top_tier,
                long_tail,
            } => format!(
                "partition  saved  {} top tier / {} long tail\n",
                format_number(*top_tier),
                format_number(*long_tail)
            ),
            ProgressEvent::ChunkWritten { chunk, total } => format!(
                "embeddings  chunk  {} / {}\n",
                format_number(*chunk),
                format_number(*total)
            ),
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ProgressReporter for JsonProgress {
    fn report(&self, event: ProgressEvent) {
        if let Ok(line) = serde_json::to_string(&event_json(&event)) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

fn event_json(event: &ProgressEvent) -> serde_json::Value {
    match event {
        ProgressEvent::Loaded { rows } => serde_json::json!({
            "event": "progress",
            "phase": "loaded",
            "rows": rows
        }),
        ProgressEvent::Ranked { rows } => serde_json::json!({
            "event": "progress",
            "phase": "scored",
            "rows": rows
        }),
        ProgressEvent::Saved {
            top_tier,
            long_tail,
        } => serde_json::json!({
            "event": "progress",
            "phase": "saved",
            "top_tier": top_tier,
            "long_tail": long_tail
        }),
        ProgressEvent::ChunkWritten { chunk, total } => serde_json::json!({
            "event": "progress",
            "phase": "chunk",
            "n": chunk,
            "total": total
        }),
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Format an integer with thousands separators.
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
