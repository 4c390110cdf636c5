//! # Keyword Tiers CLI (`kwt`)
//!
//! The `kwt` binary ranks a keyword CSV and writes the top-tier and
//! long-tail partitions used by the analytics service. It also converts
//! keyword embeddings into the chunked binary format the service loads.
//!
//! ## Usage
//!
//! ```bash
//! kwt [--config ./config/kwt.toml] [<command>]
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `kwt` / `kwt partition` | Score, rank and split the keyword table |
//! | `kwt stats` | Summarize the metadata of the last partition run |
//! | `kwt embeddings chunk` | Split an embedding matrix into chunk files |
//!
//! ## Examples
//!
//! ```bash
//! # Partition with defaults (data/keywords.csv -> data/partitions/)
//! kwt
//!
//! # Smaller top tier, different input
//! kwt partition --input exports/keywords.csv --cutoff 5000
//!
//! # Machine-readable progress for CI logs
//! kwt --progress json partition
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use keyword_tiers::config::{self, Config};
use keyword_tiers::embeddings;
use keyword_tiers::partition_cmd;
use keyword_tiers::progress::{format_number, ProgressMode};
use keyword_tiers::stats;

/// Keyword Tiers — rank keywords by priority and split them into
/// top-tier and long-tail partitions.
#[derive(Parser)]
#[command(
    name = "kwt",
    about = "Keyword Tiers — rank keywords by priority and split them into top-tier and long-tail partitions",
    version,
    long_about = "Keyword Tiers scores every keyword from its search volume and sustained growth, \
    sorts the set by score, and writes the first N keywords as the top tier and the rest as the \
    long tail, together with a metadata document. Running without a command performs a partition."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/kwt.toml` when that file exists, otherwise
    /// built-in defaults are used. An explicit path must exist.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Progress output on stderr. Defaults to `human` on a terminal, `off` otherwise.
    #[arg(long, global = true, value_enum)]
    progress: Option<ProgressMode>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Score, rank and split the keyword table.
    ///
    /// Reads the input CSV, computes a priority score per keyword, and
    /// writes the top tier, the long tail and a metadata document. Either
    /// all three files are written or none are.
    Partition(PartitionArgs),

    /// Summarize the metadata of the last partition run.
    Stats {
        /// Directory holding the partition outputs.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Manage keyword embedding exports.
    Embeddings {
        #[command(subcommand)]
        action: EmbeddingsAction,
    },
}

#[derive(clap::Args, Default)]
struct PartitionArgs {
    /// Input keyword CSV (overrides `[input].path`).
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output directory (overrides `[output].dir`).
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Number of keywords in the top tier (overrides `[scoring].cutoff`).
    #[arg(long)]
    cutoff: Option<usize>,
}

/// Embedding export subcommands.
#[derive(Subcommand)]
enum EmbeddingsAction {
    /// Split an embedding matrix into fixed-size binary chunk files.
    ///
    /// Reads a JSON keyword list and a raw little-endian f32 matrix, writes
    /// `chunk_NNN.bin` files and an index mapping each keyword to its chunk.
    Chunk {
        /// JSON array of keywords, one per matrix row.
        #[arg(long)]
        keywords: Option<PathBuf>,

        /// Raw f32 matrix (`keywords × dimensions`).
        #[arg(long)]
        matrix: Option<PathBuf>,

        /// Directory for chunk files.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Path of the index document.
        #[arg(long)]
        metadata: Option<PathBuf>,

        /// Keywords per chunk.
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Embedding dimensions.
        #[arg(long)]
        dimensions: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg: Config = config::resolve_config(cli.config.as_deref())?;
    let reporter = cli
        .progress
        .unwrap_or_else(ProgressMode::default_for_tty)
        .reporter();

    match cli.command.unwrap_or(Commands::Partition(PartitionArgs::default())) {
        Commands::Partition(args) => {
            if let Some(input) = args.input {
                cfg.input.path = input;
            }
            if let Some(dir) = args.output_dir {
                cfg.output.dir = dir;
            }
            if let Some(cutoff) = args.cutoff {
                cfg.scoring.cutoff = cutoff;
            }
            config::validate(&cfg)?;

            let run = partition_cmd::run_partition(&cfg, reporter.as_ref())
                .with_context(|| format!("Partition of {} failed", cfg.input.path.display()))?;
            print!(
                "{}",
                partition_cmd::render_summary(&run, &cfg.schema.keyword_column)
            );
        }
        Commands::Stats { output_dir } => {
            if let Some(dir) = output_dir {
                cfg.output.dir = dir;
            }
            stats::run_stats(&cfg)?;
        }
        Commands::Embeddings { action } => match action {
            EmbeddingsAction::Chunk {
                keywords,
                matrix,
                output_dir,
                metadata,
                chunk_size,
                dimensions,
            } => {
                let emb = &mut cfg.embeddings;
                if let Some(p) = keywords {
                    emb.keywords_path = p;
                }
                if let Some(p) = matrix {
                    emb.matrix_path = p;
                }
                if let Some(p) = output_dir {
                    emb.output_dir = p;
                }
                if let Some(p) = metadata {
                    emb.metadata_path = p;
                }
                if let Some(n) = chunk_size {
                    emb.chunk_size = n;
                }
                if let Some(n) = dimensions {
                    emb.dimensions = n;
                }
                config::validate(&cfg)?;

                let export = embeddings::run_chunk_export(&cfg.embeddings, reporter.as_ref())
                    .context("Embedding chunk export failed")?;
                println!("Embedding chunk export complete");
                println!(
                    "  Keywords:    {}",
                    format_number(export.index.total_keywords as u64)
                );
                println!("  Dimensions:  {}", export.index.embedding_dimensions);
                println!(
                    "  Chunks:      {} x up to {} keywords",
                    export.index.chunks.len(),
                    export.index.chunk_size
                );
                println!(
                    "  Binary size: {:.2} MB",
                    export.total_bytes as f64 / (1024.0 * 1024.0)
                );
                println!("  Chunk dir:   {}", export.output_dir.display());
                println!("  Index:       {}", export.metadata_path.display());
            }
        },
    }

    Ok(())
}
