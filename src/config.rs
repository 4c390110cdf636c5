use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default location of the configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "./config/kwt.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub schema: SchemaConfig,
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    #[serde(default = "default_input_path")]
    pub path: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
        }
    }
}

fn default_input_path() -> PathBuf {
    PathBuf::from("data/keywords.csv")
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_top_tier_file")]
    pub top_tier_file: String,
    #[serde(default = "default_long_tail_file")]
    pub long_tail_file: String,
    #[serde(default = "default_metadata_file")]
    pub metadata_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            top_tier_file: default_top_tier_file(),
            long_tail_file: default_long_tail_file(),
            metadata_file: default_metadata_file(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/partitions")
}
fn default_top_tier_file() -> String {
    "top_tier_keywords.csv".to_string()
}
fn default_long_tail_file() -> String {
    "long_tail_keywords.csv".to_string()
}
fn default_metadata_file() -> String {
    "partition_metadata.json".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScoringConfig {
    /// Number of keywords placed in the top tier.
    #[serde(default = "default_cutoff")]
    pub cutoff: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            cutoff: default_cutoff(),
        }
    }
}

fn default_cutoff() -> usize {
    crate::partition::DEFAULT_CUTOFF
}

#[derive(Debug, Deserialize, Clone)]
pub struct SchemaConfig {
    #[serde(default = "default_keyword_column")]
    pub keyword_column: String,
    /// Columns that must hold numbers (or be empty) in every row.
    /// `search_volume` and `sustained_growth_score` are always numeric.
    #[serde(default = "default_numeric_columns")]
    pub numeric_columns: Vec<String>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            keyword_column: default_keyword_column(),
            numeric_columns: default_numeric_columns(),
        }
    }
}

fn default_keyword_column() -> String {
    "keyword".to_string()
}

fn default_numeric_columns() -> Vec<String> {
    [
        "competition",
        "competition_index",
        "cpc",
        "low_top_of_page_bid",
        "high_top_of_page_bid",
        "yoy_trend_pct",
        "three_month_trend_pct",
        "volatility",
        "trend_strength",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingsConfig {
    #[serde(default = "default_keywords_path")]
    pub keywords_path: PathBuf,
    #[serde(default = "default_matrix_path")]
    pub matrix_path: PathBuf,
    #[serde(default = "default_chunks_dir")]
    pub output_dir: PathBuf,
    /// Index document describing every chunk and keyword location.
    #[serde(default = "default_chunk_index_path")]
    pub metadata_path: PathBuf,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            keywords_path: default_keywords_path(),
            matrix_path: default_matrix_path(),
            output_dir: default_chunks_dir(),
            metadata_path: default_chunk_index_path(),
            chunk_size: default_chunk_size(),
            dimensions: default_dimensions(),
        }
    }
}

fn default_keywords_path() -> PathBuf {
    PathBuf::from("data/keywords_list.json")
}
fn default_matrix_path() -> PathBuf {
    PathBuf::from("data/embeddings.bin")
}
fn default_chunks_dir() -> PathBuf {
    PathBuf::from("data/embeddings_chunks")
}
fn default_chunk_index_path() -> PathBuf {
    PathBuf::from("data/embeddings_metadata.json")
}
fn default_chunk_size() -> usize {
    2000
}
fn default_dimensions() -> usize {
    384
}

impl OutputConfig {
    pub fn top_tier_path(&self) -> PathBuf {
        self.dir.join(&self.top_tier_file)
    }

    pub fn long_tail_path(&self) -> PathBuf {
        self.dir.join(&self.long_tail_file)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(&self.metadata_file)
    }
}

/// Resolve configuration for a CLI invocation.
///
/// An explicit path must exist. Without one, [`DEFAULT_CONFIG_PATH`] is used
/// when present and built-in defaults otherwise.
pub fn resolve_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => load_config(path),
        None => {
            let path = Path::new(DEFAULT_CONFIG_PATH);
            if path.exists() {
                load_config(path)
            } else {
                Ok(Config::default())
            }
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    if config.scoring.cutoff == 0 {
        anyhow::bail!("scoring.cutoff must be >= 1");
    }

    let out = &config.output;
    for (key, name) in [
        ("output.top_tier_file", &out.top_tier_file),
        ("output.long_tail_file", &out.long_tail_file),
        ("output.metadata_file", &out.metadata_file),
    ] {
        if name.trim().is_empty() {
            anyhow::bail!("{} must not be empty", key);
        }
    }
    if out.top_tier_file == out.long_tail_file
        || out.top_tier_file == out.metadata_file
        || out.long_tail_file == out.metadata_file
    {
        anyhow::bail!("output file names must be distinct");
    }

    if config.schema.keyword_column.trim().is_empty() {
        anyhow::bail!("schema.keyword_column must not be empty");
    }

    if config.embeddings.chunk_size == 0 {
        anyhow::bail!("embeddings.chunk_size must be > 0");
    }
    if config.embeddings.dimensions == 0 {
        anyhow::bail!("embeddings.dimensions must be > 0");
    }

    Ok(())
}
