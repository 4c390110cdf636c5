//! Binary chunk export for keyword embeddings.
//!
//! Splits a row-major `f32` embedding matrix into fixed-size chunk files
//! so a server can load only the chunk holding a given keyword.
//!
//! # Layout
//!
//! ```text
//! <output_dir>/
//! ├── chunk_000.bin      # rows [0, chunk_size), little-endian f32
//! ├── chunk_001.bin      # rows [chunk_size, 2 × chunk_size)
//! └── ...
//! <metadata_path>        # ChunkIndex as JSON
//! ```
//!
//! Each chunk file holds `keyword_count × dimensions × 4` bytes with no
//! header. The index maps every keyword to `(chunk_id, local_index)`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EmbeddingsConfig;
use crate::error::{KeywordError, Result};
use crate::progress::{ProgressEvent, ProgressReporter};

/// Version tag written into every chunk index.
pub const CHUNK_FORMAT_VERSION: &str = "3.0.0";

const BYTES_PER_VALUE: usize = std::mem::size_of::<f32>();

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkInfo {
    pub chunk_id: usize,
    pub start_index: usize,
    /// Inclusive.
    pub end_index: usize,
    pub keyword_count: usize,
    pub file_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordLocation {
    pub keyword: String,
    pub chunk_id: usize,
    pub local_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkIndex {
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub total_keywords: usize,
    pub embedding_dimensions: usize,
    pub chunk_size: usize,
    pub chunks: Vec<ChunkInfo>,
    pub keywords: Vec<KeywordLocation>,
}

pub fn chunk_file_name(chunk_id: usize) -> String {
    format!("chunk_{:03}.bin", chunk_id)
}

/// Lay out `total` rows in chunks of at most `chunk_size` rows.
///
/// `chunk_size` must be non-zero.
pub fn plan_chunks(total: usize, chunk_size: usize) -> Vec<ChunkInfo> {
    (0..total.div_ceil(chunk_size))
        .map(|chunk_id| {
            let start_index = chunk_id * chunk_size;
            let end = (start_index + chunk_size).min(total);
            ChunkInfo {
                chunk_id,
                start_index,
                end_index: end - 1,
                keyword_count: end - start_index,
                file_path: chunk_file_name(chunk_id),
            }
        })
        .collect()
}

/// Encode a float vector as little-endian bytes.
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vec.len() * BYTES_PER_VALUE);
    for &v in vec {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decode little-endian bytes back into floats. Trailing partial values are ignored.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(BYTES_PER_VALUE)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Load the keyword list (a JSON array of strings).
pub fn load_keywords(path: &Path) -> Result<Vec<String>> {
    let content = fs::read(path).map_err(|e| KeywordError::input(path, e))?;
    Ok(serde_json::from_slice(&content)?)
}

/// Byte length of a `keywords × dimensions` matrix, or an error when it
/// overflows `usize`.
fn matrix_bytes(keywords: usize, dimensions: usize) -> Result<usize> {
    keywords
        .checked_mul(dimensions)
        .and_then(|n| n.checked_mul(BYTES_PER_VALUE))
        .ok_or(KeywordError::MatrixTooLarge {
            keywords,
            dimensions,
        })
}

/// Load the raw matrix, checking its size against `keywords × dimensions`
/// before reading it.
pub fn load_matrix(path: &Path, keywords: usize, dimensions: usize) -> Result<Vec<f32>> {
    let expected = matrix_bytes(keywords, dimensions)? as u64;
    let found = fs::metadata(path)
        .map_err(|e| KeywordError::input(path, e))?
        .len();
    if found != expected {
        return Err(KeywordError::ShapeMismatch {
            keywords,
            dimensions,
            expected,
            found,
        });
    }
    let bytes = fs::read(path).map_err(|e| KeywordError::input(path, e))?;
    Ok(blob_to_vec(&bytes))
}

/// Write every chunk file into `output_dir` and return the index.
///
/// `matrix` must hold exactly `keywords.len() × dimensions` floats.
pub fn write_chunks(
    keywords: &[String],
    matrix: &[f32],
    dimensions: usize,
    chunk_size: usize,
    output_dir: &Path,
    reporter: &dyn ProgressReporter,
    created_at: DateTime<Utc>,
) -> Result<ChunkIndex> {
    let expected = matrix_bytes(keywords.len(), dimensions)?;
    let found = matrix.len() * BYTES_PER_VALUE;
    if found != expected {
        return Err(KeywordError::ShapeMismatch {
            keywords: keywords.len(),
            dimensions,
            expected: expected as u64,
            found: found as u64,
        });
    }

    fs::create_dir_all(output_dir).map_err(|e| KeywordError::output(output_dir, e))?;

    let chunks = plan_chunks(keywords.len(), chunk_size);
    let total = chunks.len() as u64;
    let mut locations = Vec::with_capacity(keywords.len());

    for chunk in &chunks {
        let rows = &matrix[chunk.start_index * dimensions..(chunk.end_index + 1) * dimensions];
        let path = output_dir.join(&chunk.file_path);
        fs::write(&path, vec_to_blob(rows)).map_err(|e| KeywordError::output(&path, e))?;

        locations.extend(
            keywords[chunk.start_index..=chunk.end_index]
                .iter()
                .enumerate()
                .map(|(local_index, keyword)| KeywordLocation {
                    keyword: keyword.clone(),
                    chunk_id: chunk.chunk_id,
                    local_index,
                }),
        );

        reporter.report(ProgressEvent::ChunkWritten {
            chunk: chunk.chunk_id as u64 + 1,
            total,
        });
    }

    Ok(ChunkIndex {
        version: CHUNK_FORMAT_VERSION.to_string(),
        created_at,
        total_keywords: keywords.len(),
        embedding_dimensions: dimensions,
        chunk_size,
        chunks,
        keywords: locations,
    })
}

/// Outcome of `kwt embeddings chunk`.
#[derive(Debug)]
pub struct ChunkExport {
    pub index: ChunkIndex,
    pub output_dir: PathBuf,
    pub metadata_path: PathBuf,
    pub total_bytes: u64,
}

/// Run the full export described by `config`: load, chunk, write index.
pub fn run_chunk_export(
    config: &EmbeddingsConfig,
    reporter: &dyn ProgressReporter,
) -> Result<ChunkExport> {
    let keywords = load_keywords(&config.keywords_path)?;
    let matrix = load_matrix(&config.matrix_path, keywords.len(), config.dimensions)?;

    let index = write_chunks(
        &keywords,
        &matrix,
        config.dimensions,
        config.chunk_size,
        &config.output_dir,
        reporter,
        Utc::now(),
    )?;

    let metadata_path = config.metadata_path.clone();
    if let Some(parent) = metadata_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| KeywordError::output(parent, e))?;
    }
    let json = serde_json::to_vec_pretty(&index)?;
    fs::write(&metadata_path, json).map_err(|e| KeywordError::output(&metadata_path, e))?;

    Ok(ChunkExport {
        index,
        output_dir: config.output_dir.clone(),
        metadata_path,
        total_bytes: (matrix.len() * BYTES_PER_VALUE) as u64,
    })
}
