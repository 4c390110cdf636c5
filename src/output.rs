//! All-or-nothing writing of partition artifacts.
//!
//! The top tier, long tail and metadata document are each staged as a
//! hidden temporary file next to its destination. Only once all three are
//! fully written and flushed are they renamed into place. If staging fails
//! every staged file is removed and existing outputs are left untouched.
//!
//! The renames themselves are not a single atomic step. If one fails, the
//! outputs renamed before it are already replaced while the rest keep their
//! previous contents; the error names the destination that failed and no
//! staged file is left behind.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::OutputConfig;
use crate::error::{KeywordError, Result};
use crate::models::Partition;
use crate::table::write_tier;

/// Destination paths for one partition run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub top_tier: PathBuf,
    pub long_tail: PathBuf,
    pub metadata: PathBuf,
}

impl OutputPaths {
    pub fn from_config(output: &OutputConfig) -> Self {
        Self {
            top_tier: output.top_tier_path(),
            long_tail: output.long_tail_path(),
            metadata: output.metadata_path(),
        }
    }

    fn all(&self) -> [&Path; 3] {
        [
            self.top_tier.as_path(),
            self.long_tail.as_path(),
            self.metadata.as_path(),
        ]
    }
}

/// Temporary sibling used while staging `path`.
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

/// Staged files not yet renamed into place. Dropping it removes them.
struct Staging {
    pending: Vec<(PathBuf, PathBuf)>,
}

impl Staging {
    fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    fn stage<F>(&mut self, dest: &Path, fill: F) -> Result<()>
    where
        F: FnOnce(&mut BufWriter<File>) -> Result<()>,
    {
        let tmp = staging_path(dest);
        let file = File::create(&tmp).map_err(|e| KeywordError::output(&tmp, e))?;
        self.pending.push((tmp.clone(), dest.to_path_buf()));

        let mut writer = BufWriter::new(file);
        fill(&mut writer).map_err(|e| match e {
            KeywordError::Csv(err) => KeywordError::output(dest, std::io::Error::other(err)),
            other => other,
        })?;
        writer.flush().map_err(|e| KeywordError::output(&tmp, e))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| KeywordError::output(&tmp, e))?;
        Ok(())
    }

    /// Rename staged files into place in staging order. Stops at the first
    /// failed rename; destinations after it are not touched.
    fn commit(mut self) -> Result<()> {
        let pending = std::mem::take(&mut self.pending);
        let mut iter = pending.into_iter();
        while let Some((tmp, dest)) = iter.next() {
            if let Err(e) = fs::rename(&tmp, &dest) {
                let _ = fs::remove_file(&tmp);
                self.pending = iter.collect();
                return Err(KeywordError::output(dest, e));
            }
        }
        Ok(())
    }
}

impl Drop for Staging {
    fn drop(&mut self) {
        for (tmp, _) in self.pending.drain(..) {
            let _ = fs::remove_file(tmp);
        }
    }
}

/// Write both tiers and the metadata document.
///
/// `headers` is the input column order; each tier gets those columns plus
/// `priority_score`.
pub fn write_partition(headers: &[String], partition: &Partition, paths: &OutputPaths) -> Result<()> {
    for path in paths.all() {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| KeywordError::output(parent, e))?;
        }
    }

    let mut staging = Staging::new();
    staging.stage(&paths.top_tier, |w| write_tier(w, headers, &partition.top_tier))?;
    staging.stage(&paths.long_tail, |w| write_tier(w, headers, &partition.long_tail))?;
    staging.stage(&paths.metadata, |w| {
        serde_json::to_writer_pretty(&mut *w, &partition.metadata)?;
        w.write_all(b"\n")
            .map_err(|e| KeywordError::output(&paths.metadata, e))
    })?;
    staging.commit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{KeywordRecord, Value};
    use crate::partition::partition;
    use chrono::Utc;
    use tempfile::TempDir;

    fn sample() -> (Vec<String>, Partition) {
        let headers = vec![
            "keyword".to_string(),
            "search_volume".to_string(),
            "sustained_growth_score".to_string(),
        ];
        let records = vec![
            KeywordRecord::new(
                vec![Value::Text("a".into()), Value::Number(100.0), Value::Null],
                Some(100.0),
                None,
            ),
            KeywordRecord::new(
                vec![Value::Text("b".into()), Value::Number(10.0), Value::Null],
                Some(10.0),
                None,
            ),
        ];
        (headers, partition(records, 1, Utc::now()))
    }

    fn paths_in(dir: &Path) -> OutputPaths {
        OutputPaths {
            top_tier: dir.join("top.csv"),
            long_tail: dir.join("tail.csv"),
            metadata: dir.join("meta.json"),
        }
    }

    #[test]
    fn writes_all_three_and_no_staging_files() {
        let tmp = TempDir::new().unwrap();
        let paths = paths_in(&tmp.path().join("nested"));
        let (headers, p) = sample();

        write_partition(&headers, &p, &paths).unwrap();

        let top = fs::read_to_string(&paths.top_tier).unwrap();
        assert!(top.starts_with("keyword,search_volume,sustained_growth_score,priority_score\n"));
        assert!(top.contains("a,100,,2\n"));
        let tail = fs::read_to_string(&paths.long_tail).unwrap();
        assert!(tail.contains("b,10,,1\n"));

        let meta: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&paths.metadata).unwrap()).unwrap();
        assert_eq!(meta["total_keywords"], 2);
        assert_eq!(meta["top_tier_count"], 1);
        assert_eq!(meta["long_tail_count"], 1);

        let leftovers: Vec<_> = fs::read_dir(tmp.path().join("nested"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn failed_staging_leaves_existing_outputs_alone() {
        let tmp = TempDir::new().unwrap();
        let paths = paths_in(tmp.path());
        fs::write(&paths.top_tier, "previous top").unwrap();

        // A directory in place of the metadata staging file makes the third
        // stage fail after the first two succeeded.
        fs::create_dir(staging_path(&paths.metadata)).unwrap();

        let (headers, p) = sample();
        let err = write_partition(&headers, &p, &paths).unwrap_err();
        assert!(matches!(err, KeywordError::Output { .. }));

        assert_eq!(fs::read_to_string(&paths.top_tier).unwrap(), "previous top");
        assert!(!paths.long_tail.exists());
        assert!(!paths.metadata.exists());
        assert!(!staging_path(&paths.top_tier).exists());
        assert!(!staging_path(&paths.long_tail).exists());
    }

    #[test]
    fn failed_rename_stops_commit_and_cleans_up() {
        let tmp = TempDir::new().unwrap();
        let paths = paths_in(tmp.path());
        fs::write(&paths.metadata, "previous meta").unwrap();

        // A non-empty directory at the long tail destination cannot be
        // replaced by a rename.
        fs::create_dir(&paths.long_tail).unwrap();
        fs::write(paths.long_tail.join("keep"), "x").unwrap();

        let (headers, p) = sample();
        let err = write_partition(&headers, &p, &paths).unwrap_err();
        match err {
            KeywordError::Output { path, .. } => assert_eq!(path, paths.long_tail),
            other => panic!("unexpected error: {other}"),
        }

        // Renamed before the failure.
        assert!(fs::read_to_string(&paths.top_tier).unwrap().contains("a,100,,2\n"));
        // Not reached.
        assert_eq!(fs::read_to_string(&paths.metadata).unwrap(), "previous meta");
        for path in paths.all() {
            assert!(!staging_path(path).exists());
        }
    }

    #[test]
    fn staging_path_is_hidden_sibling() {
        assert_eq!(
            staging_path(Path::new("/out/top.csv")),
            PathBuf::from("/out/.top.csv.tmp")
        );
    }
}
