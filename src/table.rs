//! CSV loading and writing for keyword tables.
//!
//! Loading is fail-fast: the first cell that cannot be coerced to its
//! column's type aborts the whole read. Nothing is returned for partial
//! input.
//!
//! ## Coercion rules
//!
//! | Cell | Declared-numeric column | Keyword column | Other column |
//! |------|-------------------------|----------------|--------------|
//! | empty / whitespace | `Null` | `Null` | `Null` |
//! | finite number | `Parsed` | `Text` | `Parsed` |
//! | `inf`, `NaN` | error | `Text` | `Text` |
//! | anything else | error | `Text` | `Text` |
//!
//! Declared-numeric columns are the two scoring columns, the configured
//! `schema.numeric_columns`, and monthly volume columns named by year and
//! month (`2024-01`, `2024_01`, `Jan 2024`, `january_2024`).
//!
//! Parsed numbers keep their source text, so a written tier reproduces
//! every input cell byte for byte (`007` stays `007`).

use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::config::SchemaConfig;
use crate::error::{KeywordError, Result};
use crate::models::{KeywordRecord, ScoredRecord, Value};

pub const SEARCH_VOLUME_COLUMN: &str = "search_volume";
pub const GROWTH_COLUMN: &str = "sustained_growth_score";
pub const PRIORITY_SCORE_COLUMN: &str = "priority_score";

/// A fully loaded keyword table.
#[derive(Debug, Clone)]
pub struct KeywordTable {
    pub headers: Vec<String>,
    pub records: Vec<KeywordRecord>,
}

fn month_column_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^(\d{4}[-_]\d{2}|(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*[ _-]\d{4})$",
        )
        .expect("month column pattern is valid")
    })
}

/// Whether a header names a monthly volume observation.
pub fn is_month_column(name: &str) -> bool {
    month_column_re().is_match(name.trim())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Keyword,
    Numeric,
    Free,
}

/// Per-column typing derived from the header row.
struct ColumnPlan {
    kinds: Vec<ColumnKind>,
    volume_idx: usize,
    growth_idx: usize,
}

impl ColumnPlan {
    fn new(headers: &[String], schema: &SchemaConfig) -> Result<Self> {
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| KeywordError::MissingColumn(name.to_string()))
        };
        let volume_idx = position(SEARCH_VOLUME_COLUMN)?;
        let growth_idx = position(GROWTH_COLUMN)?;

        let kinds = headers
            .iter()
            .map(|h| {
                if h == SEARCH_VOLUME_COLUMN
                    || h == GROWTH_COLUMN
                    || schema.numeric_columns.iter().any(|c| c == h)
                    || is_month_column(h)
                {
                    ColumnKind::Numeric
                } else if *h == schema.keyword_column {
                    ColumnKind::Keyword
                } else {
                    ColumnKind::Free
                }
            })
            .collect();

        Ok(Self {
            kinds,
            volume_idx,
            growth_idx,
        })
    }
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Coerce one raw cell. `row` is the 1-based data row, used in errors.
fn coerce(raw: &str, kind: ColumnKind, row: usize, column: &str) -> Result<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }
    if kind == ColumnKind::Keyword {
        return Ok(Value::Text(raw.to_string()));
    }
    if let Some(value) = parse_finite(trimmed) {
        return Ok(Value::Parsed {
            value,
            raw: raw.to_string(),
        });
    }
    if kind == ColumnKind::Free {
        return Ok(Value::Text(raw.to_string()));
    }
    if trimmed.parse::<f64>().is_ok() {
        Err(KeywordError::NonFinite {
            row,
            column: column.to_string(),
            value: raw.to_string(),
        })
    } else {
        Err(KeywordError::NotNumeric {
            row,
            column: column.to_string(),
            value: raw.to_string(),
        })
    }
}

/// Read a keyword table from any CSV source with a header row.
///
/// A completely empty source yields an empty table. A header without the
/// `search_volume` or `sustained_growth_score` column is an error.
pub fn read_table<R: Read>(source: R, schema: &SchemaConfig) -> Result<KeywordTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
    if headers.is_empty() {
        return Ok(KeywordTable {
            headers,
            records: Vec::new(),
        });
    }

    let plan = ColumnPlan::new(&headers, schema)?;
    let mut records = Vec::new();

    for (i, row) in reader.records().enumerate() {
        let row_number = i + 1;
        let row = row?;
        if row.len() != headers.len() {
            return Err(KeywordError::RaggedRow {
                row: row_number,
                expected: headers.len(),
                found: row.len(),
            });
        }

        let fields = row
            .iter()
            .zip(headers.iter().zip(plan.kinds.iter()))
            .map(|(raw, (column, &kind))| coerce(raw, kind, row_number, column))
            .collect::<Result<Vec<Value>>>()?;

        let search_volume = fields[plan.volume_idx].as_f64();
        let sustained_growth_score = fields[plan.growth_idx].as_f64();
        records.push(KeywordRecord::new(
            fields,
            search_volume,
            sustained_growth_score,
        ));
    }

    Ok(KeywordTable { headers, records })
}

/// Load a keyword table from a CSV file.
///
/// The file is read in full before parsing, so a path that exists but
/// cannot be read (a directory, missing permissions) is an input error
/// rather than a CSV error.
pub fn load_table(path: &Path, schema: &SchemaConfig) -> Result<KeywordTable> {
    let content = fs::read(path).map_err(|e| KeywordError::input(path, e))?;
    read_table(content.as_slice(), schema)
}

/// Write scored records as CSV: the original columns followed by
/// `priority_score`.
pub fn write_tier<W: Write>(sink: W, headers: &[String], records: &[ScoredRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(sink);

    let mut header_row: Vec<&str> = headers.iter().map(String::as_str).collect();
    header_row.push(PRIORITY_SCORE_COLUMN);
    writer.write_record(&header_row)?;

    for scored in records {
        let mut row: Vec<String> = scored.record.fields.iter().map(Value::to_string).collect();
        row.push(scored.priority_score.to_string());
        writer.write_record(&row)?;
    }

    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> SchemaConfig {
        SchemaConfig::default()
    }

    #[test]
    fn reads_and_coerces_cells() {
        let csv = "keyword,search_volume,competition,sustained_growth_score,note\n\
                   running shoes,1000,0.4,0.5,evergreen\n\
                   trail shoes,,,,\n";
        let table = read_table(csv.as_bytes(), &schema()).unwrap();

        assert_eq!(table.headers.len(), 5);
        assert_eq!(table.records.len(), 2);

        let first = &table.records[0];
        assert_eq!(first.fields[0], Value::Text("running shoes".into()));
        assert_eq!(first.fields[1].as_f64(), Some(1000.0));
        assert_eq!(first.search_volume, Some(1000.0));
        assert_eq!(first.sustained_growth_score, Some(0.5));
        assert_eq!(first.fields[4], Value::Text("evergreen".into()));

        let second = &table.records[1];
        assert_eq!(second.search_volume, None);
        assert!(second.fields[2].is_null());
        assert!(second.fields[4].is_null());
    }

    #[test]
    fn numeric_looking_free_text_becomes_number() {
        let csv = "keyword,search_volume,sustained_growth_score,category_id\nk,1,0,42\n";
        let table = read_table(csv.as_bytes(), &schema()).unwrap();
        assert_eq!(
            table.records[0].fields[3],
            Value::Parsed {
                value: 42.0,
                raw: "42".into()
            }
        );
    }

    #[test]
    fn keyword_column_is_always_text() {
        let csv = "keyword,search_volume,sustained_growth_score\n1e3,100,0\n007,10,0\n";
        let table = read_table(csv.as_bytes(), &schema()).unwrap();
        assert_eq!(table.records[0].fields[0], Value::Text("1e3".into()));
        assert_eq!(table.records[1].fields[0], Value::Text("007".into()));
    }

    #[test]
    fn written_tier_reproduces_input_cells() {
        let csv = "keyword,search_volume,sustained_growth_score,external_id\n\
                   1e3,100,0,12345678901234567891\n\
                   007,10,0.50,00042\n";
        let table = read_table(csv.as_bytes(), &schema()).unwrap();
        let scored: Vec<ScoredRecord> = table
            .records
            .into_iter()
            .map(|record| ScoredRecord {
                record,
                priority_score: 1.0,
            })
            .collect();

        let mut out = Vec::new();
        write_tier(&mut out, &table.headers, &scored).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "keyword,search_volume,sustained_growth_score,external_id,priority_score\n\
             1e3,100,0,12345678901234567891,1\n\
             007,10,0.50,00042,1\n"
        );
    }

    #[test]
    fn bad_number_in_declared_column_names_row_and_column() {
        let csv = "keyword,search_volume,sustained_growth_score\n\
                   a,10,0.1\n\
                   b,lots,0.2\n";
        let err = read_table(csv.as_bytes(), &schema()).unwrap_err();
        match err {
            KeywordError::NotNumeric { row, column, value } => {
                assert_eq!(row, 2);
                assert_eq!(column, "search_volume");
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn month_columns_are_numeric() {
        assert!(is_month_column("2024-01"));
        assert!(is_month_column("2023_12"));
        assert!(is_month_column("Jan 2024"));
        assert!(is_month_column("september_2023"));
        assert!(!is_month_column("keyword"));
        assert!(!is_month_column("2024"));

        let csv = "keyword,search_volume,sustained_growth_score,2024-01\nk,1,0,n/a\n";
        let err = read_table(csv.as_bytes(), &schema()).unwrap_err();
        assert!(matches!(err, KeywordError::NotNumeric { ref column, .. } if column == "2024-01"));
    }

    #[test]
    fn non_finite_rejected_in_numeric_column() {
        let csv = "keyword,search_volume,sustained_growth_score\nk,NaN,0\n";
        let err = read_table(csv.as_bytes(), &schema()).unwrap_err();
        assert!(matches!(err, KeywordError::NonFinite { row: 1, .. }));
    }

    #[test]
    fn configured_numeric_columns_are_enforced() {
        let csv = "keyword,search_volume,sustained_growth_score,cpc\nk,1,0,cheap\n";
        assert!(read_table(csv.as_bytes(), &schema()).is_err());

        let relaxed = SchemaConfig {
            numeric_columns: Vec::new(),
            ..SchemaConfig::default()
        };
        let table = read_table(csv.as_bytes(), &relaxed).unwrap();
        assert_eq!(table.records[0].fields[3], Value::Text("cheap".into()));
    }

    #[test]
    fn ragged_row_rejected() {
        let csv = "keyword,search_volume,sustained_growth_score\nk,1\n";
        let err = read_table(csv.as_bytes(), &schema()).unwrap_err();
        assert!(matches!(
            err,
            KeywordError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn missing_scoring_column_rejected() {
        let csv = "keyword,search_volume\nk,1\n";
        let err = read_table(csv.as_bytes(), &schema()).unwrap_err();
        assert!(matches!(err, KeywordError::MissingColumn(ref c) if c == GROWTH_COLUMN));
    }

    #[test]
    fn empty_source_is_empty_table() {
        let table = read_table("".as_bytes(), &schema()).unwrap();
        assert!(table.headers.is_empty());
        assert!(table.records.is_empty());

        let header_only = "keyword,search_volume,sustained_growth_score\n";
        let table = read_table(header_only.as_bytes(), &schema()).unwrap();
        assert_eq!(table.headers.len(), 3);
        assert!(table.records.is_empty());
    }

    #[test]
    fn missing_file_is_input_error() {
        let err = load_table(Path::new("/nonexistent/keywords.csv"), &schema()).unwrap_err();
        assert!(matches!(err, KeywordError::InputMissing { .. }));
    }

    #[test]
    fn directory_path_is_unreadable_input() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = load_table(tmp.path(), &schema()).unwrap_err();
        assert!(matches!(err, KeywordError::InputUnreadable { .. }));
    }

    #[test]
    fn write_tier_appends_priority_score() {
        let headers = vec![
            "keyword".to_string(),
            "search_volume".to_string(),
            "sustained_growth_score".to_string(),
        ];
        let records = vec![ScoredRecord {
            record: KeywordRecord::new(
                vec![
                    Value::Text("a, b".into()),
                    Value::Number(1000.0),
                    Value::Null,
                ],
                Some(1000.0),
                None,
            ),
            priority_score: 3.0,
        }];

        let mut out = Vec::new();
        write_tier(&mut out, &headers, &records).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "keyword,search_volume,sustained_growth_score,priority_score\n\"a, b\",1000,,3\n"
        );
    }
}
