//! CSV corpus loading

use super::{CorpusError, Record};
use crate::config::{expand_tilde, CorpusConfig};
use crate::text::split_keywords;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Where and how to read the corpus table
#[derive(Debug, Clone)]
pub struct CorpusSource {
    pub path: PathBuf,
    pub keywords_column: String,
    pub delimiter: String,
}

impl CorpusSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            keywords_column: "keywords".to_string(),
            delimiter: crate::text::DEFAULT_KEYWORD_DELIMITER.to_string(),
        }
    }

    pub fn from_config(config: &CorpusConfig) -> Self {
        Self {
            path: expand_tilde(&config.reports_path),
            keywords_column: config.keywords_column.clone(),
            delimiter: config.delimiter.clone(),
        }
    }

    /// Read and parse the corpus file
    pub fn load(&self) -> Result<LoadedCorpus, CorpusError> {
        let bytes = std::fs::read(&self.path)?;
        let mut corpus = LoadedCorpus::from_csv(&bytes, &self.keywords_column, &self.delimiter)?;
        corpus.source = Some(self.path.clone());
        Ok(corpus)
    }
}

/// Parsed corpus rows plus load metadata
#[derive(Debug, Clone)]
pub struct LoadedCorpus {
    pub records: Vec<Record>,
    /// blake3 hex digest of the raw corpus bytes
    pub fingerprint: String,
    /// Rows kept with an empty keyword set because they could not be parsed
    pub malformed_rows: usize,
    pub source: Option<PathBuf>,
}

impl LoadedCorpus {
    /// Parse CSV bytes with a header row.
    ///
    /// Fails only when the keyword column is absent. A malformed row still
    /// yields a record (with an empty keyword set) so positions stay stable.
    pub fn from_csv(
        bytes: &[u8],
        keywords_column: &str,
        delimiter: &str,
    ) -> Result<Self, CorpusError> {
        let fingerprint = blake3::hash(bytes).to_hex().to_string();

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader
            .byte_headers()?
            .iter()
            .map(|h| String::from_utf8_lossy(h).into_owned())
            .collect();
        let keyword_idx = headers
            .iter()
            .position(|h| h == keywords_column)
            .ok_or_else(|| CorpusError::MissingColumn(keywords_column.to_string()))?;

        let mut records = Vec::new();
        let mut malformed_rows = 0usize;

        for (row, result) in reader.byte_records().enumerate() {
            // header is line 1
            let line = row + 2;
            let position = records.len();
            match result {
                Ok(raw) => {
                    let mut fields = Map::new();
                    for (i, name) in headers.iter().enumerate() {
                        let value = raw
                            .get(i)
                            .map(|v| String::from_utf8_lossy(v).into_owned())
                            .unwrap_or_default();
                        fields.insert(name.clone(), Value::String(value));
                    }

                    let keyword_cell = raw.get(keyword_idx).map(std::str::from_utf8);
                    let keywords = match keyword_cell {
                        Some(Ok(cell)) if raw.len() == headers.len() => {
                            split_keywords(cell, delimiter)
                        }
                        _ => {
                            malformed_rows += 1;
                            tracing::warn!(
                                "Corpus row at line {} is malformed ({} of {} fields); keeping it without keywords",
                                line,
                                raw.len(),
                                headers.len()
                            );
                            Vec::new()
                        }
                    };
                    records.push(Record::new(position, fields, keywords));
                }
                Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(e.into()),
                Err(e) => {
                    malformed_rows += 1;
                    tracing::warn!("Corpus row at line {} could not be parsed: {}", line, e);
                    records.push(Record::new(position, Map::new(), Vec::new()));
                }
            }
        }

        Ok(Self {
            records,
            fingerprint,
            malformed_rows,
            source: None,
        })
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_basic_corpus() {
        let csv = b"id,title,keywords\n1,First,\"Alpha, beta\"\n2,Second,gamma\n";
        let corpus = LoadedCorpus::from_csv(csv, "keywords", ",").unwrap();

        assert_eq!(corpus.records.len(), 2);
        assert_eq!(corpus.malformed_rows, 0);

        let first = &corpus.records[0];
        assert_eq!(first.position(), 0);
        assert_eq!(first.keywords(), &["alpha".to_string(), "beta".to_string()]);
        assert_eq!(first.field("title"), Some("First"));
        assert_eq!(first.field("keywords"), Some("Alpha, beta"));

        let keys: Vec<&String> = first.fields().keys().collect();
        assert_eq!(keys, vec!["id", "title", "keywords"]);
    }

    #[test]
    fn test_empty_cells_become_empty_strings() {
        let csv = b"id,title,keywords\n1,,\n";
        let corpus = LoadedCorpus::from_csv(csv, "keywords", ",").unwrap();

        let record = &corpus.records[0];
        assert_eq!(record.field("title"), Some(""));
        assert!(record.keywords().is_empty());
        assert_eq!(corpus.malformed_rows, 0);
    }

    #[test]
    fn test_malformed_row_kept_without_keywords() {
        let csv = b"id,keywords,title\n1,alpha,ok\n2,beta\n3,gamma,ok\n";
        let corpus = LoadedCorpus::from_csv(csv, "keywords", ",").unwrap();

        assert_eq!(corpus.records.len(), 3);
        assert_eq!(corpus.malformed_rows, 1);
        assert!(corpus.records[1].keywords().is_empty());
        assert_eq!(corpus.records[1].field("id"), Some("2"));
        assert_eq!(corpus.records[1].field("title"), Some(""));
        assert_eq!(corpus.records[2].position(), 2);
        assert!(corpus.records[2].has_keyword("gamma"));
    }

    #[test]
    fn test_invalid_utf8_keywords_dropped() {
        let mut csv = b"id,keywords\n1,".to_vec();
        csv.extend_from_slice(&[0xff, 0xfe]);
        csv.extend_from_slice(b"\n2,beta\n");
        let corpus = LoadedCorpus::from_csv(&csv, "keywords", ",").unwrap();

        assert_eq!(corpus.malformed_rows, 1);
        assert!(corpus.records[0].keywords().is_empty());
        assert!(corpus.records[1].has_keyword("beta"));
    }

    #[test]
    fn test_missing_keyword_column() {
        let csv = b"id,tags\n1,alpha\n";
        let result = LoadedCorpus::from_csv(csv, "keywords", ",");
        assert!(matches!(result, Err(CorpusError::MissingColumn(c)) if c == "keywords"));
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = LoadedCorpus::from_csv(b"id,keywords\n1,alpha\n", "keywords", ",").unwrap();
        let b = LoadedCorpus::from_csv(b"id,keywords\n1,alpha\n", "keywords", ",").unwrap();
        let c = LoadedCorpus::from_csv(b"id,keywords\n1,beta\n", "keywords", ",").unwrap();

        assert_eq!(a.fingerprint, b.fingerprint);
        assert_ne!(a.fingerprint, c.fingerprint);
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("reports.csv");
        std::fs::write(&path, "id;keywords\n1;a|b\n").unwrap();

        let source = CorpusSource {
            path: path.clone(),
            keywords_column: "keywords".to_string(),
            delimiter: "|".to_string(),
        };
        // Semicolon-separated files are not CSV; the whole line is one column
        assert!(matches!(source.load(), Err(CorpusError::MissingColumn(_))));

        std::fs::write(&path, "id,keywords\n1,a|b\n").unwrap();
        let corpus = source.load().unwrap();
        assert_eq!(corpus.source_path(), Some(path.as_path()));
        assert_eq!(corpus.records[0].keywords().len(), 2);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let source = CorpusSource::new("/nonexistent/reports.csv");
        assert!(matches!(source.load(), Err(CorpusError::Io(_))));
    }
}
