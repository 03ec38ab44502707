/// Static word-vector table (GloVe / fastText `.vec` text format)
use super::provider::{EmbeddingError, WordEmbedder};
use ahash::{HashMap, HashMapExt};
use std::io::{BufRead, BufReader};
use std::path::Path;

/// In-memory word -> vector table.
///
/// Accepts one `word v1 v2 ... vD` entry per line. A leading
/// `<count> <dimension>` header line (fastText) is recognized and skipped.
/// Lines whose width disagrees with the first entry are ignored.
#[derive(Debug, Clone)]
pub struct WordVectors {
    vectors: HashMap<String, Vec<f32>>,
    dimension: usize,
    name: String,
}

impl WordVectors {
    /// Load a vector file from disk
    pub fn load(path: &Path) -> Result<Self, EmbeddingError> {
        let file = std::fs::File::open(path).map_err(|e| {
            EmbeddingError::InitializationError(format!(
                "Failed to open word vectors {}: {}",
                path.display(),
                e
            ))
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "word-vectors".to_string());

        let vectors = Self::from_reader(BufReader::new(file), name)?;
        tracing::info!(
            "Loaded {} word vectors ({}D) from {}",
            vectors.len(),
            vectors.dimension,
            path.display()
        );
        Ok(vectors)
    }

    /// Parse vectors from any buffered reader
    pub fn from_reader<R: BufRead>(
        reader: R,
        name: impl Into<String>,
    ) -> Result<Self, EmbeddingError> {
        let mut vectors = HashMap::new();
        let mut dimension = 0usize;
        let mut skipped = 0usize;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                EmbeddingError::InitializationError(format!("Failed to read line {}: {}", line_no + 1, e))
            })?;
            let mut parts = line.split_whitespace();
            let Some(word) = parts.next() else {
                continue;
            };
            let values: Vec<&str> = parts.collect();

            if line_no == 0 && values.len() == 1 && is_header(word, values[0]) {
                continue;
            }

            let parsed: Result<Vec<f32>, _> = values.iter().map(|v| v.parse::<f32>()).collect();
            let Ok(vector) = parsed else {
                skipped += 1;
                continue;
            };
            if vector.is_empty() {
                skipped += 1;
                continue;
            }
            if dimension == 0 {
                dimension = vector.len();
            } else if vector.len() != dimension {
                skipped += 1;
                continue;
            }

            vectors.entry(word.to_string()).or_insert(vector);
        }

        if skipped > 0 {
            tracing::warn!("Skipped {} malformed word-vector lines", skipped);
        }

        if vectors.is_empty() {
            return Err(EmbeddingError::InitializationError(
                "Word-vector table is empty".to_string(),
            ));
        }

        Ok(Self {
            vectors,
            dimension,
            name: name.into(),
        })
    }

    /// Build a table from explicit pairs
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, EmbeddingError>
    where
        I: IntoIterator<Item = (S, Vec<f32>)>,
        S: Into<String>,
    {
        let mut vectors = HashMap::new();
        let mut dimension = 0usize;

        for (word, vector) in pairs {
            if dimension == 0 {
                dimension = vector.len();
            } else if vector.len() != dimension {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: dimension,
                    actual: vector.len(),
                });
            }
            vectors.insert(word.into(), vector);
        }

        if dimension == 0 {
            return Err(EmbeddingError::InvalidInput(
                "Word-vector table needs at least one non-empty vector".to_string(),
            ));
        }

        Ok(Self {
            vectors,
            dimension,
            name: "in-memory".to_string(),
        })
    }

    /// Number of words in the table
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

fn is_header(first: &str, second: &str) -> bool {
    first.parse::<usize>().is_ok() && second.parse::<usize>().is_ok()
}

impl WordEmbedder for WordVectors {
    fn embed_word(&self, word: &str) -> Result<Option<Vec<f32>>, EmbeddingError> {
        if let Some(vector) = self.vectors.get(word) {
            return Ok(Some(vector.clone()));
        }
        Ok(self.vectors.get(&word.to_lowercase()).cloned())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}
