use super::{LoadedCorpus, Record, Vocabulary};
use crate::embedding::{EmbeddingUnavailable, WordEmbedder};
use crate::index::{Bm25Index, SemanticIndex};
use crate::lemma::{Lemmatizer, StemIndex};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Immutable view of the corpus and every index derived from it.
///
/// Indexes are built in the constructor and never rebuilt, so they always
/// describe exactly these records.
#[derive(Debug)]
pub struct Snapshot {
    version: u64,
    loaded_at: DateTime<Utc>,
    fingerprint: String,
    source: Option<PathBuf>,
    malformed_rows: usize,
    records: Vec<Record>,
    vocabulary: Vocabulary,
    bm25: Bm25Index,
    semantic: Result<SemanticIndex, EmbeddingUnavailable>,
    stems: OnceLock<StemIndex>,
}

impl Snapshot {
    /// Build a snapshot and its derived indexes
    pub fn build(version: u64, corpus: LoadedCorpus, embedder: Option<&dyn WordEmbedder>) -> Self {
        let LoadedCorpus {
            records,
            fingerprint,
            malformed_rows,
            source,
        } = corpus;

        let vocabulary = Vocabulary::from_records(&records);
        let bm25 = Bm25Index::build(records.iter().map(Record::keywords));
        let semantic = match embedder {
            None => Err(EmbeddingUnavailable::NoModel),
            Some(embedder) => SemanticIndex::build(&vocabulary, embedder).map_err(|e| {
                tracing::warn!("Semantic index unavailable for snapshot {}: {}", version, e);
                EmbeddingUnavailable::Backend(e.to_string())
            }),
        };

        tracing::info!(
            "Built snapshot {}: {} records, {} keywords, {} embedded",
            version,
            records.len(),
            vocabulary.len(),
            semantic.as_ref().map(SemanticIndex::len).unwrap_or(0)
        );

        Self {
            version,
            loaded_at: Utc::now(),
            fingerprint,
            source,
            malformed_rows,
            records,
            vocabulary,
            bm25,
            semantic,
            stems: OnceLock::new(),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record(&self, position: usize) -> Option<&Record> {
        self.records.get(position)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn bm25(&self) -> &Bm25Index {
        &self.bm25
    }

    /// Semantic index, or why it could not be built
    pub fn semantic(&self) -> Result<&SemanticIndex, EmbeddingUnavailable> {
        self.semantic.as_ref().map_err(Clone::clone)
    }

    /// Stem -> keyword table for `lemmatizer`.
    ///
    /// Built on first use and kept for the snapshot's lifetime; a lemmatizer
    /// for another language gets a fresh, uncached table.
    pub fn stem_index(&self, lemmatizer: &Lemmatizer) -> Cow<'_, StemIndex> {
        let cached = self
            .stems
            .get_or_init(|| StemIndex::build(lemmatizer, &self.vocabulary));
        if cached.language() == lemmatizer.language() {
            Cow::Borrowed(cached)
        } else {
            Cow::Owned(StemIndex::build(lemmatizer, &self.vocabulary))
        }
    }

    pub fn stats(&self) -> SnapshotStats {
        SnapshotStats {
            version: self.version,
            records: self.records.len(),
            vocabulary: self.vocabulary.len(),
            semantic_keywords: self.semantic.as_ref().ok().map(SemanticIndex::len),
            malformed_rows: self.malformed_rows,
            fingerprint: self.fingerprint.clone(),
            loaded_at: self.loaded_at,
            source: self.source.clone(),
        }
    }
}

/// Summary of a published snapshot
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotStats {
    pub version: u64,
    pub records: usize,
    pub vocabulary: usize,
    pub semantic_keywords: Option<usize>,
    pub malformed_rows: usize,
    pub fingerprint: String,
    pub loaded_at: DateTime<Utc>,
    pub source: Option<PathBuf>,
}
