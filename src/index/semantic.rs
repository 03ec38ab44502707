//! Keyword embeddings and cosine similarity.

use crate::embedding::{EmbeddingError, WordEmbedder};
use crate::text::word_tokens;
use ahash::{HashMap, HashMapExt};
use ndarray::{Array1, ArrayView1};
use std::collections::{BTreeMap, BTreeSet};

/// Embedding vector for every embeddable vocabulary keyword.
///
/// A keyword's vector is the mean of its word vectors; keywords with no
/// embeddable word are not indexed. Iteration order is lexicographic.
#[derive(Debug, Clone)]
pub struct SemanticIndex {
    vectors: BTreeMap<String, Array1<f32>>,
    dimension: usize,
    model_name: String,
}

impl SemanticIndex {
    /// Embed every keyword of the vocabulary.
    ///
    /// All distinct words are sent to the embedder in a single batch.
    pub fn build<'a, I>(keywords: I, embedder: &dyn WordEmbedder) -> Result<Self, EmbeddingError>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let keywords: Vec<(&String, Vec<String>)> = keywords
            .into_iter()
            .map(|keyword| (keyword, word_tokens(keyword)))
            .collect();

        let distinct: BTreeSet<&String> = keywords.iter().flat_map(|(_, words)| words).collect();
        let distinct: Vec<String> = distinct.into_iter().cloned().collect();
        let embedded = embedder.embed_words(&distinct)?;

        let dimension = embedder.dimension();
        let mut word_vectors: HashMap<&str, Vec<f32>> = HashMap::with_capacity(distinct.len());
        for (word, vector) in distinct.iter().zip(embedded) {
            if let Some(vector) = vector {
                check_dimension(dimension, &vector)?;
                word_vectors.insert(word.as_str(), vector);
            }
        }

        let mut vectors = BTreeMap::new();
        for (keyword, words) in &keywords {
            let found = words.iter().filter_map(|w| word_vectors.get(w.as_str()));
            if let Some(mean) = mean_vector(found, dimension) {
                vectors.insert((*keyword).clone(), mean);
            }
        }

        tracing::debug!(
            "Semantic index: {} of {} keywords embedded with {}",
            vectors.len(),
            keywords.len(),
            embedder.model_name()
        );

        Ok(Self {
            vectors,
            dimension,
            model_name: embedder.model_name().to_string(),
        })
    }

    /// Number of embedded keywords
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Check if no keyword could be embedded
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Vector dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Name of the model the vectors came from
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Vector of an indexed keyword
    pub fn vector(&self, keyword: &str) -> Option<ArrayView1<'_, f32>> {
        self.vectors.get(keyword).map(|v| v.view())
    }

    /// Cosine similarity of the query vector to every indexed keyword
    pub fn similarities(&self, query: ArrayView1<'_, f32>) -> SimilarityTable {
        let scores = self
            .vectors
            .iter()
            .map(|(keyword, vector)| (keyword.clone(), cosine_similarity(query, vector.view())))
            .collect();
        SimilarityTable { scores }
    }
}

/// Keyword -> cosine similarity to one query
#[derive(Debug, Clone, Default)]
pub struct SimilarityTable {
    scores: BTreeMap<String, f64>,
}

impl SimilarityTable {
    /// Similarity of a keyword, if it was embedded
    pub fn get(&self, keyword: &str) -> Option<f64> {
        self.scores.get(keyword).copied()
    }

    /// Most similar keyword; ties go to the lexicographically smallest
    pub fn anchor(&self) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for (keyword, &score) in &self.scores {
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((keyword.as_str(), score)),
            }
        }
        best
    }

    /// Highest similarity among a record's keywords.
    ///
    /// Keywords without a vector count as 0; an empty list scores 0.
    pub fn best_for(&self, keywords: &[String]) -> f64 {
        keywords
            .iter()
            .map(|keyword| self.get(keyword).unwrap_or(0.0))
            .reduce(f64::max)
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Embed free text as the mean of its embeddable word vectors.
///
/// `Ok(None)` when no word of the text has a vector.
pub fn embed_text(
    text: &str,
    embedder: &dyn WordEmbedder,
) -> Result<Option<Array1<f32>>, EmbeddingError> {
    let words = word_tokens(text);
    if words.is_empty() {
        return Ok(None);
    }

    let dimension = embedder.dimension();
    let embedded = embedder.embed_words(&words)?;
    let mut found = Vec::with_capacity(embedded.len());
    for vector in embedded.into_iter().flatten() {
        check_dimension(dimension, &vector)?;
        found.push(vector);
    }

    Ok(mean_vector(found.iter(), dimension))
}

/// Cosine similarity; 0 when either vector has zero length
pub fn cosine_similarity(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f64 {
    let norm_a = f64::from(a.dot(&a)).sqrt();
    let norm_b = f64::from(b.dot(&b)).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    f64::from(a.dot(&b)) / (norm_a * norm_b)
}

fn mean_vector<'a, I>(vectors: I, dimension: usize) -> Option<Array1<f32>>
where
    I: IntoIterator<Item = &'a Vec<f32>>,
{
    let mut sum = Array1::<f32>::zeros(dimension);
    let mut count = 0usize;
    for vector in vectors {
        sum += &ArrayView1::from(vector.as_slice());
        count += 1;
    }
    if count == 0 {
        return None;
    }
    let n = count as f32;
    sum.mapv_inplace(|v| v / n);
    Some(sum)
}

fn check_dimension(expected: usize, vector: &[f32]) -> Result<(), EmbeddingError> {
    if vector.len() != expected {
        return Err(EmbeddingError::DimensionMismatch {
            expected,
            actual: vector.len(),
        });
    }
    Ok(())
}
