//! Hybrid lexical-semantic ranking
//!
//! Candidates are the records tagged with the semantic anchor (the keyword
//! closest to the query vector). Each candidate is scored as
//! `cosine_weight * best keyword cosine + bm25_weight * BM25 / max BM25`.

use crate::corpus::Snapshot;
use crate::index::SemanticIndex;
use ndarray::ArrayView1;
use thiserror::Error;

/// Weight of the candidate's best keyword cosine similarity
pub const COSINE_WEIGHT: f64 = 0.5;
/// Weight of the candidate's max-normalized BM25 score
pub const BM25_WEIGHT: f64 = 0.5;

#[derive(Error, Debug)]
pub enum HybridError {
    #[error("Invalid weight configuration: weights must be non-negative and sum to a positive value")]
    InvalidWeights,
}

/// Ranked candidates plus the anchor they were selected by
#[derive(Debug, Clone, PartialEq)]
pub struct HybridRanking {
    /// `None` when the semantic index holds no keyword
    pub anchor: Option<String>,
    pub ranked: Vec<(usize, f64)>,
}

#[derive(Debug, Clone, Copy)]
pub struct HybridScorer {
    cosine_weight: f64,
    bm25_weight: f64,
}

impl Default for HybridScorer {
    fn default() -> Self {
        Self {
            cosine_weight: COSINE_WEIGHT,
            bm25_weight: BM25_WEIGHT,
        }
    }
}

impl HybridScorer {
    pub fn with_weights(cosine_weight: f64, bm25_weight: f64) -> Result<Self, HybridError> {
        if cosine_weight < 0.0 || bm25_weight < 0.0 || cosine_weight + bm25_weight <= 0.0 {
            return Err(HybridError::InvalidWeights);
        }
        Ok(Self {
            cosine_weight,
            bm25_weight,
        })
    }

    /// Rank the snapshot's records for one query.
    ///
    /// BM25 scores are computed over every record and divided by their
    /// maximum; a non-positive maximum makes the BM25 term 0 for everyone.
    /// Only candidates with a positive combined score are kept, best first,
    /// equal scores in corpus order.
    pub fn rank(
        &self,
        snapshot: &Snapshot,
        semantic: &SemanticIndex,
        query_vector: ArrayView1<'_, f32>,
        query_terms: &[String],
    ) -> HybridRanking {
        let similarities = semantic.similarities(query_vector);
        let Some((anchor, anchor_score)) = similarities.anchor() else {
            return HybridRanking {
                anchor: None,
                ranked: Vec::new(),
            };
        };
        tracing::debug!("Semantic anchor '{}' (cosine {:.4})", anchor, anchor_score);

        let bm25 = snapshot.bm25().scores(query_terms);
        let max_bm25 = bm25.iter().copied().fold(0.0_f64, f64::max);

        let mut ranked: Vec<(usize, f64)> = snapshot
            .records()
            .iter()
            .filter(|record| record.has_keyword(anchor))
            .map(|record| {
                let position = record.position();
                let cosine = similarities.best_for(record.keywords());
                let normalized = if max_bm25 > 0.0 {
                    bm25[position] / max_bm25
                } else {
                    0.0
                };
                (position, self.cosine_weight * cosine + self.bm25_weight * normalized)
            })
            .filter(|(_, score)| *score > 0.0)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        HybridRanking {
            anchor: Some(anchor.to_string()),
            ranked,
        }
    }
}
