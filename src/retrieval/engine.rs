use super::{correct, exact_matches, HybridScorer, Strategy};
use crate::config::Config;
use crate::corpus::Snapshot;
use crate::embedding::{EmbeddingUnavailable, WordEmbedder};
use crate::error::Result;
use crate::index::embed_text;
use crate::lemma::{LemmaReducer, Lemmatizer};
use crate::suggest::BigramTable;
use crate::text::{first_token, last_token, normalize, query_terms};
use ndarray::{Array1, ArrayView1};
use std::sync::Arc;
use std::time::Duration;

/// One matched record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Position of the record in the snapshot
    pub position: usize,
    /// Present only for ranking strategies
    pub score: Option<f64>,
}

/// Matches plus the query that actually produced them
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults {
    pub query: String,
    pub hits: Vec<Hit>,
}

impl SearchResults {
    fn unscored(query: String, positions: Vec<usize>) -> Self {
        let hits = positions
            .into_iter()
            .map(|position| Hit {
                position,
                score: None,
            })
            .collect();
        Self { query, hits }
    }

    fn scored(query: String, ranked: Vec<(usize, f64)>) -> Self {
        let hits = ranked
            .into_iter()
            .map(|(position, score)| Hit {
                position,
                score: Some(score),
            })
            .collect();
        Self { query, hits }
    }
}

/// Result of running a strategy
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(SearchResults),
    /// The hybrid strategy could not embed; not the same as zero matches
    EmbeddingUnavailable {
        query: String,
        reason: EmbeddingUnavailable,
    },
}

impl SearchOutcome {
    /// The effective query echoed to the caller
    pub fn query(&self) -> &str {
        match self {
            SearchOutcome::Found(results) => &results.query,
            SearchOutcome::EmbeddingUnavailable { query, .. } => query,
        }
    }

    pub fn hits(&self) -> &[Hit] {
        match self {
            SearchOutcome::Found(results) => &results.hits,
            SearchOutcome::EmbeddingUnavailable { .. } => &[],
        }
    }
}

/// Shared, read-only query collaborators.
///
/// Built once at startup; every request borrows it together with the
/// snapshot it started on.
pub struct SearchEngine {
    lemma: Arc<dyn LemmaReducer>,
    bigrams: Arc<BigramTable>,
    embedder: Option<Arc<dyn WordEmbedder>>,
    hybrid: HybridScorer,
}

impl SearchEngine {
    pub fn new(
        lemma: Arc<dyn LemmaReducer>,
        bigrams: Arc<BigramTable>,
        embedder: Option<Arc<dyn WordEmbedder>>,
    ) -> Self {
        Self {
            lemma,
            bigrams,
            embedder,
            hybrid: HybridScorer::default(),
        }
    }

    /// Load the lemma reducer and bigram table named by the config
    pub fn from_config(config: &Config, embedder: Option<Arc<dyn WordEmbedder>>) -> Result<Self> {
        let lemma = Lemmatizer::from_config(&config.lemma)?;
        let bigrams = match &config.bigrams.index_path {
            Some(path) => BigramTable::load(&crate::config::expand_tilde(path))?,
            None => {
                tracing::info!("No bigram table configured; expansion disabled");
                BigramTable::empty()
            }
        };
        Ok(Self::new(Arc::new(lemma), Arc::new(bigrams), embedder))
    }

    pub fn with_scorer(mut self, hybrid: HybridScorer) -> Self {
        self.hybrid = hybrid;
        self
    }

    pub fn embedder(&self) -> Option<&Arc<dyn WordEmbedder>> {
        self.embedder.as_ref()
    }

    /// Run `strategy` against `snapshot`.
    ///
    /// Query embedding for the hybrid strategy runs inline; use
    /// [`SearchEngine::search_with_timeout`] on async paths.
    pub fn search(&self, snapshot: &Snapshot, strategy: Strategy, raw: &str) -> SearchOutcome {
        if let Some(outcome) = self.short_circuit(snapshot, strategy, raw) {
            return outcome;
        }
        if strategy != Strategy::Hybrid {
            return SearchOutcome::Found(self.lexical(snapshot, strategy, raw));
        }

        match self.embed_query(raw) {
            Ok(vector) => self.rank_hybrid(snapshot, raw, vector.view()),
            Err(reason) => unavailable(raw, reason),
        }
    }

    /// Like [`SearchEngine::search`], but query embedding runs on the
    /// blocking pool and is abandoned after `timeout`.
    pub async fn search_with_timeout(
        self: &Arc<Self>,
        snapshot: &Snapshot,
        strategy: Strategy,
        raw: &str,
        timeout: Duration,
    ) -> SearchOutcome {
        if let Some(outcome) = self.short_circuit(snapshot, strategy, raw) {
            return outcome;
        }
        if strategy != Strategy::Hybrid {
            return SearchOutcome::Found(self.lexical(snapshot, strategy, raw));
        }

        let engine = Arc::clone(self);
        let text = raw.to_string();
        let task = tokio::task::spawn_blocking(move || engine.embed_query(&text));
        let embedded = match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(EmbeddingUnavailable::Backend(join_error.to_string())),
            Err(_) => {
                tracing::warn!("Query embedding exceeded {:?}", timeout);
                Err(EmbeddingUnavailable::Timeout)
            }
        };

        match embedded {
            Ok(vector) => self.rank_hybrid(snapshot, raw, vector.view()),
            Err(reason) => unavailable(raw, reason),
        }
    }

    /// Mean vector of the query's embeddable words
    pub fn embed_query(&self, raw: &str) -> std::result::Result<Array1<f32>, EmbeddingUnavailable> {
        let embedder = self.embedder.as_ref().ok_or(EmbeddingUnavailable::NoModel)?;
        match embed_text(raw, embedder.as_ref()) {
            Ok(Some(vector)) => Ok(vector),
            Ok(None) => Err(EmbeddingUnavailable::NoEmbeddableTokens),
            Err(e) => Err(EmbeddingUnavailable::Backend(e.to_string())),
        }
    }

    /// Hybrid ranking for an already embedded query
    pub fn rank_hybrid(
        &self,
        snapshot: &Snapshot,
        raw: &str,
        query_vector: ArrayView1<'_, f32>,
    ) -> SearchOutcome {
        let semantic = match snapshot.semantic() {
            Ok(semantic) => semantic,
            Err(reason) => return unavailable(raw, reason),
        };
        if query_vector.len() != semantic.dimension() {
            return unavailable(
                raw,
                EmbeddingUnavailable::Backend(format!(
                    "query vector has dimension {}, index has {}",
                    query_vector.len(),
                    semantic.dimension()
                )),
            );
        }

        let ranking = self
            .hybrid
            .rank(snapshot, semantic, query_vector, &query_terms(raw));
        let query = ranking.anchor.unwrap_or_else(|| normalize(raw));
        SearchOutcome::Found(SearchResults::scored(query, ranking.ranked))
    }

    /// Outcomes decided before any lookup: the empty query, and hybrid
    /// requests the snapshot cannot serve.
    fn short_circuit(
        &self,
        snapshot: &Snapshot,
        strategy: Strategy,
        raw: &str,
    ) -> Option<SearchOutcome> {
        let normalized = normalize(raw);
        if normalized.is_empty() {
            return Some(SearchOutcome::Found(SearchResults::unscored(
                String::new(),
                exact_matches(snapshot, ""),
            )));
        }
        if strategy != Strategy::Hybrid {
            return None;
        }

        match snapshot.semantic() {
            Err(reason) => Some(unavailable(raw, reason)),
            Ok(semantic) if semantic.is_empty() => Some(SearchOutcome::Found(
                SearchResults::unscored(normalized, Vec::new()),
            )),
            Ok(_) => None,
        }
    }

    fn lexical(&self, snapshot: &Snapshot, strategy: Strategy, raw: &str) -> SearchResults {
        let normalized = normalize(raw);
        match strategy {
            Strategy::Exact => {
                let positions = exact_matches(snapshot, &normalized);
                SearchResults::unscored(normalized, positions)
            }
            Strategy::LemmaReduced => {
                let reduced = first_token(&normalized)
                    .map(|token| self.lemma.reduce(&token, snapshot))
                    .unwrap_or_default();
                tracing::debug!("Lemma reduction '{}' -> '{}'", normalized, reduced);
                let positions = exact_matches(snapshot, &reduced);
                SearchResults::unscored(reduced, positions)
            }
            Strategy::FuzzyCorrected => {
                let positions = exact_matches(snapshot, &normalized);
                if !positions.is_empty() {
                    return SearchResults::unscored(normalized, positions);
                }
                match correct(&normalized, snapshot.vocabulary()) {
                    Some(correction) => {
                        tracing::debug!(
                            "Corrected '{}' -> '{}' (distance {})",
                            normalized,
                            correction.term,
                            correction.distance
                        );
                        let positions = exact_matches(snapshot, &correction.term);
                        SearchResults::unscored(correction.term, positions)
                    }
                    None => SearchResults::unscored(normalized, Vec::new()),
                }
            }
            Strategy::BigramExpanded => {
                let suggestion = last_token(&normalized)
                    .and_then(|token| self.bigrams.top_suggestion(&token).map(str::to_string));
                let expanded = match suggestion {
                    Some(next) => {
                        tracing::debug!("Expanded '{}' with '{}'", normalized, next);
                        format!("{} {}", normalized, next)
                    }
                    None => normalized,
                };
                let positions = exact_matches(snapshot, &expanded);
                SearchResults::unscored(expanded, positions)
            }
            Strategy::Bm25Ranked => {
                let ranked = snapshot.bm25().rank(&query_terms(&normalized));
                SearchResults::scored(normalized, ranked)
            }
            Strategy::Hybrid => SearchResults::unscored(normalized, Vec::new()),
        }
    }
}

fn unavailable(raw: &str, reason: EmbeddingUnavailable) -> SearchOutcome {
    tracing::debug!("Embedding unavailable: {}", reason);
    SearchOutcome::EmbeddingUnavailable {
        query: normalize(raw),
        reason,
    }
}
