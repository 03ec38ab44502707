//! JSON response envelope shared by every strategy

use super::SearchOutcome;
use crate::corpus::Snapshot;
use crate::embedding::EmbeddingUnavailable;
use serde::Serialize;
use serde_json::{Map, Value};

/// `{query, total, results}`, plus `error` when embedding was unavailable
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub total: usize,
    pub results: Vec<ScoredRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

/// Record fields in column order, then `score` for ranking strategies
#[derive(Debug, Clone, Serialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub reason: EmbeddingUnavailable,
}

impl SearchResponse {
    /// Resolve hit positions against the snapshot they came from
    pub fn from_outcome(snapshot: &Snapshot, outcome: &SearchOutcome) -> Self {
        match outcome {
            SearchOutcome::Found(found) => {
                let results: Vec<ScoredRecord> = found
                    .hits
                    .iter()
                    .filter_map(|hit| {
                        snapshot.record(hit.position).map(|record| ScoredRecord {
                            fields: record.fields().clone(),
                            score: hit.score,
                        })
                    })
                    .collect();
                Self {
                    query: found.query.clone(),
                    total: results.len(),
                    results,
                    error: None,
                }
            }
            SearchOutcome::EmbeddingUnavailable { query, reason } => Self {
                query: query.clone(),
                total: 0,
                results: Vec::new(),
                error: Some(ErrorBody {
                    code: "embedding_unavailable",
                    reason: reason.clone(),
                }),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::LoadedCorpus;
    use crate::retrieval::{Hit, SearchResults};
    use serde_json::json;

    fn snapshot() -> Snapshot {
        let csv = "id,title,keywords\n1,First,alpha\n2,Second,beta\n";
        Snapshot::build(1, LoadedCorpus::from_csv(csv.as_bytes(), "keywords", ",").unwrap(), None)
    }

    #[test]
    fn test_unscored_envelope() {
        let outcome = SearchOutcome::Found(SearchResults {
            query: "beta".to_string(),
            hits: vec![Hit {
                position: 1,
                score: None,
            }],
        });
        let response = SearchResponse::from_outcome(&snapshot(), &outcome);

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "query": "beta",
                "total": 1,
                "results": [{"id": "2", "title": "Second", "keywords": "beta"}]
            })
        );
    }

    #[test]
    fn test_scored_envelope_keeps_column_order() {
        let outcome = SearchOutcome::Found(SearchResults {
            query: "alpha".to_string(),
            hits: vec![Hit {
                position: 0,
                score: Some(0.5),
            }],
        });
        let response = SearchResponse::from_outcome(&snapshot(), &outcome);
        let body = serde_json::to_string(&response).unwrap();

        assert_eq!(
            body,
            r#"{"query":"alpha","total":1,"results":[{"id":"1","title":"First","keywords":"alpha","score":0.5}]}"#
        );
    }

    #[test]
    fn test_unavailable_envelope() {
        let outcome = SearchOutcome::EmbeddingUnavailable {
            query: "???".to_string(),
            reason: EmbeddingUnavailable::NoEmbeddableTokens,
        };
        let response = SearchResponse::from_outcome(&snapshot(), &outcome);

        assert!(response.is_error());
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "query": "???",
                "total": 0,
                "results": [],
                "error": {"code": "embedding_unavailable", "reason": {"kind": "no_embeddable_tokens"}}
            })
        );
    }
}
