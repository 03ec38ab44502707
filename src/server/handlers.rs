use super::{reload_snapshot, AppState};
use crate::corpus::SnapshotStats;
use crate::embedding::EmbeddingUnavailable;
use crate::retrieval::{SearchOutcome, SearchResponse, Strategy};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::Instrument;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    /// Missing means the empty query
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub snapshot: SnapshotStats,
}

/// HTTP status for a search outcome
pub fn status_for(outcome: &SearchOutcome) -> StatusCode {
    match outcome {
        SearchOutcome::Found(_) => StatusCode::OK,
        SearchOutcome::EmbeddingUnavailable { reason, .. } => match reason {
            EmbeddingUnavailable::NoEmbeddableTokens => StatusCode::UNPROCESSABLE_ENTITY,
            EmbeddingUnavailable::NoModel | EmbeddingUnavailable::Backend(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            EmbeddingUnavailable::Timeout => StatusCode::GATEWAY_TIMEOUT,
        },
    }
}

pub async fn handle_search(
    State(state): State<AppState>,
    Path(version): Path<String>,
    Query(params): Query<SearchParams>,
) -> Response {
    let strategy = match version.parse::<Strategy>() {
        Ok(strategy) => strategy,
        Err(e) => {
            tracing::debug!("Rejected search version '{}'", version);
            return (StatusCode::NOT_FOUND, Json(json!({ "error": e.to_string() }))).into_response();
        }
    };

    // The request runs to completion against this snapshot even if a
    // reload publishes a newer one meanwhile
    let snapshot = state.store.current();
    let span = tracing::info_span!(
        "search",
        request_id = %Uuid::new_v4(),
        version = %version,
        snapshot = snapshot.version()
    );

    async move {
        let outcome = state
            .engine
            .search_with_timeout(&snapshot, strategy, &params.q, state.embed_timeout)
            .await;
        let status = status_for(&outcome);
        let response = SearchResponse::from_outcome(&snapshot, &outcome);
        tracing::debug!(
            query = %response.query,
            total = response.total,
            status = status.as_u16(),
            "Search complete"
        );
        (status, Json(response)).into_response()
    }
    .instrument(span)
    .await
}

pub async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        snapshot: state.store.current().stats(),
    })
}

pub async fn handle_reload(State(state): State<AppState>) -> Response {
    let span = tracing::info_span!("reload", request_id = %Uuid::new_v4());
    async move {
        match reload_snapshot(state.store.clone()).await {
            Ok(snapshot) => (StatusCode::OK, Json(snapshot.stats())).into_response(),
            Err(e) => {
                tracing::warn!("Reload rejected: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "error": e.to_string() })),
                )
                    .into_response()
            }
        }
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::SearchResults;

    #[test]
    fn test_status_codes() {
        let found = SearchOutcome::Found(SearchResults {
            query: "alpha".to_string(),
            hits: Vec::new(),
        });
        assert_eq!(status_for(&found), StatusCode::OK);

        let cases = [
            (EmbeddingUnavailable::NoEmbeddableTokens, StatusCode::UNPROCESSABLE_ENTITY),
            (EmbeddingUnavailable::NoModel, StatusCode::SERVICE_UNAVAILABLE),
            (EmbeddingUnavailable::Backend("down".to_string()), StatusCode::SERVICE_UNAVAILABLE),
            (EmbeddingUnavailable::Timeout, StatusCode::GATEWAY_TIMEOUT),
        ];
        for (reason, expected) in cases {
            let outcome = SearchOutcome::EmbeddingUnavailable {
                query: "q".to_string(),
                reason,
            };
            assert_eq!(status_for(&outcome), expected);
        }
    }
}
