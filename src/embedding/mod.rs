//! Word embedding backends
//!
//! The semantic strategy only needs "token -> dense vector, or nothing".
//! Architecture:
//! - `WordEmbedder` trait as the seam to the external model
//! - `WordVectors` for static word-vector files (GloVe / fastText text format)
//! - `FastEmbedProvider` for local neural embeddings (all-MiniLM-L6-v2, 384-dim)
//!
//! The backend is created once at startup and shared read-only by every
//! snapshot build and every request.
mod provider;
mod word_vectors;

pub use provider::{EmbeddingError, FastEmbedProvider, WordEmbedder};
pub use word_vectors::WordVectors;

use crate::config::EmbeddingConfig;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Why a semantic search could not produce a ranking.
///
/// Distinct from an empty result: an empty result means the query was
/// understood and nothing matched.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum EmbeddingUnavailable {
    #[error("query has no embeddable tokens")]
    NoEmbeddableTokens,

    #[error("no embedding model is configured")]
    NoModel,

    #[error("embedding model did not answer in time")]
    Timeout,

    #[error("embedding backend failed: {0}")]
    Backend(String),
}

/// Names accepted for `embedding.backend`
pub const SUPPORTED_BACKENDS: &[&str] = &["word-vectors", "fastembed", "none"];

/// Initialize the configured embedding backend.
///
/// Returns `None` when the backend is `"none"`; the hybrid strategy then
/// answers with [`EmbeddingUnavailable::NoModel`].
pub fn from_config(
    config: &EmbeddingConfig,
) -> Result<Option<Arc<dyn WordEmbedder>>, EmbeddingError> {
    match config.backend.as_str() {
        "none" => Ok(None),
        "word-vectors" => {
            let path = config.vectors_path.as_ref().ok_or_else(|| {
                EmbeddingError::InitializationError(
                    "embedding.vectors_path is required for the word-vectors backend".to_string(),
                )
            })?;
            let vectors = WordVectors::load(&crate::config::expand_tilde(path))?;
            Ok(Some(Arc::new(vectors)))
        }
        "fastembed" => Ok(Some(Arc::new(FastEmbedProvider::new(&config.model)?))),
        other => Err(EmbeddingError::InitializationError(format!(
            "Unsupported embedding backend: {}. Supported: {}",
            other,
            SUPPORTED_BACKENDS.join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_backend_yields_no_model() {
        let config = EmbeddingConfig {
            backend: "none".to_string(),
            ..EmbeddingConfig::default()
        };
        assert!(from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_word_vectors_backend_requires_path() {
        let config = EmbeddingConfig {
            backend: "word-vectors".to_string(),
            vectors_path: None,
            ..EmbeddingConfig::default()
        };
        assert!(matches!(
            from_config(&config),
            Err(EmbeddingError::InitializationError(_))
        ));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let config = EmbeddingConfig {
            backend: "flair".to_string(),
            ..EmbeddingConfig::default()
        };
        assert!(from_config(&config).is_err());
    }

    #[test]
    fn test_unavailable_serializes_with_kind() {
        let json = serde_json::to_value(EmbeddingUnavailable::NoEmbeddableTokens).unwrap();
        assert_eq!(json["kind"], "no_embeddable_tokens");

        let json = serde_json::to_value(EmbeddingUnavailable::Backend("boom".into())).unwrap();
        assert_eq!(json["kind"], "backend");
        assert_eq!(json["detail"], "boom");
    }
}
