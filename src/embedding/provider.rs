/// Embedding provider trait and FastEmbed implementation
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Model initialization failed: {0}")]
    InitializationError(String),

    #[error("Embedding generation failed: {0}")]
    GenerationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Trait for word-level embedding backends
///
/// `Ok(None)` means the backend has no vector for the word (out of
/// vocabulary); `Err` means the backend itself failed.
pub trait WordEmbedder: Send + Sync {
    /// Embed a single word
    fn embed_word(&self, word: &str) -> Result<Option<Vec<f32>>, EmbeddingError>;

    /// Embed several words, preserving input order
    fn embed_words(&self, words: &[String]) -> Result<Vec<Option<Vec<f32>>>, EmbeddingError> {
        words.iter().map(|word| self.embed_word(word)).collect()
    }

    /// Get the embedding dimension
    fn dimension(&self) -> usize;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// FastEmbed provider for local embedding generation
///
/// Uses all-MiniLM-L6-v2 model (384 dimensions) by default.
/// Each word is embedded on its own, so the result behaves like a word
/// embedding table with no out-of-vocabulary words.
pub struct FastEmbedProvider {
    model: Arc<TextEmbedding>,
    model_name: String,
    dimension: usize,
}

impl FastEmbedProvider {
    /// Create a new FastEmbed provider with the specified model
    ///
    /// **Important**: Models are downloaded on-demand to `~/.cache/huggingface/`
    /// on first use. The smallest model (all-MiniLM-L6-v2) is ~90MB.
    pub fn new(model_name: &str) -> Result<Self, EmbeddingError> {
        let (embedding_model, dimension, model_size_mb) = match model_name {
            "all-MiniLM-L6-v2" | "all-minilm-l6-v2" => (EmbeddingModel::AllMiniLML6V2, 384, 90),
            "bge-small-en-v1.5" => (EmbeddingModel::BGESmallENV15, 384, 130),
            "bge-base-en-v1.5" => (EmbeddingModel::BGEBaseENV15, 768, 440),
            _ => {
                return Err(EmbeddingError::InitializationError(format!(
                    "Unsupported model: {}. Supported: all-MiniLM-L6-v2, bge-small-en-v1.5, bge-base-en-v1.5",
                    model_name
                )));
            }
        };

        tracing::info!(
            "Initializing embedding model: {} ({}D, ~{}MB download if not cached)",
            model_name,
            dimension,
            model_size_mb
        );

        let init_options = InitOptions::new(embedding_model).with_show_download_progress(true);

        let model = TextEmbedding::try_new(init_options)
            .map_err(|e| EmbeddingError::InitializationError(e.to_string()))?;

        Ok(Self {
            model: Arc::new(model),
            model_name: model_name.to_string(),
            dimension,
        })
    }

    /// Create provider with default model (all-MiniLM-L6-v2)
    pub fn with_default_model() -> Result<Self, EmbeddingError> {
        Self::new("all-MiniLM-L6-v2")
    }

    fn check_dimension(&self, embedding: &[f32]) -> Result<(), EmbeddingError> {
        if embedding.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }
        Ok(())
    }
}

impl WordEmbedder for FastEmbedProvider {
    fn embed_word(&self, word: &str) -> Result<Option<Vec<f32>>, EmbeddingError> {
        if word.is_empty() {
            return Ok(None);
        }

        let mut embeddings = self
            .model
            .embed(vec![word.to_string()], None)
            .map_err(|e| EmbeddingError::GenerationError(e.to_string()))?;

        let embedding = embeddings.pop().ok_or_else(|| {
            EmbeddingError::GenerationError("No embeddings generated".to_string())
        })?;
        self.check_dimension(&embedding)?;

        Ok(Some(embedding))
    }

    fn embed_words(&self, words: &[String]) -> Result<Vec<Option<Vec<f32>>>, EmbeddingError> {
        let valid: Vec<String> = words.iter().filter(|w| !w.is_empty()).cloned().collect();
        if valid.is_empty() {
            return Ok(vec![None; words.len()]);
        }

        let embeddings = self
            .model
            .embed(valid, None)
            .map_err(|e| EmbeddingError::GenerationError(e.to_string()))?;

        let mut embeddings = embeddings.into_iter();
        let mut out = Vec::with_capacity(words.len());
        for word in words {
            if word.is_empty() {
                out.push(None);
                continue;
            }
            let embedding = embeddings.next().ok_or_else(|| {
                EmbeddingError::GenerationError("Fewer embeddings than inputs".to_string())
            })?;
            self.check_dimension(&embedding)?;
            out.push(Some(embedding));
        }

        Ok(out)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_model_rejected() {
        let result = FastEmbedProvider::new("word2vec-google-news");
        assert!(matches!(
            result,
            Err(EmbeddingError::InitializationError(_))
        ));
    }

    #[test]
    #[ignore] // Requires model download (~90MB) - run with: cargo test -- --ignored
    fn test_provider_creation() {
        let provider = FastEmbedProvider::with_default_model().unwrap();
        assert_eq!(provider.dimension(), 384);
        assert_eq!(provider.model_name(), "all-MiniLM-L6-v2");
    }

    #[test]
    #[ignore] // Requires model download (~90MB) - run with: cargo test -- --ignored
    fn test_batch_keeps_positions() {
        let provider = FastEmbedProvider::with_default_model().unwrap();
        let words = vec!["network".to_string(), String::new(), "security".to_string()];

        let embeddings = provider.embed_words(&words).unwrap();
        assert_eq!(embeddings.len(), 3);
        assert!(embeddings[0].is_some());
        assert!(embeddings[1].is_none());
        assert_eq!(embeddings[2].as_ref().unwrap().len(), 384);
    }

    #[test]
    #[ignore] // Requires model download (~90MB) - run with: cargo test -- --ignored
    fn test_related_words_are_closer() {
        let provider = FastEmbedProvider::with_default_model().unwrap();

        let cat = provider.embed_word("cat").unwrap().unwrap();
        let kitten = provider.embed_word("kitten").unwrap().unwrap();
        let compiler = provider.embed_word("compiler").unwrap().unwrap();

        assert!(cosine(&cat, &kitten) > cosine(&cat, &compiler));
    }

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        dot / (mag_a * mag_b)
    }
}
