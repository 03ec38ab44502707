use crate::corpus::CorpusError;
use crate::embedding::EmbeddingError;
use crate::lemma::LemmaError;
use crate::suggest::BigramError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for tagsearch
#[derive(Error, Debug)]
pub enum TagsearchError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation errors
    #[error("Configuration validation failed: {errors:?}")]
    ConfigValidation { errors: Vec<ValidationError> },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Invalid configuration value
    #[error("Invalid configuration value at {path}: {message}")]
    InvalidConfigValue { path: String, message: String },

    /// The corpus could not be loaded; no snapshot was activated
    #[error("Corpus data unavailable at {path}: {source}")]
    DataUnavailable {
        path: PathBuf,
        #[source]
        source: CorpusError,
    },

    /// Bigram suggestion table could not be loaded
    #[error("Bigram table error: {0}")]
    Bigram(#[from] BigramError),

    /// Lemma reducer could not be initialized
    #[error("Lemma reducer error: {0}")]
    Lemma(#[from] LemmaError),

    /// Embedding collaborator failed to initialize or respond
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// HTTP server errors
    #[error("Server error: {0}")]
    Server(String),

    /// IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    /// JSON errors
    #[error("JSON error: {context}: {source}")]
    Json {
        source: serde_json::Error,
        context: String,
    },

    /// Generic errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Path to the configuration key that failed validation
    pub path: String,
    /// Error message describing the validation failure
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for tagsearch operations
pub type Result<T> = std::result::Result<T, TagsearchError>;
