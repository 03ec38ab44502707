//! Configuration management for tagsearch
//!
//! A TOML file supplies the corpus location, the optional bigram and lemma
//! tables, the embedding backend and the server address. Environment
//! variables of the form `TAGSEARCH_SECTION__KEY` override file values and
//! are applied before validation.

use crate::error::{Result, TagsearchError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

/// Current configuration schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

const ENV_PREFIX: &str = "TAGSEARCH_";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub bigrams: BigramConfig,
    #[serde(default)]
    pub lemma: LemmaConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Corpus table location and layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    pub reports_path: PathBuf,
    #[serde(default = "default_id_column")]
    pub id_column: String,
    #[serde(default = "default_keywords_column")]
    pub keywords_column: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

fn default_id_column() -> String {
    "id".to_string()
}

fn default_keywords_column() -> String {
    "keywords".to_string()
}

fn default_delimiter() -> String {
    crate::text::DEFAULT_KEYWORD_DELIMITER.to_string()
}

/// Precomputed next-token table; absent means no expansion
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BigramConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_path: Option<PathBuf>,
}

/// Lemma reducer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LemmaConfig {
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup_path: Option<PathBuf>,
}

impl Default for LemmaConfig {
    fn default() -> Self {
        Self {
            language: "english".to_string(),
            lookup_path: None,
        }
    }
}

/// Embedding backend for the hybrid strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "word-vectors", "fastembed" or "none"
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vectors_path: Option<PathBuf>,
    pub model: String,
    /// Upper bound on embedding one query
    pub timeout_ms: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: "none".to_string(),
            vectors_path: None,
            model: "all-MiniLM-L6-v2".to_string(),
            timeout_ms: 2000,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TagsearchError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| TagsearchError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        // Apply environment variable overrides
        config.apply_env_overrides();

        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Load `path` if given, else the default file, else built-in defaults.
    ///
    /// An explicitly named file must exist.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        let default_path = Self::default_path()?;
        if default_path.exists() {
            return Self::load(&default_path);
        }

        tracing::debug!("No config file at {:?}; using defaults", default_path);
        let mut config = Self::default();
        config.apply_env_overrides();
        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    /// Save configuration to a file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| TagsearchError::Io {
                source: e,
                context: format!("Failed to create config directory: {:?}", parent),
            })?;
        }

        let mut config = self.clone();
        config.meta.last_modified = current_timestamp();
        let content = toml::to_string_pretty(&config)?;
        std::fs::write(path, content).map_err(|e| TagsearchError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: TAGSEARCH_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(std::env::vars());
    }

    /// Apply `TAGSEARCH_`-prefixed key/value pairs; other keys are ignored
    pub fn apply_overrides<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let key = key.as_ref();
            if let Some(config_key) = key.strip_prefix(ENV_PREFIX) {
                if let Err(e) = self.set_value_from_env(config_key, value.as_ref()) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        let optional_path = |value: &str| (!value.is_empty()).then(|| PathBuf::from(value));

        match path {
            "CORPUS__REPORTS_PATH" => self.corpus.reports_path = PathBuf::from(value),
            "CORPUS__ID_COLUMN" => self.corpus.id_column = value.to_string(),
            "CORPUS__KEYWORDS_COLUMN" => self.corpus.keywords_column = value.to_string(),
            "CORPUS__DELIMITER" => self.corpus.delimiter = value.to_string(),
            "BIGRAMS__INDEX_PATH" => self.bigrams.index_path = optional_path(value),
            "LEMMA__LANGUAGE" => self.lemma.language = value.to_string(),
            "LEMMA__LOOKUP_PATH" => self.lemma.lookup_path = optional_path(value),
            "EMBEDDING__BACKEND" => self.embedding.backend = value.to_string(),
            "EMBEDDING__VECTORS_PATH" => self.embedding.vectors_path = optional_path(value),
            "EMBEDDING__MODEL" => self.embedding.model = value.to_string(),
            "EMBEDDING__TIMEOUT_MS" => {
                self.embedding.timeout_ms =
                    value.parse().map_err(|_| TagsearchError::InvalidConfigValue {
                        path: path.to_string(),
                        message: format!("Cannot parse '{}' as milliseconds", value),
                    })?;
            }
            "SERVER__BIND" => self.server.bind = value.to_string(),
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| TagsearchError::Config("Cannot determine config directory".to_string()))?;

        Ok(config_dir.join("tagsearch").join("config.toml"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: SCHEMA_VERSION.to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            corpus: CorpusConfig {
                reports_path: PathBuf::from("data/api/reports.csv"),
                id_column: default_id_column(),
                keywords_column: default_keywords_column(),
                delimiter: default_delimiter(),
            },
            bigrams: BigramConfig::default(),
            lemma: LemmaConfig::default(),
            embedding: EmbeddingConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}
