use crate::config::{Config, SCHEMA_VERSION};
use crate::embedding::SUPPORTED_BACKENDS;
use crate::error::{Result, TagsearchError, ValidationError};
use crate::lemma::parse_language;
use std::net::SocketAddr;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration, collecting every violation
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_corpus(config, &mut errors);
        Self::validate_lemma(config, &mut errors);
        Self::validate_embedding(config, &mut errors);
        Self::validate_server(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(TagsearchError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != SCHEMA_VERSION {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_corpus(config: &Config, errors: &mut Vec<ValidationError>) {
        // File existence is checked when the snapshot is built, so a reload
        // can pick up a corpus that appears later
        if config.corpus.reports_path.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "corpus.reports_path",
                "Reports path cannot be empty",
            ));
        }

        if config.corpus.keywords_column.is_empty() {
            errors.push(ValidationError::new(
                "corpus.keywords_column",
                "Keywords column cannot be empty",
            ));
        }

        if config.corpus.delimiter.is_empty() {
            errors.push(ValidationError::new(
                "corpus.delimiter",
                "Keyword delimiter cannot be empty",
            ));
        }
    }

    fn validate_lemma(config: &Config, errors: &mut Vec<ValidationError>) {
        let language = &config.lemma.language;
        if parse_language(language).is_none() {
            errors.push(ValidationError::new(
                "lemma.language",
                format!("Unsupported stemmer language: '{}'", language),
            ));
        }
    }

    fn validate_embedding(config: &Config, errors: &mut Vec<ValidationError>) {
        let backend = config.embedding.backend.as_str();
        if !SUPPORTED_BACKENDS.contains(&backend) {
            errors.push(ValidationError::new(
                "embedding.backend",
                format!(
                    "Backend must be one of {:?}, got '{}'",
                    SUPPORTED_BACKENDS, backend
                ),
            ));
        }

        if backend == "word-vectors" && config.embedding.vectors_path.is_none() {
            errors.push(ValidationError::new(
                "embedding.vectors_path",
                "The word-vectors backend requires a vectors_path",
            ));
        }

        if backend == "fastembed" && config.embedding.model.is_empty() {
            errors.push(ValidationError::new(
                "embedding.model",
                "Model name cannot be empty",
            ));
        }

        if config.embedding.timeout_ms == 0 {
            errors.push(ValidationError::new(
                "embedding.timeout_ms",
                "Timeout must be greater than 0",
            ));
        }
    }

    fn validate_server(config: &Config, errors: &mut Vec<ValidationError>) {
        let bind = &config.server.bind;
        if bind.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::new(
                "server.bind",
                format!("Invalid bind address: '{}'", bind),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn errors(config: &Config) -> Vec<String> {
        match ConfigValidator::validate(config) {
            Ok(()) => Vec::new(),
            Err(TagsearchError::ConfigValidation { errors }) => {
                errors.into_iter().map(|e| e.path).collect()
            }
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_valid_config() {
        let config = Config::default();
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_empty_delimiter() {
        let mut config = Config::default();
        config.corpus.delimiter = String::new();
        assert_eq!(errors(&config), vec!["corpus.delimiter"]);
    }

    #[test]
    fn test_unknown_backend() {
        let mut config = Config::default();
        config.embedding.backend = "invalid".to_string();
        assert_eq!(errors(&config), vec!["embedding.backend"]);
    }

    #[test]
    fn test_word_vectors_need_path() {
        let mut config = Config::default();
        config.embedding.backend = "word-vectors".to_string();
        assert_eq!(errors(&config), vec!["embedding.vectors_path"]);

        config.embedding.vectors_path = Some(PathBuf::from("vectors.txt"));
        assert!(errors(&config).is_empty());
    }

    #[test]
    fn test_all_violations_collected() {
        let mut config = Config::default();
        config.meta.schema_version = "0.1".to_string();
        config.lemma.language = "klingon".to_string();
        config.embedding.timeout_ms = 0;
        config.server.bind = "localhost".to_string();

        assert_eq!(
            errors(&config),
            vec![
                "_meta.schema_version",
                "lemma.language",
                "embedding.timeout_ms",
                "server.bind"
            ]
        );
    }
}
