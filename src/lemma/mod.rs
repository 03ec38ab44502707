//! Reduction of a query token to its base form
//!
//! A reduced token is always a real word: a lookup-table lemma, a corpus
//! keyword sharing the token's Snowball stem, or the token itself. A stem
//! is only a join key between query and keywords, never a reduced token.

use crate::config::{expand_tilde, LemmaConfig};
use crate::corpus::{Snapshot, Vocabulary};
use ahash::{HashMap, HashMapExt};
use std::path::Path;
use tantivy::tokenizer::{Language, LowerCaser, RawTokenizer, Stemmer, TextAnalyzer, TokenStream};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LemmaError {
    #[error("Unsupported stemmer language: {0}")]
    UnsupportedLanguage(String),

    #[error("Failed to read lemma table {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid lemma table {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

/// Linguistic base-form reduction of a single token
pub trait LemmaReducer: Send + Sync {
    /// Base form of `token`, resolved against the keywords of `snapshot`
    fn reduce(&self, token: &str, snapshot: &Snapshot) -> String;
}

/// Lookup table first, then the corpus keyword with the same stem
#[derive(Clone)]
pub struct Lemmatizer {
    lookup: HashMap<String, String>,
    analyzer: TextAnalyzer,
    language: Language,
}

impl Lemmatizer {
    pub fn new(language: Language) -> Self {
        // The whole token is one term: "e-mail" must not split into "e" and "mail"
        let analyzer = TextAnalyzer::builder(RawTokenizer::default())
            .filter(LowerCaser)
            .filter(Stemmer::new(language))
            .build();
        Self {
            lookup: HashMap::new(),
            analyzer,
            language,
        }
    }

    pub fn from_config(config: &LemmaConfig) -> Result<Self, LemmaError> {
        let language = parse_language(&config.language)
            .ok_or_else(|| LemmaError::UnsupportedLanguage(config.language.clone()))?;
        let lemmatizer = Self::new(language);
        match &config.lookup_path {
            Some(path) => lemmatizer.with_lookup_file(&expand_tilde(path)),
            None => Ok(lemmatizer),
        }
    }

    /// Add `form -> lemma` entries; keys are matched after lowercasing
    pub fn with_lookup<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (form, lemma) in entries {
            self.lookup.insert(form.as_ref().to_lowercase(), lemma.into());
        }
        self
    }

    /// Load entries from a JSON object file
    pub fn with_lookup_file(self, path: &Path) -> Result<Self, LemmaError> {
        let path_str = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| LemmaError::Io {
            path: path_str.clone(),
            source,
        })?;
        let entries: std::collections::HashMap<String, String> = serde_json::from_str(&content)
            .map_err(|source| LemmaError::Json {
                path: path_str.clone(),
                source,
            })?;
        tracing::info!("Loaded {} lemma overrides from {}", entries.len(), path_str);
        Ok(self.with_lookup(entries))
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Lowercased Snowball stem of `token`
    pub fn stem(&self, token: &str) -> String {
        let mut analyzer = self.analyzer.clone();
        let stemmed = {
            let mut stream = analyzer.token_stream(token);
            stream.advance().then(|| stream.token().text.clone())
        };
        stemmed.unwrap_or_else(|| token.to_lowercase())
    }
}

impl LemmaReducer for Lemmatizer {
    fn reduce(&self, token: &str, snapshot: &Snapshot) -> String {
        let lowered = token.to_lowercase();
        if let Some(lemma) = self.lookup.get(&lowered) {
            return lemma.clone();
        }
        if snapshot.vocabulary().contains(&lowered) {
            return lowered;
        }

        let stem = self.stem(&lowered);
        match snapshot.stem_index(self).keyword(&stem) {
            Some(keyword) => keyword.to_string(),
            None => lowered,
        }
    }
}

/// Single-word corpus keywords grouped by stem.
///
/// When several keywords share a stem the lexicographically smallest wins.
#[derive(Debug, Clone)]
pub struct StemIndex {
    language: Language,
    keywords: HashMap<String, String>,
}

impl StemIndex {
    pub fn build(lemmatizer: &Lemmatizer, vocabulary: &Vocabulary) -> Self {
        let mut keywords = HashMap::new();
        // Vocabulary iterates in ascending order, so the first keyword per stem is the smallest
        for keyword in vocabulary.iter() {
            if keyword.contains(char::is_whitespace) {
                continue;
            }
            keywords
                .entry(lemmatizer.stem(keyword))
                .or_insert_with(|| keyword.clone());
        }
        Self {
            language: lemmatizer.language(),
            keywords,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Keyword whose stem is `stem`
    pub fn keyword(&self, stem: &str) -> Option<&str> {
        self.keywords.get(stem).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// Stemmer language by name (`"english"`, `"en"`, ...)
pub fn parse_language(name: &str) -> Option<Language> {
    let language = match name.trim().to_lowercase().as_str() {
        "english" | "en" => Language::English,
        "spanish" | "es" => Language::Spanish,
        "french" | "fr" => Language::French,
        "german" | "de" => Language::German,
        "italian" | "it" => Language::Italian,
        "portuguese" | "pt" => Language::Portuguese,
        "dutch" | "nl" => Language::Dutch,
        "swedish" | "sv" => Language::Swedish,
        "norwegian" | "no" => Language::Norwegian,
        "danish" | "da" => Language::Danish,
        "finnish" | "fi" => Language::Finnish,
        "russian" | "ru" => Language::Russian,
        _ => return None,
    };
    Some(language)
}
