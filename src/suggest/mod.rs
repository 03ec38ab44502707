//! Next-token suggestions from a precomputed bigram frequency table
//!
//! The table maps a token to its observed followers, most frequent first.
//! Looking up a token the table has never seen is not an error: it simply
//! yields no suggestion.

use crate::text::word_tokens;
use ahash::{HashMap, HashMapExt};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BigramError {
    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    #[error("Invalid bigram table: {0}")]
    Json(#[from] serde_json::Error),
}

/// Token -> (next token, frequency) list, sorted by descending frequency
#[derive(Debug, Clone, Default)]
pub struct BigramTable {
    followers: HashMap<String, Vec<(String, u64)>>,
}

impl BigramTable {
    /// Table with no entries; every lookup yields no suggestion
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from raw entries, sorting each list by descending frequency.
    ///
    /// The sort is stable: equal frequencies keep their given order.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<(String, u64)>)>,
    {
        let mut followers = HashMap::new();
        for (token, mut candidates) in entries {
            candidates.sort_by(|a, b| b.1.cmp(&a.1));
            followers.insert(token, candidates);
        }
        Self { followers }
    }

    /// Load a JSON table of the form `{"token": [["next", 12], ...]}`
    pub fn load(path: &Path) -> Result<Self, BigramError> {
        let content = std::fs::read_to_string(path).map_err(|e| BigramError::Io {
            source: e,
            context: format!("Failed to read bigram table {}", path.display()),
        })?;
        let table = Self::from_json(&content)?;
        tracing::info!(
            "Loaded bigram table with {} tokens from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn from_json(json: &str) -> Result<Self, BigramError> {
        let raw: std::collections::HashMap<String, Vec<(String, u64)>> = serde_json::from_str(json)?;
        Ok(Self::from_entries(raw))
    }

    /// Count consecutive word pairs in a reference text.
    ///
    /// Equal frequencies are ordered lexicographically so the table is
    /// reproducible.
    pub fn from_text(text: &str) -> Self {
        let words = word_tokens(text);
        let mut counts: HashMap<String, HashMap<String, u64>> = HashMap::new();
        for pair in words.windows(2) {
            *counts
                .entry(pair[0].clone())
                .or_default()
                .entry(pair[1].clone())
                .or_insert(0) += 1;
        }

        let entries = counts.into_iter().map(|(token, next)| {
            let mut candidates: Vec<(String, u64)> = next.into_iter().collect();
            candidates.sort_by(|a, b| a.0.cmp(&b.0));
            (token, candidates)
        });
        Self::from_entries(entries)
    }

    /// Up to `limit` followers of `token`, most frequent first
    pub fn suggestions(&self, token: &str, limit: usize) -> Vec<&str> {
        self.followers
            .get(token)
            .map(|candidates| {
                candidates
                    .iter()
                    .take(limit)
                    .map(|(next, _)| next.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The single most frequent follower of `token`
    pub fn top_suggestion(&self, token: &str) -> Option<&str> {
        self.suggestions(token, 1).into_iter().next()
    }

    /// Write the table as JSON with tokens in sorted order
    pub fn save(&self, path: &Path) -> Result<(), BigramError> {
        let sorted: std::collections::BTreeMap<&String, &Vec<(String, u64)>> =
            self.followers.iter().collect();
        let json = serde_json::to_string_pretty(&sorted)?;
        std::fs::write(path, json).map_err(|e| BigramError::Io {
            source: e,
            context: format!("Failed to write bigram table {}", path.display()),
        })
    }

    /// Number of tokens with at least one follower
    pub fn len(&self) -> usize {
        self.followers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.followers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_json_table_sorted_by_frequency() {
        let table = BigramTable::from_json(
            r#"{"machine": [["vision", 3], ["learning", 10], ["translation", 3]]}"#,
        )
        .unwrap();

        assert_eq!(
            table.suggestions("machine", 5),
            vec!["learning", "vision", "translation"]
        );
        assert_eq!(table.top_suggestion("machine"), Some("learning"));
    }

    #[test]
    fn test_unseen_token_has_no_suggestion() {
        let table = BigramTable::from_json(r#"{"machine": [["learning", 1]]}"#).unwrap();
        assert!(table.suggestions("quantum", 1).is_empty());
        assert_eq!(table.top_suggestion("quantum"), None);
        assert_eq!(BigramTable::empty().top_suggestion("machine"), None);
    }

    #[test]
    fn test_empty_candidate_list() {
        let table = BigramTable::from_json(r#"{"orphan": []}"#).unwrap();
        assert_eq!(table.top_suggestion("orphan"), None);
    }

    #[test]
    fn test_from_text_counts_pairs() {
        let table = BigramTable::from_text(
            "Machine learning is fun. Machine learning works. Machine vision too.",
        );

        assert_eq!(table.top_suggestion("machine"), Some("learning"));
        assert_eq!(table.suggestions("machine", 2), vec!["learning", "vision"]);
        assert_eq!(table.top_suggestion("too"), None);
    }

    #[test]
    fn test_from_text_ties_are_lexicographic() {
        let table = BigramTable::from_text("data science data mining");
        assert_eq!(table.suggestions("data", 2), vec!["mining", "science"]);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            BigramTable::from_json(r#"{"a": "b"}"#),
            Err(BigramError::Json(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bigram_index.json");

        let table = BigramTable::from_text("deep learning deep learning deep networks");
        table.save(&path).unwrap();

        let loaded = BigramTable::load(&path).unwrap();
        assert_eq!(loaded.len(), table.len());
        assert_eq!(loaded.suggestions("deep", 2), vec!["learning", "networks"]);
    }

    #[test]
    fn test_load_missing_file() {
        let result = BigramTable::load(Path::new("/nonexistent/bigram_index.json"));
        assert!(matches!(result, Err(BigramError::Io { .. })));
    }
}
