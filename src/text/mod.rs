//! Text normalization shared by index construction and query handling.
//!
//! Every strategy runs its input through these functions, and the corpus
//! loader runs every keyword through them, so case and surrounding whitespace
//! never influence a match.

use regex::Regex;
use std::sync::OnceLock;

/// Default delimiter between keywords in the corpus keyword column
pub const DEFAULT_KEYWORD_DELIMITER: &str = ",";

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[\p{L}\p{N}_']+").expect("word pattern is valid"))
}

/// Trim and lowercase a piece of text
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Split a delimited keyword string into normalized keywords.
///
/// Empty segments are dropped; duplicates and source order are kept.
pub fn split_keywords(raw: &str, delimiter: &str) -> Vec<String> {
    raw.split(delimiter)
        .map(normalize)
        .filter(|keyword| !keyword.is_empty())
        .collect()
}

/// Whitespace-separated terms of the normalized query (BM25 query tokens)
pub fn query_terms(query: &str) -> Vec<String> {
    normalize(query)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Word tokens used for embedding lookups.
///
/// Punctuation is discarded, apostrophes and underscores stay inside words.
pub fn word_tokens(text: &str) -> Vec<String> {
    let normalized = normalize(text);
    word_pattern()
        .find_iter(&normalized)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// First whitespace token of the normalized query, if any
pub fn first_token(query: &str) -> Option<String> {
    normalize(query).split_whitespace().next().map(str::to_string)
}

/// Last whitespace token of the normalized query, if any
pub fn last_token(query: &str) -> Option<String> {
    normalize(query)
        .split_whitespace()
        .next_back()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_lowercases() {
        assert_eq!(normalize("  Network Security \t"), "network security");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_split_keywords_drops_empty_segments() {
        let keywords = split_keywords(" Alpha, beta ,,  , Machine Learning,beta", ",");
        assert_eq!(keywords, vec!["alpha", "beta", "machine learning", "beta"]);
    }

    #[test]
    fn test_split_keywords_custom_delimiter() {
        assert_eq!(split_keywords("a; B ;c", ";"), vec!["a", "b", "c"]);
        assert!(split_keywords("", ",").is_empty());
    }

    #[test]
    fn test_query_terms() {
        assert_eq!(query_terms("  Deep   LEARNING "), vec!["deep", "learning"]);
        assert!(query_terms("   ").is_empty());
    }

    #[test]
    fn test_word_tokens_strip_punctuation() {
        assert_eq!(
            word_tokens("Climate-change, it's (urgent)!"),
            vec!["climate", "change", "it's", "urgent"]
        );
    }

    #[test]
    fn test_first_and_last_token() {
        assert_eq!(first_token(" Running Fast ").as_deref(), Some("running"));
        assert_eq!(last_token(" Machine LEARNING ").as_deref(), Some("learning"));
        assert_eq!(first_token("  "), None);
        assert_eq!(last_token(""), None);
    }
}
