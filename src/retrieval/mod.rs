//! Matching and ranking strategies
//!
//! Every strategy runs the same pipeline against one snapshot:
//! normalize, look up, optionally fall back, optionally rank. The
//! variants differ only in which lookup, fallback and ranking they use.
//!
//! | Version | Strategy |
//! |---|---|
//! | `v0`, `v1`, `v1.3` | [`Strategy::Exact`] |
//! | `v1.1` | [`Strategy::LemmaReduced`] |
//! | `v1.2` | [`Strategy::FuzzyCorrected`] |
//! | `v1.4` | [`Strategy::BigramExpanded`] |
//! | `v2` | [`Strategy::Bm25Ranked`] |
//! | `v2.1` | [`Strategy::Hybrid`] |

mod engine;
mod exact;
mod fuzzy;
mod hybrid;
mod response;

pub use engine::{Hit, SearchEngine, SearchOutcome, SearchResults};
pub use exact::exact_matches;
pub use fuzzy::{correct, levenshtein, Correction};
pub use hybrid::{HybridError, HybridRanking, HybridScorer, BM25_WEIGHT, COSINE_WEIGHT};
pub use response::{ErrorBody, ScoredRecord, SearchResponse};

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown search version: {0}")]
pub struct UnknownStrategy(pub String);

/// Closed set of request-handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Normalized query must equal one keyword
    Exact,
    /// First query token reduced to its base form, then exact
    LemmaReduced,
    /// Exact, retried with the nearest vocabulary term when nothing matches
    FuzzyCorrected,
    /// Exact on the query plus its most frequent next token
    BigramExpanded,
    /// BM25 over keyword lists
    Bm25Ranked,
    /// Anchor-restricted blend of cosine similarity and normalized BM25
    Hybrid,
}

impl Strategy {
    pub const ALL: [Strategy; 6] = [
        Strategy::Exact,
        Strategy::LemmaReduced,
        Strategy::FuzzyCorrected,
        Strategy::BigramExpanded,
        Strategy::Bm25Ranked,
        Strategy::Hybrid,
    ];

    /// Canonical path version
    pub fn version(&self) -> &'static str {
        match self {
            Strategy::Exact => "v1",
            Strategy::LemmaReduced => "v1.1",
            Strategy::FuzzyCorrected => "v1.2",
            Strategy::BigramExpanded => "v1.4",
            Strategy::Bm25Ranked => "v2",
            Strategy::Hybrid => "v2.1",
        }
    }

    /// Whether results carry a score
    pub fn is_ranking(&self) -> bool {
        matches!(self, Strategy::Bm25Ranked | Strategy::Hybrid)
    }
}

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    /// Accepts path versions (`v1.2`) and variant names (`fuzzy`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "v0" | "v1" | "v1.3" | "exact" => Ok(Strategy::Exact),
            "v1.1" | "lemma" => Ok(Strategy::LemmaReduced),
            "v1.2" | "fuzzy" => Ok(Strategy::FuzzyCorrected),
            "v1.4" | "bigram" => Ok(Strategy::BigramExpanded),
            "v2" | "bm25" => Ok(Strategy::Bm25Ranked),
            "v2.1" | "hybrid" => Ok(Strategy::Hybrid),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.version())
    }
}
