//! Tagsearch - keyword-tagged record search
//!
//! Serves free-text queries against an in-memory CSV corpus through a closed
//! set of strategies: exact keyword match, lemma-reduced match, edit-distance
//! correction, bigram expansion, BM25 ranking, and a hybrid of BM25 with
//! embedding similarity. The corpus and every index derived from it live in
//! an immutable snapshot that a reload replaces atomically.

pub mod cli;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod index;
pub mod lemma;
pub mod retrieval;
pub mod server;
pub mod suggest;
pub mod text;

pub use error::{Result, TagsearchError};
