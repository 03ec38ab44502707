//! Derived indexes built once per corpus snapshot.
//!
//! - `Bm25Index`: inverted index + BM25 scoring over keyword lists
//! - `SemanticIndex`: per-keyword embedding vectors + cosine similarity

mod bm25;
mod semantic;

pub use bm25::{Bm25Index, BM25_B, BM25_EPSILON, BM25_K1};
pub use semantic::{cosine_similarity, embed_text, SemanticIndex, SimilarityTable};
