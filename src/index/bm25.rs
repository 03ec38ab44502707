//! BM25 (Okapi) scoring over per-record keyword lists.

use ahash::{HashMap, HashMapExt};

/// Term-frequency saturation constant
pub const BM25_K1: f64 = 1.5;

/// Document-length normalization strength
pub const BM25_B: f64 = 0.75;

/// Floor applied to terms with negative IDF, as a fraction of the mean IDF
pub const BM25_EPSILON: f64 = 0.25;

/// Inverted index with precomputed IDF values.
///
/// Each document is a record's keyword list; compound keywords such as
/// `"machine learning"` are single terms. Built once per snapshot.
#[derive(Debug, Clone)]
pub struct Bm25Index {
    term_freqs: Vec<HashMap<String, u32>>,
    doc_lengths: Vec<usize>,
    idf: HashMap<String, f64>,
    avg_doc_len: f64,
}

impl Bm25Index {
    /// Build the index from documents in corpus order
    pub fn build<'a, I>(documents: I) -> Self
    where
        I: IntoIterator<Item = &'a [String]>,
    {
        let mut term_freqs = Vec::new();
        let mut doc_lengths = Vec::new();
        let mut doc_freqs: HashMap<String, usize> = HashMap::new();
        let mut total_len = 0usize;

        for document in documents {
            let mut freqs: HashMap<String, u32> = HashMap::new();
            for term in document {
                *freqs.entry(term.clone()).or_insert(0) += 1;
            }
            for term in freqs.keys() {
                *doc_freqs.entry(term.clone()).or_insert(0) += 1;
            }
            total_len += document.len();
            doc_lengths.push(document.len());
            term_freqs.push(freqs);
        }

        let corpus_size = doc_lengths.len();
        let avg_doc_len = if corpus_size == 0 {
            0.0
        } else {
            total_len as f64 / corpus_size as f64
        };

        let idf = compute_idf(&doc_freqs, corpus_size);

        Self {
            term_freqs,
            doc_lengths,
            idf,
            avg_doc_len,
        }
    }

    /// Number of indexed documents
    pub fn len(&self) -> usize {
        self.doc_lengths.len()
    }

    /// Check if the index has no documents
    pub fn is_empty(&self) -> bool {
        self.doc_lengths.is_empty()
    }

    /// IDF of a term, if it occurs anywhere in the corpus
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.idf.get(term).copied()
    }

    /// Score one document against the query terms.
    ///
    /// Repeated query terms contribute once per occurrence.
    pub fn score(&self, doc: usize, query_terms: &[String]) -> f64 {
        if self.avg_doc_len <= 0.0 {
            return 0.0;
        }
        let (Some(freqs), Some(&doc_len)) = (self.term_freqs.get(doc), self.doc_lengths.get(doc))
        else {
            return 0.0;
        };

        let length_norm = 1.0 - BM25_B + BM25_B * doc_len as f64 / self.avg_doc_len;
        query_terms
            .iter()
            .map(|term| {
                let tf = f64::from(freqs.get(term).copied().unwrap_or(0));
                let idf = self.idf.get(term).copied().unwrap_or(0.0);
                idf * (tf * (BM25_K1 + 1.0)) / (tf + BM25_K1 * length_norm)
            })
            .sum()
    }

    /// Scores for every document, in corpus order
    pub fn scores(&self, query_terms: &[String]) -> Vec<f64> {
        (0..self.len())
            .map(|doc| self.score(doc, query_terms))
            .collect()
    }

    /// Documents with a positive score, best first.
    ///
    /// Equal scores keep corpus order.
    pub fn rank(&self, query_terms: &[String]) -> Vec<(usize, f64)> {
        let mut ranked: Vec<(usize, f64)> = self
            .scores(query_terms)
            .into_iter()
            .enumerate()
            .filter(|(_, score)| *score > 0.0)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

fn compute_idf(doc_freqs: &HashMap<String, usize>, corpus_size: usize) -> HashMap<String, f64> {
    let mut idf = HashMap::with_capacity(doc_freqs.len());
    if doc_freqs.is_empty() {
        return idf;
    }

    let n = corpus_size as f64;
    let mut idf_sum = 0.0;
    let mut negative = Vec::new();
    for (term, &df) in doc_freqs {
        let df = df as f64;
        let value = (n - df + 0.5).ln() - (df + 0.5).ln();
        idf_sum += value;
        if value < 0.0 {
            negative.push(term.clone());
        }
        idf.insert(term.clone(), value);
    }

    let floor = BM25_EPSILON * idf_sum / idf.len() as f64;
    for term in negative {
        idf.insert(term, floor);
    }
    idf
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|doc| doc.iter().map(|t| t.to_string()).collect())
            .collect()
    }

    fn build(documents: &[Vec<String>]) -> Bm25Index {
        Bm25Index::build(documents.iter().map(Vec::as_slice))
    }

    fn terms(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_idf_values() {
        let documents = docs(&[&["alpha"], &["beta"], &["gamma"], &["alpha", "beta"]]);
        let index = build(&documents);

        // df(gamma) = 1 of 4 documents
        let expected = (4.0f64 - 1.0 + 0.5).ln() - (1.0f64 + 0.5).ln();
        assert!((index.idf("gamma").unwrap() - expected).abs() < 1e-12);
        assert!(index.idf("missing").is_none());
    }

    #[test]
    fn test_negative_idf_floored() {
        // "common" is in every document, so its raw IDF is negative
        let documents = docs(&[&["common", "a"], &["common", "b"], &["common", "c"]]);
        let index = build(&documents);

        let raw_common = (3.0f64 - 3.0 + 0.5).ln() - (3.0f64 + 0.5).ln();
        let raw_rare = (3.0f64 - 1.0 + 0.5).ln() - (1.0f64 + 0.5).ln();
        let mean = (raw_common + 3.0 * raw_rare) / 4.0;

        assert!(raw_common < 0.0);
        assert!((index.idf("common").unwrap() - BM25_EPSILON * mean).abs() < 1e-12);
    }

    #[test]
    fn test_score_formula() {
        let documents = docs(&[&["alpha", "beta"], &["gamma"], &["delta", "gamma", "gamma"]]);
        let index = build(&documents);

        let avgdl = 2.0;
        let idf = index.idf("gamma").unwrap();
        let tf = 2.0;
        let norm = 1.0 - BM25_B + BM25_B * 3.0 / avgdl;
        let expected = idf * (tf * (BM25_K1 + 1.0)) / (tf + BM25_K1 * norm);

        assert!((index.score(2, &terms(&["gamma"])) - expected).abs() < 1e-12);
        assert_eq!(index.score(0, &terms(&["gamma"])), 0.0);
    }

    #[test]
    fn test_repeated_query_term_counts_twice() {
        let documents = docs(&[&["alpha"], &["beta"], &["gamma"]]);
        let index = build(&documents);

        let once = index.score(0, &terms(&["alpha"]));
        let twice = index.score(0, &terms(&["alpha", "alpha"]));
        assert!(once > 0.0);
        assert!((twice - 2.0 * once).abs() < 1e-12);
    }

    #[test]
    fn test_higher_term_frequency_scores_higher() {
        // Same length, A mentions "beta" twice, B once
        let documents = docs(&[
            &["beta", "beta", "x"],
            &["beta", "y", "z"],
            &["q", "r", "s"],
            &["t", "u", "v"],
            &["w", "x", "y"],
        ]);
        let index = build(&documents);

        let query = terms(&["beta"]);
        assert!(index.score(0, &query) >= index.score(1, &query));
        assert!(index.score(0, &query) > 0.0);
    }

    #[test]
    fn test_rank_excludes_non_positive_and_keeps_ties_in_order() {
        let documents = docs(&[&["x"], &["beta"], &["y"], &["beta"], &["z"]]);
        let index = build(&documents);

        let ranked = index.rank(&terms(&["beta"]));
        let order: Vec<usize> = ranked.iter().map(|(doc, _)| *doc).collect();
        assert_eq!(order, vec![1, 3]);
        assert_eq!(ranked[0].1, ranked[1].1);
    }

    #[test]
    fn test_empty_corpus_and_empty_documents() {
        let index = build(&[]);
        assert!(index.is_empty());
        assert!(index.rank(&terms(&["alpha"])).is_empty());

        let documents = docs(&[&[], &[]]);
        let index = build(&documents);
        assert_eq!(index.len(), 2);
        assert_eq!(index.scores(&terms(&["alpha"])), vec![0.0, 0.0]);
    }

    #[test]
    fn test_unknown_terms_score_zero() {
        let documents = docs(&[&["alpha"], &["beta"]]);
        let index = build(&documents);
        assert!(index.rank(&terms(&["omega"])).is_empty());
    }
}
