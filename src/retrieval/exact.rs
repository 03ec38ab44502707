use crate::corpus::Snapshot;

/// Positions of records whose keyword set contains `term`, in corpus order.
///
/// `term` must already be normalized. A multi-word term only matches a
/// compound keyword equal to the whole term. An empty term matches every
/// record.
pub fn exact_matches(snapshot: &Snapshot, term: &str) -> Vec<usize> {
    if term.is_empty() {
        return (0..snapshot.len()).collect();
    }

    snapshot
        .records()
        .iter()
        .filter(|record| record.has_keyword(term))
        .map(|record| record.position())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::LoadedCorpus;

    fn snapshot(csv: &str) -> Snapshot {
        Snapshot::build(1, LoadedCorpus::from_csv(csv.as_bytes(), "keywords", ",").unwrap(), None)
    }

    #[test]
    fn test_single_term_match() {
        let snapshot = snapshot("id,keywords\n1,\"alpha, beta\"\n2,gamma\n3,beta\n");
        assert_eq!(exact_matches(&snapshot, "beta"), vec![0, 2]);
        assert!(exact_matches(&snapshot, "delta").is_empty());
    }

    #[test]
    fn test_compound_keyword_is_not_decomposed() {
        let snapshot = snapshot("id,keywords\n1,machine learning\n2,\"machine, learning\"\n");
        assert_eq!(exact_matches(&snapshot, "machine learning"), vec![0]);
        assert_eq!(exact_matches(&snapshot, "machine"), vec![1]);
    }

    #[test]
    fn test_empty_term_returns_everything() {
        let snapshot = snapshot("id,keywords\n1,alpha\n2,\n3,beta\n");
        assert_eq!(exact_matches(&snapshot, ""), vec![0, 1, 2]);
    }
}
