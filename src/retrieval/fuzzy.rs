//! Edit-distance correction against the snapshot vocabulary

use crate::corpus::Vocabulary;

/// Vocabulary term closest to a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    pub term: String,
    pub distance: usize,
}

/// Levenshtein distance over Unicode scalar values
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev_row: Vec<usize> = (0..=b.len()).collect();
    let mut curr_row = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr_row[0] = i + 1;

        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr_row[j + 1] = (prev_row[j + 1] + 1)
                .min(curr_row[j] + 1)
                .min(prev_row[j] + cost);
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b.len()]
}

/// Nearest vocabulary term to `term`.
///
/// The vocabulary iterates in lexicographic order and only a strictly
/// smaller distance replaces the current best, so among equally distant
/// terms the lexicographically smallest wins. `None` for an empty
/// vocabulary.
pub fn correct(term: &str, vocabulary: &Vocabulary) -> Option<Correction> {
    let mut best: Option<Correction> = None;

    for candidate in vocabulary {
        let distance = levenshtein(term, candidate);
        match &best {
            Some(current) if distance >= current.distance => {}
            _ => {
                best = Some(Correction {
                    term: candidate.clone(),
                    distance,
                });
                if distance == 0 {
                    break;
                }
            }
        }
    }

    best
}
