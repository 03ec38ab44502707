use ahash::{HashSet, HashSetExt};
use serde_json::{Map, Value};

/// One corpus row.
///
/// `fields` holds every column as loaded, in header order. `keywords` is the
/// normalized keyword list (source order, duplicates kept); matching uses the
/// set view.
#[derive(Debug, Clone)]
pub struct Record {
    position: usize,
    fields: Map<String, Value>,
    keywords: Vec<String>,
    keyword_set: HashSet<String>,
}

impl Record {
    pub fn new(position: usize, fields: Map<String, Value>, keywords: Vec<String>) -> Self {
        let mut keyword_set = HashSet::with_capacity(keywords.len());
        keyword_set.extend(keywords.iter().cloned());
        Self {
            position,
            fields,
            keywords,
            keyword_set,
        }
    }

    /// Position in the corpus; the identity and the ranking tie-break
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// String value of a column
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Whether `term` is one of this record's normalized keywords
    pub fn has_keyword(&self, term: &str) -> bool {
        self.keyword_set.contains(term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keyword_membership_is_set_based() {
        let fields = json!({"id": "7", "keywords": "beta, beta, gamma"});
        let Value::Object(fields) = fields else {
            unreachable!()
        };
        let record = Record::new(
            3,
            fields,
            vec!["beta".into(), "beta".into(), "gamma".into()],
        );

        assert_eq!(record.position(), 3);
        assert_eq!(record.field("id"), Some("7"));
        assert_eq!(record.keywords().len(), 3);
        assert!(record.has_keyword("beta"));
        assert!(!record.has_keyword("Beta"));
        assert!(!record.has_keyword("beta, gamma"));
    }
}
