use serde::{Serialize, Deserialize};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::DocId;
use crate::index::inverted::InvertedIndex;

/// Relevance model consumed by the query evaluator.
///
/// Implementations are pure functions of index statistics, so one instance can
/// score any number of queries concurrently.
pub trait Similarity: Send + Sync {
    /// Contribution of `term` in `field` to the score of `doc_id`
    fn score(&self, term: &str, field: &str, doc_id: DocId, index: &InvertedIndex) -> f32;

    fn name(&self) -> &str;

    /// Coordination factor for `matched` of `total` query terms
    fn coord(&self, _matched: usize, _total: usize) -> f32 {
        1.0
    }
}

/// Sub-linear tf only: `1 + ln(tf)`, no idf, no length norm, coord fixed at 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct VectorSpaceSimilarity;

impl VectorSpaceSimilarity {
    pub fn tf_weight(freq: u32) -> f32 {
        if freq > 0 {
            1.0 + (freq as f32).ln()
        } else {
            0.0
        }
    }
}

impl Similarity for VectorSpaceSimilarity {
    fn score(&self, term: &str, field: &str, doc_id: DocId, index: &InvertedIndex) -> f32 {
        Self::tf_weight(index.term_frequency(field, term, doc_id))
    }

    fn name(&self) -> &str {
        "vsm"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Params {
    pub k1: f32,  // Term frequency saturation (default: 1.2)
    pub b: f32,   // Length normalization strength (default: 0.75)
}

impl Default for Bm25Params {
    fn default() -> Self {
        Bm25Params {
            k1: 1.2,
            b: 0.75,
        }
    }
}

impl Bm25Params {
    pub fn validate(&self) -> Result<()> {
        if !self.k1.is_finite() || self.k1 < 0.0 {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                format!("BM25 k1 must be a non-negative number, got {}", self.k1),
            ));
        }
        if !self.b.is_finite() || !(0.0..=1.0).contains(&self.b) {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                format!("BM25 b must lie in [0, 1], got {}", self.b),
            ));
        }
        Ok(())
    }
}

/// Okapi BM25 with `idf = ln(1 + (N - df + 0.5) / (df + 0.5))`
#[derive(Debug, Clone, Copy, Default)]
pub struct Bm25Similarity {
    pub params: Bm25Params,
}

impl Bm25Similarity {
    pub fn new(params: Bm25Params) -> Self {
        Bm25Similarity { params }
    }

    pub fn idf(doc_count: usize, doc_freq: u32) -> f32 {
        let n = doc_count as f32;
        let df = doc_freq as f32;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }
}

impl Similarity for Bm25Similarity {
    fn score(&self, term: &str, field: &str, doc_id: DocId, index: &InvertedIndex) -> f32 {
        let tf = index.term_frequency(field, term, doc_id) as f32;
        if tf == 0.0 {
            return 0.0;
        }

        let idf = Self::idf(index.document_count(), index.document_frequency(field, term));
        let doc_len = index.document_length(field, doc_id) as f32;
        // tf > 0 implies the field holds at least one token, so the average is positive
        let avg_doc_len = index.average_document_length(field);
        let Bm25Params { k1, b } = self.params;

        let numerator = idf * tf * (k1 + 1.0);
        let denominator = tf + k1 * (1.0 - b + b * (doc_len / avg_doc_len));

        numerator / denominator
    }

    fn name(&self) -> &str {
        "bm25"
    }
}

/// Selector for the built-in models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityKind {
    VectorSpace,
    #[default]
    Bm25,
}

impl SimilarityKind {
    pub fn build(&self, params: Bm25Params) -> Box<dyn Similarity> {
        match self {
            SimilarityKind::VectorSpace => Box::new(VectorSpaceSimilarity),
            SimilarityKind::Bm25 => Box::new(Bm25Similarity::new(params)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SimilarityKind::VectorSpace => "vsm",
            SimilarityKind::Bm25 => "bm25",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::Analyzer;
    use crate::core::config::IndexConfig;
    use crate::core::types::DocumentCollection;

    fn index() -> InvertedIndex {
        let mut docs = DocumentCollection::new();
        docs.add(|d| d.with_text("title", "game game game"));
        docs.add(|d| d.with_text("title", "game night"));
        docs.add(|d| d.with_text("title", "pasta"));
        let config = IndexConfig {
            text_fields: vec!["title".to_string()],
            ..IndexConfig::default()
        };
        InvertedIndex::build(docs, Analyzer::simple(), &config).unwrap()
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn vector_space_uses_log_tf_only() {
        let index = index();
        let vsm = VectorSpaceSimilarity;
        assert!(close(vsm.score("game", "title", DocId(0), &index), 1.0 + 3f32.ln()));
        assert!(close(vsm.score("game", "title", DocId(1), &index), 1.0));
        assert_eq!(vsm.score("game", "title", DocId(2), &index), 0.0);
        assert_eq!(vsm.coord(1, 5), 1.0);
    }

    #[test]
    fn bm25_matches_the_closed_form() {
        let index = index();
        let bm25 = Bm25Similarity::default();
        // N = 3, df = 2, tf = 1, dl = 2, avgdl = 6 / 3
        let idf = (1.0f32 + (3.0 - 2.0 + 0.5) / (2.0 + 0.5)).ln();
        let expected = idf * 1.0 * 2.2 / (1.0 + 1.2 * (1.0 - 0.75 + 0.75 * (2.0 / 2.0)));
        assert!(close(bm25.score("game", "title", DocId(1), &index), expected));
        assert_eq!(bm25.score("game", "title", DocId(2), &index), 0.0);
        assert_eq!(bm25.score("unseen", "title", DocId(0), &index), 0.0);
    }

    #[test]
    fn rarer_terms_weigh_more_under_bm25() {
        assert!(Bm25Similarity::idf(3, 1) > Bm25Similarity::idf(3, 2));
        assert!(Bm25Similarity::idf(3, 3) > 0.0);
    }

    #[test]
    fn params_are_validated() {
        assert!(Bm25Params::default().validate().is_ok());
        assert!(Bm25Params { k1: -1.0, b: 0.5 }.validate().is_err());
        assert!(Bm25Params { k1: 1.2, b: 1.5 }.validate().is_err());
    }

    #[test]
    fn kinds_build_matching_models() {
        assert_eq!(SimilarityKind::VectorSpace.build(Bm25Params::default()).name(), "vsm");
        assert_eq!(SimilarityKind::Bm25.build(Bm25Params::default()).name(), SimilarityKind::Bm25.name());
    }
}
