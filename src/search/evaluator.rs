use std::collections::BTreeMap;
use rayon::prelude::*;
use roaring::RoaringBitmap;
use tracing::{debug, warn};
use crate::analysis::analyzer::Analyzer;
use crate::core::config::SearchConfig;
use crate::core::error::{Error, Result};
use crate::core::types::DocId;
use crate::index::inverted::{InvertedIndex, Term};
use crate::index::posting::{intersect_sorted, Posting};
use crate::query::ast::{Occur, Query};
use crate::scoring::scorer::Similarity;
use crate::search::results::{RankedResult, ScoredDocument, TopKCollector};

#[derive(Debug, Clone)]
pub struct EvaluatorOptions {
    /// MUST terms also add their similarity to the score
    pub score_must_clauses: bool,
    /// Keep only the best `limit` hits
    pub limit: Option<usize>,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        EvaluatorOptions {
            score_must_clauses: true,
            limit: None,
        }
    }
}

impl From<&SearchConfig> for EvaluatorOptions {
    fn from(config: &SearchConfig) -> Self {
        EvaluatorOptions {
            score_must_clauses: config.score_must_clauses,
            limit: config.limit,
        }
    }
}

/// Query terms after running through the index analyzer
#[derive(Debug, Default)]
struct PreparedQuery {
    must: BTreeMap<String, Vec<String>>,
    should: Vec<Term>,
    must_not: Vec<Term>,
}

impl PreparedQuery {
    fn prepare(query: &Query, analyzer: &Analyzer) -> Self {
        let mut prepared = PreparedQuery::default();

        for (field, raw) in query.terms(Occur::Must) {
            let tokens = analyzer.tokenize(raw);
            if !tokens.is_empty() {
                prepared.must.entry(field.to_string()).or_default().extend(tokens);
            }
        }
        for (field, raw) in query.terms(Occur::Should) {
            prepared.should.extend(analyzer.tokenize(raw).iter().map(|t| Term::new(field, t)));
        }
        for (field, raw) in query.terms(Occur::MustNot) {
            prepared.must_not.extend(analyzer.tokenize(raw).iter().map(|t| Term::new(field, t)));
        }

        prepared
    }

    fn scoring_terms(&self, include_must: bool) -> Vec<Term> {
        let mut terms = self.should.clone();
        if include_must {
            for (field, tokens) in &self.must {
                terms.extend(tokens.iter().map(|t| Term::new(field, t)));
            }
        }
        terms
    }
}

/// Boolean filtering followed by additive ranking under a pluggable [`Similarity`]
#[derive(Debug, Clone, Default)]
pub struct QueryEvaluator {
    pub options: EvaluatorOptions,
}

impl QueryEvaluator {
    pub fn new(options: EvaluatorOptions) -> Self {
        QueryEvaluator { options }
    }

    pub fn evaluate(
        &self,
        query: &Query,
        index: &InvertedIndex,
        similarity: &dyn Similarity,
    ) -> Result<RankedResult> {
        query.validate()?;
        if query.range().is_some() && index.range_field().is_none() {
            return Err(Error::invalid_query("range filter on an index without a range field"));
        }

        let prepared = PreparedQuery::prepare(query, index.analyzer());
        let candidates = self.candidates(query, &prepared, index);
        let scoring_terms = prepared.scoring_terms(self.options.score_must_clauses);

        let scored = candidates
            .iter()
            .map(|doc| score_document(DocId(doc), &scoring_terms, index, similarity));

        let ranked = match self.options.limit {
            Some(k) => {
                let mut collector = TopKCollector::new(k);
                scored.for_each(|hit| collector.collect(hit));
                collector.into_result()
            }
            None => RankedResult::from_hits(scored.collect()),
        };

        debug!(
            similarity = similarity.name(),
            filtered = query.has_filters(),
            candidates = ranked.total_hits,
            returned = ranked.len(),
            max_score = ranked.max_score,
            "query evaluated"
        );
        Ok(ranked)
    }

    /// Evaluates independent queries in parallel; one failure does not affect the others
    pub fn evaluate_batch(
        &self,
        queries: &[Query],
        index: &InvertedIndex,
        similarity: &dyn Similarity,
    ) -> Vec<Result<RankedResult>> {
        queries
            .par_iter()
            .enumerate()
            .map(|(position, query)| {
                let result = self.evaluate(query, index, similarity);
                if let Err(err) = &result {
                    warn!(query = position, error = %err, "query failed");
                }
                result
            })
            .collect()
    }

    fn candidates(&self, query: &Query, prepared: &PreparedQuery, index: &InvertedIndex) -> RoaringBitmap {
        let mut candidates: Option<RoaringBitmap> = None;

        for (field, terms) in &prepared.must {
            let field_docs = must_set(index, field, terms);
            candidates = Some(match candidates {
                Some(current) => current & field_docs,
                None => field_docs,
            });
        }

        if let Some(range) = query.range() {
            let in_range = index.documents_in_range(range.start..=range.end);
            candidates = Some(match candidates {
                Some(current) => current & in_range,
                None => in_range,
            });
        }

        let mut candidates = candidates.unwrap_or_else(|| index.all_documents().clone());

        for term in &prepared.must_not {
            if let Some(list) = index.search_term(term) {
                candidates -= list.to_bitmap();
            }
        }

        candidates
    }
}

/// Documents of `field` containing every one of `terms`
fn must_set(index: &InvertedIndex, field: &str, terms: &[String]) -> RoaringBitmap {
    let mut lists: Vec<&[Posting]> = terms.iter().map(|t| index.postings(field, t)).collect();
    // Shortest list first keeps the running intersection small
    lists.sort_by_key(|list| list.len());

    let Some((first, rest)) = lists.split_first() else {
        return index.all_documents().clone();
    };
    let mut ids: Vec<DocId> = first.iter().map(|p| p.doc_id).collect();
    for list in rest {
        if ids.is_empty() {
            break;
        }
        ids = intersect_sorted(&ids, list);
    }

    ids.into_iter().map(|id| id.0).collect()
}

fn score_document(
    doc_id: DocId,
    terms: &[Term],
    index: &InvertedIndex,
    similarity: &dyn Similarity,
) -> ScoredDocument {
    let mut score = 0.0f32;
    let mut matched = 0;

    for term in terms {
        let contribution = similarity.score(&term.text, &term.field, doc_id, index);
        if contribution != 0.0 {
            matched += 1;
        }
        score += contribution;
    }

    if !terms.is_empty() {
        score *= similarity.coord(matched, terms.len());
    }
    ScoredDocument::new(doc_id, score)
}

/// Evaluate with default options
pub fn evaluate(query: &Query, index: &InvertedIndex, similarity: &dyn Similarity) -> Result<RankedResult> {
    QueryEvaluator::default().evaluate(query, index, similarity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::IndexConfig;
    use crate::core::error::ErrorKind;
    use crate::core::types::DocumentCollection;
    use crate::scoring::scorer::{Bm25Similarity, VectorSpaceSimilarity};

    fn index() -> InvertedIndex {
        let mut docs = DocumentCollection::new();
        docs.add(|d| d.with_text("title", "online gaming group").with_text("body", "competition").with_number("date", 20110101));
        docs.add(|d| d.with_text("title", "cooking recipes").with_text("body", "pasta").with_number("date", 20090101));
        docs.add(|d| d.with_text("title", "online cooking").with_text("body", "gaming pasta").with_number("date", 20120101));
        let config = IndexConfig {
            text_fields: vec!["title".to_string(), "body".to_string()],
            range_field: Some("date".to_string()),
            allow_missing_fields: false,
        };
        InvertedIndex::build(docs, Analyzer::english_stemming(), &config).unwrap()
    }

    #[test]
    fn must_terms_intersect_within_a_field() {
        let index = index();
        let query = Query::builder().must("title", "online").must("title", "cooking").build().unwrap();
        let ranked = evaluate(&query, &index, &VectorSpaceSimilarity).unwrap();
        assert_eq!(ranked.doc_ids(), vec![DocId(2)]);
    }

    #[test]
    fn must_clauses_on_different_fields_intersect() {
        let index = index();
        let query = Query::builder().must("title", "online").must("body", "pasta").build().unwrap();
        assert_eq!(evaluate(&query, &index, &VectorSpaceSimilarity).unwrap().doc_ids(), vec![DocId(2)]);
    }

    #[test]
    fn must_not_removes_documents_regardless_of_score() {
        let index = index();
        let query = Query::builder()
            .should("title", "online")
            .must_not("body", "pasta")
            .build()
            .unwrap();
        let ranked = evaluate(&query, &index, &Bm25Similarity::default()).unwrap();
        assert_eq!(ranked.doc_ids(), vec![DocId(0)]);
    }

    #[test]
    fn should_only_keeps_every_document_with_zero_for_misses() {
        let index = index();
        let query = Query::builder().should("body", "competition").build().unwrap();
        let ranked = evaluate(&query, &index, &VectorSpaceSimilarity).unwrap();
        assert_eq!(ranked.doc_ids(), vec![DocId(0), DocId(1), DocId(2)]);
        assert_eq!(ranked.hits[0].score, 1.0);
        assert_eq!(ranked.hits[1].score, 0.0);
    }

    #[test]
    fn range_filter_is_inclusive_and_combines_with_must() {
        let index = index();
        let query = Query::builder().range(20110101, 20120101).build().unwrap();
        assert_eq!(evaluate(&query, &index, &VectorSpaceSimilarity).unwrap().doc_ids(), vec![DocId(0), DocId(2)]);

        let query = Query::builder().must("title", "cooking").range(20100101, 20121231).build().unwrap();
        assert_eq!(evaluate(&query, &index, &VectorSpaceSimilarity).unwrap().doc_ids(), vec![DocId(2)]);
    }

    #[test]
    fn query_terms_go_through_the_index_analyzer() {
        let index = index();
        let query = Query::builder().must("title", "Gaming").build().unwrap();
        assert_eq!(evaluate(&query, &index, &VectorSpaceSimilarity).unwrap().doc_ids(), vec![DocId(0)]);
    }

    #[test]
    fn unknown_must_term_yields_an_empty_result() {
        let index = index();
        let query = Query::builder().must("title", "zebra").should("title", "online").build().unwrap();
        let ranked = evaluate(&query, &index, &VectorSpaceSimilarity).unwrap();
        assert!(ranked.is_empty());
        assert_eq!(ranked.total_hits, 0);
    }

    #[test]
    fn must_terms_can_be_excluded_from_scoring() {
        let index = index();
        let query = Query::builder().must("title", "online").build().unwrap();
        let scored = evaluate(&query, &index, &VectorSpaceSimilarity).unwrap();
        assert!(scored.hits.iter().all(|h| h.score == 1.0));

        let evaluator = QueryEvaluator::new(EvaluatorOptions { score_must_clauses: false, limit: None });
        let unscored = evaluator.evaluate(&query, &index, &VectorSpaceSimilarity).unwrap();
        assert!(unscored.hits.iter().all(|h| h.score == 0.0));
        assert_eq!(unscored.doc_ids(), vec![DocId(0), DocId(2)]);
    }

    #[test]
    fn limit_truncates_but_reports_all_candidates() {
        let index = index();
        let evaluator = QueryEvaluator::new(EvaluatorOptions { score_must_clauses: true, limit: Some(1) });
        let query = Query::builder().should("title", "online").build().unwrap();
        let ranked = evaluator.evaluate(&query, &index, &VectorSpaceSimilarity).unwrap();
        assert_eq!(ranked.doc_ids(), vec![DocId(0)]);
        assert_eq!(ranked.total_hits, 3);
    }

    #[test]
    fn invalid_queries_are_reported() {
        let index = index();
        let query: Query = serde_json::from_str(r#"{ "range": { "start": 9, "end": 1 } }"#).unwrap();
        let err = evaluate(&query, &index, &VectorSpaceSimilarity).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidQuery);

        let no_range = InvertedIndex::build(Vec::new(), Analyzer::simple(), &IndexConfig::default()).unwrap();
        let query = Query::builder().range(1, 2).build().unwrap();
        assert_eq!(evaluate(&query, &no_range, &VectorSpaceSimilarity).unwrap_err().kind, ErrorKind::InvalidQuery);
    }

    #[test]
    fn batch_isolates_failures() {
        let index = index();
        let good = Query::builder().should("title", "online").build().unwrap();
        let bad: Query = serde_json::from_str(r#"{ "range": { "start": 9, "end": 1 } }"#).unwrap();
        let results = QueryEvaluator::default().evaluate_batch(&[good.clone(), bad, good], &index, &VectorSpaceSimilarity);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().len(), 3);
    }
}
