use std::sync::Arc;
use tracing::info;
use crate::analysis::analyzer::Analyzer;
use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::types::Document;
use crate::eval::judgments::RelevanceJudgment;
use crate::eval::report::EvaluationReport;
use crate::index::inverted::InvertedIndex;
use crate::query::ast::Query;
use crate::query::parser::QueryParser;
use crate::scoring::scorer::{Similarity, SimilarityKind};
use crate::search::evaluator::{EvaluatorOptions, QueryEvaluator};
use crate::search::results::RankedResult;

/// Index once, then query and evaluate any number of times.
///
/// The index sits behind an `Arc` and is never mutated, so clones of the
/// handle can be moved to other threads freely.
pub struct Engine {
    config: Config,
    index: Arc<InvertedIndex>,
    parser: QueryParser,
    evaluator: QueryEvaluator,
}

impl Engine {
    pub fn new<I>(config: Config, documents: I) -> Result<Self>
    where
        I: IntoIterator<Item = Document>,
    {
        config.validate()?;

        let analyzer = Analyzer::from_config(&config.analyzer);
        let index = Arc::new(InvertedIndex::build(documents, analyzer, &config.index)?);

        let parser = QueryParser::new(config.default_fields())
            .with_range_field(config.index.range_field.clone());
        let evaluator = QueryEvaluator::new(EvaluatorOptions::from(&config.search));

        info!(
            documents = index.document_count(),
            analyzer = %index.analyzer().name,
            similarity = config.similarity.kind.name(),
            "engine ready"
        );

        Ok(Engine {
            config,
            index,
            parser,
            evaluator,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn index(&self) -> &Arc<InvertedIndex> {
        &self.index
    }

    /// Model of `kind` with the configured BM25 parameters
    pub fn similarity(&self, kind: SimilarityKind) -> Box<dyn Similarity> {
        kind.build(self.config.similarity.bm25)
    }

    pub fn search(&self, query: &Query, kind: SimilarityKind) -> Result<RankedResult> {
        let similarity = self.similarity(kind);
        self.evaluator.evaluate(query, &self.index, similarity.as_ref())
    }

    pub fn search_text(&self, text: &str, kind: SimilarityKind) -> Result<RankedResult> {
        let query = self.parser.parse(text)?;
        self.search(&query, kind)
    }

    pub fn search_batch(&self, queries: &[Query], kind: SimilarityKind) -> Vec<Result<RankedResult>> {
        let similarity = self.similarity(kind);
        self.evaluator.evaluate_batch(queries, &self.index, similarity.as_ref())
    }

    /// Evaluation report for `ranked`, titled from the first indexed text field
    pub fn evaluate(&self, kind: SimilarityKind, ranked: &RankedResult, judgment: &RelevanceJudgment) -> EvaluationReport {
        let title_field = self
            .config
            .index
            .text_fields
            .first()
            .map(String::as_str)
            .unwrap_or("title");
        EvaluationReport::build(kind.name(), ranked, judgment, &self.index, title_field)
    }

    /// Judgment for `query` within `search_task`, taken from the indexed documents
    pub fn judgment(&self, query: &str, search_task: u32) -> RelevanceJudgment {
        RelevanceJudgment::from_documents(self.index.documents(), query, search_task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::core::types::{DocId, DocumentCollection, Judgment};

    fn engine() -> Engine {
        let mut docs = DocumentCollection::new();
        docs.add(|d| {
            d.with_text("title", "online gaming group")
                .with_text("abstract", "competition")
                .with_judgment(Judgment::new("online game", 18, true))
        });
        docs.add(|d| {
            d.with_text("title", "cooking recipes")
                .with_text("abstract", "pasta")
                .with_judgment(Judgment::new("online game", 18, false))
        });
        Engine::new(Config::default(), docs).unwrap()
    }

    #[test]
    fn free_text_search_ranks_matching_document_first() {
        let engine = engine();
        let ranked = engine.search_text("online gaming", SimilarityKind::VectorSpace).unwrap();
        assert_eq!(ranked.doc_ids(), vec![DocId(0), DocId(1)]);
        assert_eq!(ranked.hits[0].score, 2.0);
        assert_eq!(ranked.hits[1].score, 0.0);
    }

    #[test]
    fn parse_errors_come_back_from_search_text() {
        let err = engine().search_text("+gaming", SimilarityKind::Bm25).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
    }

    #[test]
    fn report_uses_judgments_from_the_collection() {
        let engine = engine();
        let ranked = engine.search_text("online gaming", SimilarityKind::Bm25).unwrap();
        let judgment = engine.judgment("online game", 18);
        let report = engine.evaluate(SimilarityKind::Bm25, &ranked, &judgment);

        assert_eq!(report.similarity, "bm25");
        assert_eq!(report.relevant_hits, 1);
        assert_eq!(report.recall, 1.0);
        assert_eq!(report.precision, 0.5);
        assert_eq!(report.retrieved[0].title, "online gaming group");
        assert!(report.to_json().unwrap().contains("\"pr_curve\""));
    }

    #[test]
    fn invalid_config_is_rejected_before_indexing() {
        let mut config = Config::default();
        config.index.text_fields.clear();
        let err = Engine::new(config, Vec::new()).err().unwrap();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }
}
