use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use serde::{Serialize, Deserialize};
use tracing::{debug, warn};
use crate::core::error::Result;
use crate::eval::judgments::RelevanceJudgment;
use crate::eval::metrics::{average_precision, MetricsEngine, PrPoint};
use crate::index::inverted::InvertedIndex;
use crate::search::results::RankedResult;

/// One `"<rank> <precision> <recall>"` line per point
pub fn format_pr_curve(curve: &[PrPoint]) -> String {
    let mut out = String::with_capacity(curve.len() * 24);
    for point in curve {
        // `{:?}` keeps the trailing ".0" on whole numbers, which plotting tools expect
        let _ = writeln!(out, "{} {:?} {:?}", point.rank, point.precision, point.recall);
    }
    out
}

pub fn write_pr_curve(path: &Path, curve: &[PrPoint]) -> Result<()> {
    fs::write(path, format_pr_curve(curve))?;
    debug!(path = %path.display(), points = curve.len(), "wrote precision-recall curve");
    Ok(())
}

/// Writes every curve to its own file. Each file reports its own outcome, so
/// one failure never stops the remaining writes.
pub fn write_pr_curves(batch: &[(PathBuf, Vec<PrPoint>)]) -> Vec<Result<()>> {
    batch
        .iter()
        .map(|(path, curve)| {
            let result = write_pr_curve(path, curve);
            if let Err(err) = &result {
                warn!(path = %path.display(), error = %err, "failed to write precision-recall curve");
            }
            result
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub title: String,
    pub score: f32,
}

/// Summary of one ranked list against its judgment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub query: String,
    pub similarity: String,
    pub total_hits: usize,
    pub max_score: f32,
    pub relevant_hits: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub average_precision: f64,
    pub pr_curve: Vec<PrPoint>,
    pub retrieved: Vec<RetrievedDocument>,
}

impl EvaluationReport {
    pub fn build(
        similarity: &str,
        ranked: &RankedResult,
        judgment: &RelevanceJudgment,
        index: &InvertedIndex,
        title_field: &str,
    ) -> Self {
        let engine = MetricsEngine::new();
        let metrics = engine.score(ranked, judgment);
        let retrieved = ranked
            .titles(index, title_field)
            .into_iter()
            .map(|(title, score)| RetrievedDocument { title, score })
            .collect();

        EvaluationReport {
            query: judgment.label.clone(),
            similarity: similarity.to_string(),
            total_hits: ranked.total_hits,
            max_score: ranked.max_score,
            relevant_hits: metrics.hits,
            precision: metrics.precision,
            recall: metrics.recall,
            f1: metrics.f1,
            average_precision: average_precision(&ranked.doc_ids(), judgment),
            pr_curve: engine.pr_curve(ranked, judgment),
            retrieved,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
