use serde::{Serialize, Deserialize};
use crate::core::types::DocId;
use crate::eval::judgments::RelevanceJudgment;
use crate::search::results::RankedResult;

/// The 11 standard recall levels 0.0, 0.1, ..., 1.0
pub const STANDARD_RECALL_LEVELS: [f64; 11] = [0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0];

// Absorbs rounding in hits / |relevant| when comparing against a level
const RECALL_EPSILON: f64 = 1e-9;

/// Count of the top-`k` ranked documents that are relevant
pub fn hits_at_k(ranked: &[DocId], relevant: &RelevanceJudgment, k: usize) -> usize {
    ranked.iter().take(k).filter(|id| relevant.contains(**id)).count()
}

/// Precision over the documents actually retrieved at cut `k`
pub fn precision_at_k(ranked: &[DocId], relevant: &RelevanceJudgment, k: usize) -> f64 {
    let cut = k.min(ranked.len());
    if cut == 0 {
        return 0.0;
    }
    hits_at_k(ranked, relevant, cut) as f64 / cut as f64
}

pub fn recall_at_k(ranked: &[DocId], relevant: &RelevanceJudgment, k: usize) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    hits_at_k(ranked, relevant, k) as f64 / relevant.len() as f64
}

pub fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

pub fn f1_at_k(ranked: &[DocId], relevant: &RelevanceJudgment, k: usize) -> f64 {
    f1(precision_at_k(ranked, relevant, k), recall_at_k(ranked, relevant, k))
}

/// One point of a precision-recall curve; `rank` is 1-based
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrPoint {
    pub rank: usize,
    pub precision: f64,
    pub recall: f64,
}

/// Precision and recall after each rank, computed with a running hit count
pub fn pr_curve(ranked: &[DocId], relevant: &RelevanceJudgment) -> Vec<PrPoint> {
    let mut hits = 0usize;
    ranked
        .iter()
        .enumerate()
        .map(|(i, id)| {
            if relevant.contains(*id) {
                hits += 1;
            }
            let rank = i + 1;
            PrPoint {
                rank,
                precision: hits as f64 / rank as f64,
                recall: if relevant.is_empty() {
                    0.0
                } else {
                    hits as f64 / relevant.len() as f64
                },
            }
        })
        .collect()
}

/// Mean of the precision values at each relevant hit, over all relevant documents
pub fn average_precision(ranked: &[DocId], relevant: &RelevanceJudgment) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    let mut hits = 0usize;
    let mut sum = 0.0;
    for (i, id) in ranked.iter().enumerate() {
        if relevant.contains(*id) {
            hits += 1;
            sum += hits as f64 / (i + 1) as f64;
        }
    }
    sum / relevant.len() as f64
}

/// Interpolated precision at each recall level: the best precision reached at
/// any recall at or above the level, 0 when the curve never gets there.
pub fn interpolated_precision(curve: &[PrPoint], levels: &[f64]) -> Vec<f64> {
    levels
        .iter()
        .map(|level| {
            curve
                .iter()
                .filter(|point| point.recall + RECALL_EPSILON >= *level)
                .map(|point| point.precision)
                .fold(0.0, f64::max)
        })
        .collect()
}

/// Per-level average of the interpolated curves of several queries
pub fn mean_interpolated_precision(curves: &[Vec<PrPoint>], levels: &[f64]) -> Vec<f64> {
    let mut sums = vec![0.0; levels.len()];
    if curves.is_empty() {
        return sums;
    }
    for curve in curves {
        for (sum, value) in sums.iter_mut().zip(interpolated_precision(curve, levels)) {
            *sum += value;
        }
    }
    sums.iter_mut().for_each(|sum| *sum /= curves.len() as f64);
    sums
}

/// Set-level metrics of one ranked list
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalMetrics {
    pub retrieved: usize,
    pub relevant: usize,
    pub hits: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Scores ranked lists against judgments, optionally at a fixed cutoff.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsEngine {
    pub cutoff: Option<usize>,
}

impl MetricsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at_cutoff(k: usize) -> Self {
        MetricsEngine { cutoff: Some(k) }
    }

    pub fn score(&self, ranked: &RankedResult, judgment: &RelevanceJudgment) -> RetrievalMetrics {
        self.score_ids(&ranked.doc_ids(), judgment)
    }

    pub fn score_ids(&self, ranked: &[DocId], judgment: &RelevanceJudgment) -> RetrievalMetrics {
        let k = self.cutoff.unwrap_or(ranked.len()).min(ranked.len());
        let precision = precision_at_k(ranked, judgment, k);
        let recall = recall_at_k(ranked, judgment, k);
        RetrievalMetrics {
            retrieved: k,
            relevant: judgment.len(),
            hits: hits_at_k(ranked, judgment, k),
            precision,
            recall,
            f1: f1(precision, recall),
        }
    }

    pub fn pr_curve(&self, ranked: &RankedResult, judgment: &RelevanceJudgment) -> Vec<PrPoint> {
        let mut ids = ranked.doc_ids();
        if let Some(k) = self.cutoff {
            ids.truncate(k);
        }
        pr_curve(&ids, judgment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: DocId = DocId(0);
    const B: DocId = DocId(1);
    const C: DocId = DocId(2);
    const D: DocId = DocId(3);

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn cut_metrics_for_a_ranked_list() {
        let ranked = [A, B, C, D];
        let relevant = RelevanceJudgment::new("q", [A, C]);

        assert_eq!(hits_at_k(&ranked, &relevant, 2), 1);
        assert_eq!(precision_at_k(&ranked, &relevant, 2), 0.5);
        assert_eq!(recall_at_k(&ranked, &relevant, 2), 0.5);
        assert_eq!(f1_at_k(&ranked, &relevant, 2), 0.5);
        assert_eq!(hits_at_k(&ranked, &relevant, 3), 2);
        assert!(close(precision_at_k(&ranked, &relevant, 3), 0.667));
        assert_eq!(recall_at_k(&ranked, &relevant, 3), 1.0);
    }

    #[test]
    fn cut_beyond_the_list_uses_retrieved_count() {
        let ranked = [A, B];
        let relevant = RelevanceJudgment::new("q", [A]);
        assert_eq!(precision_at_k(&ranked, &relevant, 10), 0.5);
    }

    #[test]
    fn degenerate_inputs_are_zero() {
        let empty = RelevanceJudgment::default();
        assert_eq!(precision_at_k(&[], &empty, 5), 0.0);
        assert_eq!(recall_at_k(&[A], &empty, 1), 0.0);
        assert_eq!(f1(0.0, 0.0), 0.0);
        assert_eq!(average_precision(&[A], &empty), 0.0);
        assert_eq!(pr_curve(&[A], &empty)[0].recall, 0.0);
    }

    #[test]
    fn curve_is_one_based_and_incremental() {
        let curve = pr_curve(&[A, B, C, D], &RelevanceJudgment::new("q", [A, C]));
        let ranks: Vec<usize> = curve.iter().map(|p| p.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
        assert_eq!(curve[0].precision, 1.0);
        assert_eq!(curve[1].recall, 0.5);
        assert_eq!(curve[3].precision, 0.5);
        assert_eq!(curve[3].recall, 1.0);
    }

    #[test]
    fn average_precision_counts_missed_documents() {
        let relevant = RelevanceJudgment::new("q", [A, C]);
        assert!(close(average_precision(&[A, B, C, D], &relevant), (1.0 + 2.0 / 3.0) / 2.0));

        let partly = RelevanceJudgment::new("q", [A, DocId(9)]);
        assert_eq!(average_precision(&[A, B], &partly), 0.5);
    }

    #[test]
    fn eleven_point_interpolation() {
        let curve = pr_curve(&[A, B, C, D], &RelevanceJudgment::new("q", [A, C]));
        let interpolated = interpolated_precision(&curve, &STANDARD_RECALL_LEVELS);
        assert_eq!(interpolated.len(), 11);
        assert!(interpolated[..6].iter().all(|p| *p == 1.0));
        assert!(interpolated[6..].iter().all(|p| close(*p, 0.667)));
    }

    #[test]
    fn unreached_levels_interpolate_to_zero() {
        let curve = pr_curve(&[A, B], &RelevanceJudgment::new("q", [A, C]));
        let interpolated = interpolated_precision(&curve, &[0.5, 1.0]);
        assert_eq!(interpolated, vec![1.0, 0.0]);
    }

    #[test]
    fn mean_interpolation_averages_per_level() {
        let perfect = pr_curve(&[A], &RelevanceJudgment::new("q", [A]));
        let useless = pr_curve(&[B], &RelevanceJudgment::new("q", [A]));
        assert_eq!(mean_interpolated_precision(&[perfect, useless], &[0.0, 1.0]), vec![0.5, 0.5]);
        assert_eq!(mean_interpolated_precision(&[], &[0.0]), vec![0.0]);
    }

    #[test]
    fn engine_scores_with_and_without_cutoff() {
        let ranked = RankedResult::from_hits(vec![
            crate::search::results::ScoredDocument::new(A, 4.0),
            crate::search::results::ScoredDocument::new(B, 3.0),
            crate::search::results::ScoredDocument::new(C, 2.0),
            crate::search::results::ScoredDocument::new(D, 1.0),
        ]);
        let relevant = RelevanceJudgment::new("q", [A, C]);

        let full = MetricsEngine::new().score(&ranked, &relevant);
        assert_eq!((full.retrieved, full.hits), (4, 2));
        assert_eq!(full.precision, 0.5);
        assert_eq!(full.recall, 1.0);

        let cut = MetricsEngine::at_cutoff(2);
        let top2 = cut.score(&ranked, &relevant);
        assert_eq!((top2.retrieved, top2.hits, top2.f1), (2, 1, 0.5));
        assert_eq!(cut.pr_curve(&ranked, &relevant).len(), 2);
    }
}
