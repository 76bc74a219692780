use std::collections::BinaryHeap;
use std::cmp::Ordering;
use serde::{Serialize, Deserialize};
use crate::core::types::DocId;
use crate::index::inverted::InvertedIndex;

/// Ranked result list: score descending, ties by ascending doc id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub hits: Vec<ScoredDocument>,
    pub total_hits: usize,   // Candidates that passed filtering, before any limit
    pub max_score: f32,
}

impl RankedResult {
    pub fn from_hits(mut hits: Vec<ScoredDocument>) -> Self {
        hits.sort();
        let total_hits = hits.len();
        let max_score = hits.first().map(|h| h.score).unwrap_or(0.0);
        RankedResult {
            hits,
            total_hits,
            max_score,
        }
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoredDocument> {
        self.hits.iter()
    }

    pub fn doc_ids(&self) -> Vec<DocId> {
        self.hits.iter().map(|h| h.doc_id).collect()
    }

    /// `(display text, score)` pairs, using `field` of each stored document
    pub fn titles(&self, index: &InvertedIndex, field: &str) -> Vec<(String, f32)> {
        self.hits
            .iter()
            .map(|hit| {
                let title = index
                    .document(hit.doc_id)
                    .and_then(|doc| doc.text(field))
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("#{}", hit.doc_id.0));
                (title, hit.score)
            })
            .collect()
    }
}

/// Document with relevance score
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub doc_id: DocId,
    pub score: f32,
}

impl ScoredDocument {
    pub fn new(doc_id: DocId, score: f32) -> Self {
        ScoredDocument { doc_id, score }
    }
}

// Ordering is rank order: a "smaller" document ranks higher
impl Ord for ScoredDocument {
    fn cmp(&self, other: &Self) -> Ordering {
        other.score
            .total_cmp(&self.score)
            .then_with(|| self.doc_id.cmp(&other.doc_id))
    }
}

impl PartialOrd for ScoredDocument {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScoredDocument {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScoredDocument {}

/// Top-K collector for efficient result collection
pub struct TopKCollector {
    pub heap: BinaryHeap<ScoredDocument>,  // Max-heap on rank order: peek() is the worst kept hit
    pub k: usize,
    pub total_collected: usize,  // Track total documents processed
}

impl TopKCollector {
    pub fn new(k: usize) -> Self {
        TopKCollector {
            heap: BinaryHeap::with_capacity(k.saturating_add(1).min(1024)),
            k,
            total_collected: 0,
        }
    }

    pub fn collect(&mut self, scored_doc: ScoredDocument) {
        self.total_collected += 1;
        if self.k == 0 {
            return;
        }

        if self.heap.len() < self.k {
            self.heap.push(scored_doc);
        } else if let Some(worst) = self.heap.peek() {
            if scored_doc < *worst {
                self.heap.pop();
                self.heap.push(scored_doc);
            }
        }
    }

    pub fn into_result(self) -> RankedResult {
        let hits = self.heap.into_sorted_vec();
        let max_score = hits.first().map(|h| h.score).unwrap_or(0.0);
        RankedResult {
            hits,
            total_hits: self.total_collected,
            max_score,
        }
    }
}
