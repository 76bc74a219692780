use std::collections::HashSet;
use serde::{Serialize, Deserialize};
use crate::core::types::{DocId, Document};

/// Ground truth for one query: the documents judged relevant to it.
///
/// Only the metrics code reads judgments; the evaluator never sees them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevanceJudgment {
    pub label: String,
    pub relevant: HashSet<DocId>,
}

impl RelevanceJudgment {
    pub fn new<I>(label: impl Into<String>, relevant: I) -> Self
    where
        I: IntoIterator<Item = DocId>,
    {
        RelevanceJudgment {
            label: label.into(),
            relevant: relevant.into_iter().collect(),
        }
    }

    /// Collects documents marked relevant for `query` within `search_task`
    pub fn from_documents<'a, I>(documents: I, query: &str, search_task: u32) -> Self
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let relevant = documents
            .into_iter()
            .filter(|doc| {
                doc.judgment.as_ref().is_some_and(|j| {
                    j.relevant && j.query == query && j.search_task == search_task
                })
            })
            .map(|doc| doc.id)
            .collect();

        RelevanceJudgment {
            label: query.to_string(),
            relevant,
        }
    }

    pub fn contains(&self, doc_id: DocId) -> bool {
        self.relevant.contains(&doc_id)
    }

    pub fn len(&self) -> usize {
        self.relevant.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relevant.is_empty()
    }
}
