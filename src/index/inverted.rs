use std::collections::{BTreeMap, HashMap};
use std::ops::RangeInclusive;
use roaring::RoaringBitmap;
use serde::{Serialize, Deserialize};
use crate::analysis::analyzer::Analyzer;
use crate::core::config::IndexConfig;
use crate::core::error::Result;
use crate::core::types::{DocId, Document};
use crate::index::index_writer::IndexWriter;
use crate::index::posting::{Posting, PostingList};

/// A normalized token scoped to one field; fields never share vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Term {
    pub field: String,
    pub text: String,
}

impl Term {
    pub fn new(field: &str, text: &str) -> Self {
        Term {
            field: field.to_string(),
            text: text.to_string(),
        }
    }
}

/// Postings and length statistics of a single text field
#[derive(Debug, Clone, Default)]
pub struct FieldIndex {
    pub postings: HashMap<String, PostingList>,
    pub doc_lengths: HashMap<DocId, u32>,
    pub total_tokens: u64,
}

impl FieldIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.postings.len()
    }
}

/// Immutable inverted index over a document collection.
///
/// Built once by [`InvertedIndex::build`]; every accessor takes `&self`, so a
/// built index can be shared across threads and queried concurrently.
#[derive(Debug)]
pub struct InvertedIndex {
    pub(crate) analyzer: Analyzer,
    pub(crate) fields: BTreeMap<String, FieldIndex>,
    pub(crate) documents: BTreeMap<DocId, Document>,
    pub(crate) all_docs: RoaringBitmap,
    pub(crate) range_field: Option<String>,
    pub(crate) range_index: BTreeMap<i64, RoaringBitmap>,
}

impl InvertedIndex {
    /// Single pass over `documents`; fails on the first inconsistent document.
    pub fn build<I>(documents: I, analyzer: Analyzer, config: &IndexConfig) -> Result<Self>
    where
        I: IntoIterator<Item = Document>,
    {
        let mut writer = IndexWriter::new(analyzer, config.clone())?;
        writer.index_documents_batch(documents)?;
        Ok(writer.finish())
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Empty slice when the term or field is unseen
    pub fn postings(&self, field: &str, term: &str) -> &[Posting] {
        self.posting_list(field, term)
            .map(PostingList::as_slice)
            .unwrap_or(&[])
    }

    pub fn posting_list(&self, field: &str, term: &str) -> Option<&PostingList> {
        self.fields.get(field).and_then(|f| f.postings.get(term))
    }

    pub fn search_term(&self, term: &Term) -> Option<&PostingList> {
        self.posting_list(&term.field, &term.text)
    }

    pub fn term_frequency(&self, field: &str, term: &str, doc_id: DocId) -> u32 {
        self.posting_list(field, term)
            .map(|list| list.term_freq(doc_id))
            .unwrap_or(0)
    }

    pub fn document_frequency(&self, field: &str, term: &str) -> u32 {
        self.posting_list(field, term)
            .map(PostingList::doc_freq)
            .unwrap_or(0)
    }

    pub fn document_length(&self, field: &str, doc_id: DocId) -> u32 {
        self.fields
            .get(field)
            .and_then(|f| f.doc_lengths.get(&doc_id).copied())
            .unwrap_or(0)
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Mean token count of `field` over all documents; 0.0 for an empty index
    pub fn average_document_length(&self, field: &str) -> f32 {
        let total_docs = self.document_count();
        match self.fields.get(field) {
            Some(f) if total_docs > 0 => f.total_tokens as f32 / total_docs as f32,
            _ => 0.0,
        }
    }

    pub fn document(&self, doc_id: DocId) -> Option<&Document> {
        self.documents.get(&doc_id)
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    pub fn all_documents(&self) -> &RoaringBitmap {
        &self.all_docs
    }

    pub fn range_field(&self) -> Option<&str> {
        self.range_field.as_deref()
    }

    /// Documents whose range value lies in `range` (inclusive)
    pub fn documents_in_range(&self, range: RangeInclusive<i64>) -> RoaringBitmap {
        let mut matched = RoaringBitmap::new();
        if range.start() > range.end() {
            return matched;
        }
        for docs in self.range_index.range(range).map(|(_, docs)| docs) {
            matched |= docs;
        }
        matched
    }

    /// Get an iterator over all terms of a field
    pub fn terms<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> {
        self.fields
            .get(field)
            .into_iter()
            .flat_map(|f| f.postings.keys().map(String::as_str))
    }
}
