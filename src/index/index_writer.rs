use std::collections::{BTreeMap, HashMap};
use roaring::RoaringBitmap;
use tracing::{debug, info};
use crate::analysis::analyzer::Analyzer;
use crate::core::config::IndexConfig;
use crate::core::error::{Error, Result};
use crate::core::types::{DocId, Document, FieldValue};
use crate::index::inverted::{FieldIndex, InvertedIndex};
use crate::index::posting::PostingList;

/// IndexWriter accumulates postings in one pass and freezes them into an InvertedIndex
pub struct IndexWriter {
    pub analyzer: Analyzer,
    pub config: IndexConfig,
    fields: BTreeMap<String, FieldIndex>,
    documents: BTreeMap<DocId, Document>,
    all_docs: RoaringBitmap,
    range_index: BTreeMap<i64, RoaringBitmap>,
}

/// Per-field term counts of one document, computed before anything is committed
struct AnalyzedDocument {
    fields: Vec<(String, HashMap<String, u32>, u32)>,
    range_key: Option<i64>,
}

impl IndexWriter {
    /// Fails when the field layout would index one field twice
    pub fn new(analyzer: Analyzer, config: IndexConfig) -> Result<Self> {
        if let Some(conflict) = config.field_conflict() {
            return Err(Error::index_build(conflict));
        }

        let fields = config
            .text_fields
            .iter()
            .map(|name| (name.clone(), FieldIndex::new()))
            .collect();

        Ok(IndexWriter {
            analyzer,
            config,
            fields,
            documents: BTreeMap::new(),
            all_docs: RoaringBitmap::new(),
            range_index: BTreeMap::new(),
        })
    }

    /// Index a document. A rejected document leaves the writer untouched.
    pub fn index_document(&mut self, doc: Document) -> Result<()> {
        if self.all_docs.contains(doc.id.0) {
            return Err(Error::index_build(format!("duplicate document id {}", doc.id.0)));
        }

        let analyzed = self.analyze_document(&doc)?;

        for (field_name, term_counts, length) in analyzed.fields {
            let field = self.fields.entry(field_name).or_default();
            for (term, freq) in term_counts {
                field.postings
                    .entry(term)
                    .or_insert_with(PostingList::new)
                    .add_occurrences(doc.id, freq);
            }
            field.doc_lengths.insert(doc.id, length);
            field.total_tokens += length as u64;
        }

        if let Some(key) = analyzed.range_key {
            self.range_index.entry(key).or_default().insert(doc.id.0);
        }

        self.all_docs.insert(doc.id.0);
        self.documents.insert(doc.id, doc);
        Ok(())
    }

    /// Index multiple documents in batch
    pub fn index_documents_batch<I>(&mut self, docs: I) -> Result<()>
    where
        I: IntoIterator<Item = Document>,
    {
        for doc in docs {
            self.index_document(doc)?;
        }
        Ok(())
    }

    fn analyze_document(&self, doc: &Document) -> Result<AnalyzedDocument> {
        let mut fields = Vec::with_capacity(self.config.text_fields.len());

        for field_name in &self.config.text_fields {
            let text = match doc.get_field(field_name) {
                Some(FieldValue::Text(text)) => text.as_str(),
                Some(other) => {
                    return Err(Error::index_build(format!(
                        "document {}: field '{}' holds {:?}, expected text",
                        doc.id.0, field_name, other
                    )));
                }
                None if self.config.allow_missing_fields => "",
                None => {
                    return Err(Error::index_build(format!(
                        "document {}: missing required text field '{}'",
                        doc.id.0, field_name
                    )));
                }
            };

            let tokens = self.analyzer.tokenize(text);
            let length = tokens.len() as u32;
            let mut term_counts: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *term_counts.entry(token).or_insert(0) += 1;
            }
            fields.push((field_name.clone(), term_counts, length));
        }

        let range_key = match &self.config.range_field {
            Some(range_field) => match doc.get_field(range_field) {
                Some(value) => Some(value.range_key().ok_or_else(|| {
                    Error::index_build(format!(
                        "document {}: range field '{}' is not numeric or a date",
                        doc.id.0, range_field
                    ))
                })?),
                None => None,
            },
            None => None,
        };

        Ok(AnalyzedDocument { fields, range_key })
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Freeze the accumulated state. No further writes are possible.
    pub fn finish(self) -> InvertedIndex {
        for (name, field) in &self.fields {
            debug!(field = %name, vocabulary = field.vocabulary_size(), tokens = field.total_tokens, "field indexed");
        }
        info!(
            documents = self.documents.len(),
            fields = self.fields.len(),
            analyzer = %self.analyzer.name,
            "inverted index built"
        );

        InvertedIndex {
            analyzer: self.analyzer,
            fields: self.fields,
            documents: self.documents,
            all_docs: self.all_docs,
            range_field: self.config.range_field,
            range_index: self.range_index,
        }
    }
}
