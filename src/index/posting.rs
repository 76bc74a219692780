use roaring::RoaringBitmap;
use serde::{Serialize, Deserialize};
use crate::core::types::DocId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub term_freq: u32,       // Term frequency in the document's field
}

/// Posting list for a term
/// Note: Sorted by doc_id, one entry per document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostingList {
    pub postings: Vec<Posting>,  // Sorted by doc_id
}

impl PostingList {
    pub fn new() -> Self {
        PostingList {
            postings: Vec::new(),
        }
    }

    /// Adds `freq` occurrences for `doc_id`, creating the entry if absent
    pub fn add_occurrences(&mut self, doc_id: DocId, freq: u32) {
        // Ids usually arrive ascending, so the common case is a push
        if let Some(last) = self.postings.last_mut() {
            if last.doc_id == doc_id {
                last.term_freq += freq;
                return;
            }
            if last.doc_id < doc_id {
                self.postings.push(Posting { doc_id, term_freq: freq });
                return;
            }
        }
        match self.postings.binary_search_by_key(&doc_id, |p| p.doc_id) {
            Ok(pos) => self.postings[pos].term_freq += freq,
            Err(pos) => self.postings.insert(pos, Posting { doc_id, term_freq: freq }),
        }
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    pub fn doc_freq(&self) -> u32 {
        self.postings.len() as u32
    }

    pub fn term_freq(&self, doc_id: DocId) -> u32 {
        self.postings
            .binary_search_by_key(&doc_id, |p| p.doc_id)
            .map(|pos| self.postings[pos].term_freq)
            .unwrap_or(0)
    }

    pub fn as_slice(&self) -> &[Posting] {
        &self.postings
    }

    pub fn to_bitmap(&self) -> RoaringBitmap {
        // Postings are sorted and unique, so the bulk constructor applies
        RoaringBitmap::from_sorted_iter(self.postings.iter().map(|p| p.doc_id.0))
            .unwrap_or_else(|_| self.postings.iter().map(|p| p.doc_id.0).collect())
    }

    pub fn doc_ids(&self) -> Vec<DocId> {
        self.postings.iter().map(|p| p.doc_id).collect()
    }

    /// Intersect two posting lists (simple linear merge), returning matching ids
    pub fn intersect(&self, other: &PostingList) -> Vec<DocId> {
        intersect_sorted(&self.doc_ids(), &other.postings)
    }
}

/// Linear merge of an ascending id list with a doc-id-sorted posting slice
pub fn intersect_sorted(ids: &[DocId], postings: &[Posting]) -> Vec<DocId> {
    let mut result = Vec::new();
    let mut i = 0;
    let mut j = 0;

    while i < ids.len() && j < postings.len() {
        let doc_id1 = ids[i];
        let doc_id2 = postings[j].doc_id;

        if doc_id1 == doc_id2 {
            result.push(doc_id1);
            i += 1;
            j += 1;
        } else if doc_id1 < doc_id2 {
            i += 1;
        } else {
            j += 1;
        }
    }

    result
}
