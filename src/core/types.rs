use serde::{Serialize, Deserialize};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocId(pub u32);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Number(i64),
    Date(NaiveDate),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Integer key used by the range index. Dates encode as `YYYYMMDD`.
    pub fn range_key(&self) -> Option<i64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Date(date) => Some(date_key(date)),
            FieldValue::Text(_) => None,
        }
    }
}

pub fn date_key(date: &NaiveDate) -> i64 {
    date.year() as i64 * 10_000 + date.month() as i64 * 100 + date.day() as i64
}

/// Evaluation metadata carried by judged collections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Judgment {
    pub query: String,
    pub search_task: u32,
    pub relevant: bool,
}

impl Judgment {
    pub fn new(query: impl Into<String>, search_task: u32, relevant: bool) -> Self {
        Judgment {
            query: query.into(),
            search_task,
            relevant,
        }
    }
}

/// Identity is the id alone: two documents are equal iff their ids match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub fields: HashMap<String, FieldValue>,
    pub judgment: Option<Judgment>,
}

impl Document {
    pub fn new(id: DocId) -> Self {
        Document {
            id,
            fields: HashMap::new(),
            judgment: None,
        }
    }

    pub fn add_field(&mut self, name: String, value: FieldValue) {
        self.fields.insert(name, value);
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get_field(name).and_then(FieldValue::as_text)
    }

    pub fn with_text(mut self, name: &str, text: impl Into<String>) -> Self {
        self.add_field(name.to_string(), FieldValue::Text(text.into()));
        self
    }

    pub fn with_number(mut self, name: &str, value: i64) -> Self {
        self.add_field(name.to_string(), FieldValue::Number(value));
        self
    }

    pub fn with_date(mut self, name: &str, date: NaiveDate) -> Self {
        self.add_field(name.to_string(), FieldValue::Date(date));
        self
    }

    pub fn with_judgment(mut self, judgment: Judgment) -> Self {
        self.judgment = Some(judgment);
        self
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Document {}

impl Hash for Document {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Arena that hands out sequential ids at ingestion time.
#[derive(Debug, Clone, Default)]
pub struct DocumentCollection {
    documents: Vec<Document>,
}

impl DocumentCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> DocId {
        DocId(self.documents.len() as u32)
    }

    /// Appends a document; the closure fills in fields for the id it is handed.
    pub fn add<F>(&mut self, build: F) -> DocId
    where
        F: FnOnce(Document) -> Document,
    {
        let id = self.next_id();
        let mut document = build(Document::new(id));
        document.id = id;
        self.documents.push(document);
        id
    }

    pub fn get(&self, id: DocId) -> Option<&Document> {
        self.documents.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    pub fn into_documents(self) -> Vec<Document> {
        self.documents
    }
}

impl IntoIterator for DocumentCollection {
    type Item = Document;
    type IntoIter = std::vec::IntoIter<Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.into_iter()
    }
}
