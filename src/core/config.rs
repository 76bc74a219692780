use std::collections::HashSet;
use std::path::Path;
use serde::{Serialize, Deserialize};
use crate::core::error::{Error, ErrorKind, Result};
use crate::scoring::scorer::{Bm25Params, SimilarityKind};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub index: IndexConfig,
    pub analyzer: AnalyzerConfig,
    pub similarity: SimilarityConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub text_fields: Vec<String>,       // Fields tokenized into postings
    pub range_field: Option<String>,    // Single ordered field backing range filters
    pub allow_missing_fields: bool,     // Index a missing text field as empty instead of failing
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            text_fields: vec!["title".to_string(), "abstract".to_string()],
            range_field: None,
            allow_missing_fields: false,
        }
    }
}

impl IndexConfig {
    /// Describes a field layout that would index one field twice
    pub fn field_conflict(&self) -> Option<String> {
        let mut seen = HashSet::new();
        if let Some(field) = self.text_fields.iter().find(|f| !seen.insert(f.as_str())) {
            return Some(format!("text field '{}' is listed more than once", field));
        }
        match &self.range_field {
            Some(range) if seen.contains(range.as_str()) => {
                Some(format!("range field '{}' is also a text field", range))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerKind {
    Standard,   // Unicode word boundaries, keeps digits
    Letter,     // Maximal runs of letters
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub tokenizer: TokenizerKind,
    pub stop_words: bool,
    pub stemming: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            tokenizer: TokenizerKind::Letter,
            stop_words: false,
            stemming: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    pub kind: SimilarityKind,
    pub bm25: Bm25Params,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Fields targeted by unqualified free-text terms; empty means every text field
    pub default_fields: Vec<String>,
    pub score_must_clauses: bool,
    pub limit: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            default_fields: Vec::new(),
            score_must_clauses: true,
            limit: None,
        }
    }
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Fields free-text terms expand to
    pub fn default_fields(&self) -> Vec<String> {
        if self.search.default_fields.is_empty() {
            self.index.text_fields.clone()
        } else {
            self.search.default_fields.clone()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.index.text_fields.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                "at least one text field must be indexed".to_string(),
            ));
        }
        if let Some(field) = self.index.text_fields.iter().find(|f| f.trim().is_empty()) {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                format!("blank text field name {:?}", field),
            ));
        }
        if let Some(conflict) = self.index.field_conflict() {
            return Err(Error::new(ErrorKind::InvalidArgument, conflict));
        }
        for field in &self.search.default_fields {
            if !self.index.text_fields.contains(field) {
                return Err(Error::new(
                    ErrorKind::InvalidArgument,
                    format!("default field '{}' is not an indexed text field", field),
                ));
            }
        }
        self.similarity.bm25.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_index_title_and_abstract_with_stemming() {
        let config = Config::default();
        assert_eq!(config.index.text_fields, vec!["title", "abstract"]);
        assert!(config.analyzer.stemming);
        assert_eq!(config.similarity.kind, SimilarityKind::Bm25);
        assert_eq!(config.default_fields(), vec!["title", "abstract"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = Config::from_json_str(
            r#"{ "index": { "text_fields": ["title", "body"], "range_field": "date" },
                 "similarity": { "kind": "vector_space" } }"#,
        )
        .unwrap();
        assert_eq!(config.index.range_field.as_deref(), Some("date"));
        assert_eq!(config.similarity.kind, SimilarityKind::VectorSpace);
        assert_eq!(config.similarity.bm25.k1, 1.2);
        assert!(config.search.score_must_clauses);
    }

    #[test]
    fn loads_from_file_and_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranklab.json");
        std::fs::write(&path, r#"{ "analyzer": { "stemming": false } }"#).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert!(!config.analyzer.stemming);
        assert_eq!(config.index.text_fields, vec!["title", "abstract"]);

        let err = Config::from_file(dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Io);
    }

    #[test]
    fn rejects_default_field_that_is_not_indexed() {
        let err = Config::from_json_str(r#"{ "search": { "default_fields": ["body"] } }"#)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn rejects_fields_that_would_be_indexed_twice() {
        let err = Config::from_json_str(r#"{ "index": { "text_fields": ["title", "title"] } }"#)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);

        let err = Config::from_json_str(r#"{ "index": { "text_fields": ["title", "date"], "range_field": "date" } }"#)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn rejects_empty_field_list() {
        let err = Config::from_json_str(r#"{ "index": { "text_fields": [] } }"#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }
}
