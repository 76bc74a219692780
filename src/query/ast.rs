use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use crate::core::error::Result;
use crate::query::types::QueryValidator;

/// Boolean occurrence of a term group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occur {
    Must,       // All terms must occur (AND)
    Should,     // Scored, not required (OR)
    MustNot,    // No term may occur (NOT)
}

/// Term groups targeting one field. Terms are raw text; the index analyzer
/// normalizes them at evaluation time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldClauses {
    pub must: Vec<String>,
    pub should: Vec<String>,
    pub must_not: Vec<String>,
}

impl FieldClauses {
    pub fn terms(&self, occur: Occur) -> &[String] {
        match occur {
            Occur::Must => &self.must,
            Occur::Should => &self.should,
            Occur::MustNot => &self.must_not,
        }
    }

    fn terms_mut(&mut self, occur: Occur) -> &mut Vec<String> {
        match occur {
            Occur::Must => &mut self.must,
            Occur::Should => &mut self.should,
            Occur::MustNot => &mut self.must_not,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.should.is_empty() && self.must_not.is_empty()
    }

    pub fn len(&self) -> usize {
        self.must.len() + self.should.len() + self.must_not.len()
    }
}

/// Inclusive numeric range over the index's range field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeFilter {
    pub start: i64,
    pub end: i64,
}

/// Fully constructed boolean + ranked query.
///
/// Built through [`QueryBuilder`]; a `Query` is never observed half-built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    #[serde(default)]
    clauses: BTreeMap<String, FieldClauses>,
    #[serde(default)]
    range: Option<RangeFilter>,
}

impl Query {
    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }

    /// Query with no clauses: matches every document with score 0
    pub fn match_all() -> Self {
        Query::default()
    }

    pub fn clauses(&self) -> &BTreeMap<String, FieldClauses> {
        &self.clauses
    }

    pub fn field_clauses(&self, field: &str) -> Option<&FieldClauses> {
        self.clauses.get(field)
    }

    pub fn range(&self) -> Option<RangeFilter> {
        self.range
    }

    pub fn has_filters(&self) -> bool {
        self.range.is_some()
            || self
                .clauses
                .values()
                .any(|c| !c.must.is_empty() || !c.must_not.is_empty())
    }

    /// Iterate over `(field, term)` pairs of one occurrence kind
    pub fn terms(&self, occur: Occur) -> impl Iterator<Item = (&str, &str)> {
        self.clauses.iter().flat_map(move |(field, clauses)| {
            clauses
                .terms(occur)
                .iter()
                .map(move |term| (field.as_str(), term.as_str()))
        })
    }

    pub fn validate(&self) -> Result<()> {
        QueryValidator::default().validate(self)
    }
}

/// Accumulates clauses by value and only hands out a [`Query`] from [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    clauses: BTreeMap<String, FieldClauses>,
    range: Option<RangeFilter>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clause(mut self, occur: Occur, field: &str, term: &str) -> Self {
        self.clauses
            .entry(field.to_string())
            .or_default()
            .terms_mut(occur)
            .push(term.to_string());
        self
    }

    pub fn must(self, field: &str, term: &str) -> Self {
        self.clause(Occur::Must, field, term)
    }

    pub fn should(self, field: &str, term: &str) -> Self {
        self.clause(Occur::Should, field, term)
    }

    pub fn must_not(self, field: &str, term: &str) -> Self {
        self.clause(Occur::MustNot, field, term)
    }

    /// Adds every term to every field under one occurrence
    pub fn terms<F, T>(mut self, occur: Occur, fields: &[F], terms: &[T]) -> Self
    where
        F: AsRef<str>,
        T: AsRef<str>,
    {
        for field in fields {
            for term in terms {
                self = self.clause(occur, field.as_ref(), term.as_ref());
            }
        }
        self
    }

    pub fn range(mut self, start: i64, end: i64) -> Self {
        self.range = Some(RangeFilter { start, end });
        self
    }

    /// Validates and freezes the query
    pub fn build(self) -> Result<Query> {
        let query = Query {
            clauses: self.clauses,
            range: self.range,
        };
        query.validate()?;
        Ok(query)
    }
}
