use crate::core::error::{Error, Result};
use crate::query::ast::Query;

/// Query validation configuration
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    pub max_clause_terms: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            max_clause_terms: 1024,
        }
    }
}

/// Structural checks shared by the builder and the evaluator
#[derive(Debug, Clone, Default)]
pub struct QueryValidator {
    config: ValidationConfig,
}

impl QueryValidator {
    pub fn new(config: ValidationConfig) -> Self {
        QueryValidator { config }
    }

    pub fn validate(&self, query: &Query) -> Result<()> {
        self.validate_range(query)?;
        self.validate_clauses(query)?;
        Ok(())
    }

    fn validate_range(&self, query: &Query) -> Result<()> {
        if let Some(range) = query.range() {
            if range.start > range.end {
                return Err(Error::invalid_query(format!(
                    "range start {} is after range end {}",
                    range.start, range.end
                )));
            }
        }
        Ok(())
    }

    fn validate_clauses(&self, query: &Query) -> Result<()> {
        let mut total_terms = 0;

        for (field, clauses) in query.clauses() {
            if field.trim().is_empty() {
                return Err(Error::invalid_query("clause targets a blank field name"));
            }
            let all_terms = clauses.must.iter().chain(&clauses.should).chain(&clauses.must_not);
            for term in all_terms {
                if term.trim().is_empty() {
                    return Err(Error::invalid_query(format!(
                        "blank term in a clause on field '{}'",
                        field
                    )));
                }
            }
            total_terms += clauses.len();
        }

        if total_terms > self.config.max_clause_terms {
            return Err(Error::invalid_query(format!(
                "query has {} clause terms, max is {}",
                total_terms, self.config.max_clause_terms
            )));
        }
        Ok(())
    }
}
