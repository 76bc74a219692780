use chrono::NaiveDate;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::date_key;
use crate::query::ast::{Occur, Query, QueryBuilder};

/// Query parser for converting free text into a [`Query`]
///
/// Examples:
/// - "online gaming" -> SHOULD on every default field
/// - "+title:gaming" -> MUST on title
/// - "-abstract:pasta" -> MUST_NOT on abstract
/// - "-pasta" -> MUST_NOT on every default field
/// - "date:[20100101 TO 2012-12-31]" -> inclusive range
pub struct QueryParser {
    pub default_fields: Vec<String>,
    pub range_field: Option<String>,
}

impl QueryParser {
    pub fn new(default_fields: Vec<String>) -> Self {
        QueryParser {
            default_fields,
            range_field: None,
        }
    }

    pub fn with_range_field(mut self, field: Option<String>) -> Self {
        self.range_field = field;
        self
    }

    pub fn parse(&self, input: &str) -> Result<Query> {
        let mut builder = QueryBuilder::new();
        let mut has_range = false;

        for clause in split_clauses(input)? {
            let (occur, body) = match clause.strip_prefix('+') {
                Some(rest) => (Occur::Must, rest),
                None => match clause.strip_prefix('-') {
                    Some(rest) => (Occur::MustNot, rest),
                    None => (Occur::Should, clause.as_str()),
                },
            };
            if body.is_empty() {
                return Err(parse_error(format!("dangling operator in '{}'", clause)));
            }

            match body.split_once(':') {
                Some((field, value)) if value.starts_with('[') => {
                    if occur != Occur::Should {
                        return Err(parse_error(format!("range '{}' cannot take an operator", clause)));
                    }
                    if has_range {
                        return Err(parse_error("only one range filter is supported".to_string()));
                    }
                    self.check_range_field(field)?;
                    let (start, end) = parse_range(value)?;
                    builder = builder.range(start, end);
                    has_range = true;
                }
                Some((field, value)) => {
                    if field.is_empty() || value.is_empty() {
                        return Err(parse_error(format!("incomplete field clause '{}'", clause)));
                    }
                    builder = builder.clause(occur, field, value);
                }
                None if occur == Occur::Must => {
                    return Err(parse_error(format!(
                        "required term '{}' must name a field, e.g. +title:{}",
                        body, body
                    )));
                }
                None => {
                    builder = builder.terms(occur, &self.default_fields, &[body]);
                }
            }
        }

        builder.build()
    }

    fn check_range_field(&self, field: &str) -> Result<()> {
        match &self.range_field {
            Some(expected) if expected != field => Err(parse_error(format!(
                "range on '{}' but the range field is '{}'",
                field, expected
            ))),
            _ => Ok(()),
        }
    }
}

fn parse_error(context: String) -> Error {
    Error::new(ErrorKind::Parse, context)
}

/// A bracket starts a range only straight after a `field:` prefix
fn opens_range(current: &str) -> bool {
    let body = current.trim_start_matches(['+', '-']);
    body.strip_suffix(':').is_some_and(|field| !field.is_empty() && !field.contains(':'))
}

/// Whitespace split that keeps `[a TO b]` together
fn split_clauses(input: &str) -> Result<Vec<String>> {
    let mut clauses = Vec::new();
    let mut current = String::new();
    let mut in_range = false;

    for ch in input.chars() {
        match ch {
            '[' if opens_range(&current) => {
                in_range = true;
                current.push(ch);
            }
            ']' if in_range => {
                in_range = false;
                current.push(ch);
            }
            c if c.is_whitespace() && !in_range => {
                if !current.is_empty() {
                    clauses.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }

    if in_range {
        return Err(parse_error(format!("unterminated range in '{}'", input)));
    }
    if !current.is_empty() {
        clauses.push(current);
    }
    Ok(clauses)
}

fn parse_range(value: &str) -> Result<(i64, i64)> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or_else(|| parse_error(format!("range '{}' must look like [start TO end]", value)))?;

    let parts: Vec<&str> = inner.split_whitespace().collect();
    match parts.as_slice() {
        [start, "TO", end] => Ok((parse_bound(start)?, parse_bound(end)?)),
        _ => Err(parse_error(format!("range '{}' must look like [start TO end]", value))),
    }
}

fn parse_bound(bound: &str) -> Result<i64> {
    if let Ok(number) = bound.parse::<i64>() {
        return Ok(number);
    }
    NaiveDate::parse_from_str(bound, "%Y-%m-%d")
        .map(|date| date_key(&date))
        .map_err(|_| parse_error(format!("range bound '{}' is neither an integer nor a date", bound)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> QueryParser {
        QueryParser::new(vec!["title".to_string(), "abstract".to_string()])
            .with_range_field(Some("date".to_string()))
    }

    #[test]
    fn free_text_becomes_should_on_default_fields() {
        let query = parser().parse("social multiplayer game").unwrap();
        assert_eq!(query.field_clauses("title").unwrap().should, vec!["social", "multiplayer", "game"]);
        assert_eq!(query.field_clauses("abstract").unwrap().should.len(), 3);
        assert!(!query.has_filters());
    }

    #[test]
    fn operators_and_fields() {
        let query = parser().parse("+title:gaming -abstract:pasta -cooking online").unwrap();
        let title = query.field_clauses("title").unwrap();
        let abstract_ = query.field_clauses("abstract").unwrap();
        assert_eq!(title.must, vec!["gaming"]);
        assert_eq!(title.must_not, vec!["cooking"]);
        assert_eq!(abstract_.must_not, vec!["pasta", "cooking"]);
        assert_eq!(abstract_.should, vec!["online"]);
    }

    #[test]
    fn ranges_accept_integers_and_dates() {
        let query = parser().parse("game date:[20100101 TO 2012-12-31]").unwrap();
        let range = query.range().unwrap();
        assert_eq!((range.start, range.end), (20100101, 20121231));
    }

    #[test]
    fn bracket_inside_a_term_is_not_a_range() {
        let query = parser().parse("a[b c").unwrap();
        assert_eq!(query.field_clauses("title").unwrap().should, vec!["a[b", "c"]);
        assert_eq!(query.field_clauses("abstract").unwrap().should, vec!["a[b", "c"]);
        assert!(query.range().is_none());

        let query = parser().parse("title:x[1 abstract:y]").unwrap();
        assert_eq!(query.field_clauses("title").unwrap().should, vec!["x[1"]);
        assert_eq!(query.field_clauses("abstract").unwrap().should, vec!["y]"]);
    }

    #[test]
    fn inverted_range_surfaces_as_invalid_query() {
        let err = parser().parse("date:[2012 TO 2010]").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidQuery);
    }

    #[test]
    fn malformed_input_is_a_parse_error() {
        for input in ["+gaming", "date:[1 TO", "date:[1 2]", "year:[1 TO 2]", "title:", "+", "-date:[1 TO 2]"] {
            assert_eq!(parser().parse(input).unwrap_err().kind, ErrorKind::Parse, "{}", input);
        }
    }

    #[test]
    fn empty_input_matches_everything() {
        assert_eq!(parser().parse("   ").unwrap(), Query::match_all());
    }
}
