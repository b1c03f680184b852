//! jq-style query filters for `--query`
//!
//! Supports field access (`.foo`, `.["foo"]`), indexing (`.[0]`), iteration
//! (`.[]`), pipes, `select(...)` with comparisons, `and`/`or` and `not`.
//! Evaluation never mutates the input and yields results lazily.

mod eval;
mod lexer;
mod parser;

pub use eval::Results;
pub use parser::{CompareOp, Filter};

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("invalid query at position {offset}: {message}")]
    Syntax { offset: usize, message: String },
    #[error("query failed: {0}")]
    Type(String),
}

impl QueryError {
    pub(crate) fn syntax(offset: usize, message: impl Into<String>) -> Self {
        QueryError::Syntax {
            offset,
            message: message.into(),
        }
    }
}

/// A parsed query, reusable across inputs
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    filter: Filter,
}

impl Query {
    pub fn parse(expression: &str) -> Result<Self, QueryError> {
        let tokens = lexer::tokenize(expression)?;
        let filter = parser::parse(tokens, expression.len())?;
        Ok(Self { filter })
    }

    /// Lazily evaluate against `input`
    pub fn results(&self, input: Value) -> Results<'_> {
        eval::eval(&self.filter, input)
    }
}

/// Parse and run `expression` against `input`, collecting every result.
/// Fails on the first syntax or type error.
pub fn apply(expression: &str, input: &Value) -> Result<Vec<Value>, QueryError> {
    Query::parse(expression)?.results(input.clone()).collect()
}
