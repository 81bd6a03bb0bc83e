//! Statement results
//!
//! Every statement produces a `QueryResult`: a status message, plus a result
//! set for statements that return rows.

use std::fmt;

use crate::catalog::ColumnAttribute;
use crate::storage::Row;

/// Rows returned by a statement, with their column names and attributes
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    /// Column names, in output order
    pub column_names: Vec<String>,
    /// Column attributes, co-indexed with `column_names`
    pub column_attributes: Vec<ColumnAttribute>,
    /// Result rows
    pub rows: Vec<Row>,
}

/// Query result
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    result_set: Option<ResultSet>,
    message: String,
}

impl QueryResult {
    /// Create a result with only a message
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            result_set: None,
            message: message.into(),
        }
    }

    /// Create a result carrying rows
    pub fn with_rows(
        column_names: Vec<String>,
        column_attributes: Vec<ColumnAttribute>,
        rows: Vec<Row>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            result_set: Some(ResultSet {
                column_names,
                column_attributes,
                rows,
            }),
            message: message.into(),
        }
    }

    /// Status message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Result set, if the statement returns rows
    pub fn result_set(&self) -> Option<&ResultSet> {
        self.result_set.as_ref()
    }

    /// Column names of the result set (empty without one)
    pub fn column_names(&self) -> &[String] {
        self.result_set
            .as_ref()
            .map(|set| set.column_names.as_slice())
            .unwrap_or(&[])
    }

    /// Column attributes of the result set (empty without one)
    pub fn column_attributes(&self) -> &[ColumnAttribute] {
        self.result_set
            .as_ref()
            .map(|set| set.column_attributes.as_slice())
            .unwrap_or(&[])
    }

    /// Rows of the result set (empty without one)
    pub fn rows(&self) -> &[Row] {
        self.result_set
            .as_ref()
            .map(|set| set.rows.as_slice())
            .unwrap_or(&[])
    }
}

/// Renders the column header, a `+----------+` rule, one line per row and
/// then the message.
impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(set) = &self.result_set {
            for name in &set.column_names {
                write!(f, "{} ", name)?;
            }
            writeln!(f)?;
            write!(f, "+")?;
            for _ in &set.column_names {
                write!(f, "----------+")?;
            }
            writeln!(f)?;
            for row in &set.rows {
                for name in &set.column_names {
                    match row.get(name) {
                        Some(value) => write!(f, "{} ", value)?,
                        None => write!(f, "??? ")?,
                    }
                }
                writeln!(f)?;
            }
        }
        write!(f, "{}", self.message)
    }
}
