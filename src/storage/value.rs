//! Value and Row types for heapsql
//!
//! This module defines how scalar values and rows are represented in memory.
//! Catalog rows and data rows share the same representation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::catalog::ColumnType;
use crate::error::{Error, Result};

/// A row: column name to value. Equality ignores column order.
pub type Row = IndexMap<String, Value>;

/// A scalar value stored in a relation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    /// NULL value
    Null,
    /// Integer value (32-bit)
    Integer(i32),
    /// Text value
    Text(String),
    /// Boolean value
    Boolean(bool),
}

impl Value {
    /// Check if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get the integer
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get the text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Integer(_) => "INT",
            Value::Text(_) => "TEXT",
            Value::Boolean(_) => "BOOLEAN",
        }
    }

    /// Storage kind of this value, `None` for NULL
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            Value::Null => None,
            Value::Integer(_) => Some(ColumnType::Int),
            Value::Text(_) => Some(ColumnType::Text),
            Value::Boolean(_) => Some(ColumnType::Boolean),
        }
    }

    /// Equality test used by filters.
    ///
    /// NULL never matches anything. Values of different kinds cannot be
    /// compared and produce `Error::TypeMismatch`.
    pub fn matches(&self, other: &Value) -> Result<bool> {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => Ok(false),
            (Value::Integer(a), Value::Integer(b)) => Ok(a == b),
            (Value::Text(a), Value::Text(b)) => Ok(a == b),
            (Value::Boolean(a), Value::Boolean(b)) => Ok(a == b),
            (a, b) => Err(Error::TypeMismatch(a.type_name(), b.type_name())),
        }
    }

    /// Total order across all kinds (NULL < BOOLEAN < INT < TEXT), used for
    /// index keys.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Boolean(_) => 1,
            Value::Integer(_) => 2,
            Value::Text(_) => 3,
        }
    }
}

/// Result-set rendering: integers in decimal, text double-quoted, booleans as
/// `true`/`false`, anything else as `???`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "\"{}\"", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Null => write!(f, "???"),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

/// Check a row against an equality predicate.
///
/// Every predicate column must be present in the row; a missing column is an
/// `Error::UnknownColumn` against `relation`.
pub fn row_matches(row: &Row, predicate: &Row, relation: &str) -> Result<bool> {
    for (column, wanted) in predicate {
        let value = row
            .get(column)
            .ok_or_else(|| Error::UnknownColumn(column.clone(), relation.to_string()))?;
        if !value.matches(wanted)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Build a row from `(column, value)` pairs
pub fn row<K, V, I>(pairs: I) -> Row
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
