//! Data types for heapsql
//!
//! `DataType` is what a column definition says; `ColumnType` is what the
//! storage layer can actually hold. Only INT, TEXT and BOOLEAN map across.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::storage::Value;

/// SQL data types as written in a column definition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Boolean type
    Boolean,
    /// Small integer (16-bit)
    SmallInt,
    /// Integer (32-bit)
    Integer,
    /// Big integer (64-bit)
    BigInt,
    /// Single-precision floating point
    Float,
    /// Double-precision floating point
    Double,
    /// Fixed-length character string
    Char(usize),
    /// Variable-length character string with max length
    Varchar(usize),
    /// Unlimited text
    Text,
    /// Date
    Date,
    /// Timestamp
    Timestamp,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Boolean => write!(f, "BOOLEAN"),
            DataType::SmallInt => write!(f, "SMALLINT"),
            DataType::Integer => write!(f, "INT"),
            DataType::BigInt => write!(f, "BIGINT"),
            DataType::Float => write!(f, "FLOAT"),
            DataType::Double => write!(f, "DOUBLE"),
            DataType::Char(n) => write!(f, "CHAR({})", n),
            DataType::Varchar(n) => write!(f, "VARCHAR({})", n),
            DataType::Text => write!(f, "TEXT"),
            DataType::Date => write!(f, "DATE"),
            DataType::Timestamp => write!(f, "TIMESTAMP"),
        }
    }
}

/// Column kinds the storage layer supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Int,
    Text,
    Boolean,
}

impl ColumnType {
    /// Map a declared SQL type onto a storage kind
    pub fn from_sql(data_type: &DataType) -> Option<Self> {
        match data_type {
            DataType::Integer => Some(ColumnType::Int),
            DataType::Text => Some(ColumnType::Text),
            DataType::Boolean => Some(ColumnType::Boolean),
            _ => None,
        }
    }

    /// Name stored in the `data_type` column of `_columns`
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Int => "INT",
            ColumnType::Text => "TEXT",
            ColumnType::Boolean => "BOOLEAN",
        }
    }

    /// Parse a `data_type` catalog value
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "INT" => Ok(ColumnType::Int),
            "TEXT" => Ok(ColumnType::Text),
            "BOOLEAN" => Ok(ColumnType::Boolean),
            other => Err(Error::relation(format!("unknown column type {} in catalog", other))),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage attributes of one column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnAttribute {
    data_type: ColumnType,
    nullable: bool,
}

impl ColumnAttribute {
    /// A nullable column of the given kind
    pub fn new(data_type: ColumnType) -> Self {
        Self {
            data_type,
            nullable: true,
        }
    }

    /// Set nullable flag
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn data_type(&self) -> ColumnType {
        self.data_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Can `value` be stored in a column with these attributes?
    pub fn accepts(&self, value: &Value) -> bool {
        match value.column_type() {
            None => self.nullable,
            Some(kind) => kind == self.data_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_types() {
        assert_eq!(ColumnType::from_sql(&DataType::Integer), Some(ColumnType::Int));
        assert_eq!(ColumnType::from_sql(&DataType::Text), Some(ColumnType::Text));
        assert_eq!(ColumnType::from_sql(&DataType::Boolean), Some(ColumnType::Boolean));
        assert_eq!(ColumnType::from_sql(&DataType::Double), None);
        assert_eq!(ColumnType::from_sql(&DataType::Varchar(20)), None);
    }

    #[test]
    fn test_catalog_names_round_trip() {
        for kind in [ColumnType::Int, ColumnType::Text, ColumnType::Boolean] {
            assert_eq!(ColumnType::parse(kind.as_str()).unwrap(), kind);
        }
        assert!(ColumnType::parse("DOUBLE").is_err());
    }

    #[test]
    fn test_accepts() {
        let attr = ColumnAttribute::new(ColumnType::Int);
        assert!(attr.accepts(&Value::Integer(4)));
        assert!(attr.accepts(&Value::Null));
        assert!(!attr.accepts(&Value::Text("4".into())));
        assert!(!attr.nullable(false).accepts(&Value::Null));
    }
}
