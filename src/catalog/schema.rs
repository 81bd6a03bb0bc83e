//! Catalog relation schemas
//!
//! The catalog is three heap relations that describe every relation,
//! including themselves. This module names them, fixes their columns and
//! builds their rows.

use super::types::{ColumnAttribute, ColumnType};
use crate::sql::ast::IndexType;
use crate::storage::{row, Row, Value};

/// Relation listing every table
pub const TABLES: &str = "_tables";

/// Relation listing every column of every table
pub const COLUMNS: &str = "_columns";

/// Relation listing every column of every index
pub const INDICES: &str = "_indices";

/// Names of the catalog relations, in bootstrap order
pub const SCHEMA_TABLES: [&str; 3] = [TABLES, COLUMNS, INDICES];

/// Is `name` one of the catalog relations?
pub fn is_schema_table(name: &str) -> bool {
    SCHEMA_TABLES.contains(&name)
}

/// Column definitions of a catalog relation: (name, kind)
pub fn schema_columns(name: &str) -> &'static [(&'static str, ColumnType)] {
    match name {
        TABLES => &[("table_name", ColumnType::Text)],
        COLUMNS => &[
            ("table_name", ColumnType::Text),
            ("column_name", ColumnType::Text),
            ("data_type", ColumnType::Text),
        ],
        INDICES => &[
            ("table_name", ColumnType::Text),
            ("index_name", ColumnType::Text),
            ("seq_in_index", ColumnType::Int),
            ("column_name", ColumnType::Text),
            ("index_type", ColumnType::Text),
            ("is_unique", ColumnType::Boolean),
        ],
        _ => &[],
    }
}

/// Column names and attributes of a catalog relation
pub fn schema_definition(name: &str) -> (Vec<String>, Vec<ColumnAttribute>) {
    schema_columns(name)
        .iter()
        .map(|(column, kind)| (column.to_string(), ColumnAttribute::new(*kind)))
        .unzip()
}

/// A `_tables` row
pub fn table_row(table_name: &str) -> Row {
    row([("table_name", table_name)])
}

/// A `_columns` row
pub fn column_row(table_name: &str, column_name: &str, data_type: ColumnType) -> Row {
    row([
        ("table_name", table_name),
        ("column_name", column_name),
        ("data_type", data_type.as_str()),
    ])
}

/// An `_indices` row for the `seq`-th column (from 1) of an index
pub fn index_row(
    table_name: &str,
    index_name: &str,
    seq: i32,
    column_name: &str,
    index_type: IndexType,
) -> Row {
    row([
        ("table_name", Value::from(table_name)),
        ("index_name", Value::from(index_name)),
        ("seq_in_index", Value::Integer(seq)),
        ("column_name", Value::from(column_name)),
        ("index_type", Value::from(index_type.as_str())),
        ("is_unique", Value::Boolean(index_type.is_unique())),
    ])
}

/// Predicate selecting every `_indices` row of one index
pub fn index_key(table_name: &str, index_name: &str) -> Row {
    row([("table_name", table_name), ("index_name", index_name)])
}
