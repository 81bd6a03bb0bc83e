//! Catalog module
//!
//! This module contains the system catalog, the catalog relation schemas, and
//! data types.

pub mod catalog;
pub mod schema;
pub mod types;

pub use catalog::{Catalog, IndexInfo};
pub use schema::is_schema_table;
pub use types::{ColumnAttribute, ColumnType, DataType};
