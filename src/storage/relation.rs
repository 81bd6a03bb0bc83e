//! Storage interfaces consumed by the executor
//!
//! A relation stores rows and hands out opaque handles; an index maps the
//! values of some columns to handles of one relation.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::page::{BlockId, RecordId};
use super::value::Row;
use crate::catalog::ColumnAttribute;
use crate::error::{Error, Result};

/// A row handle (block_id, record_id), meaningful only within its relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Handle {
    pub block_id: BlockId,
    pub record_id: RecordId,
}

impl Handle {
    pub fn new(block_id: BlockId, record_id: RecordId) -> Self {
        Self {
            block_id,
            record_id,
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.block_id, self.record_id)
    }
}

/// A physical relation
pub trait DbRelation {
    /// Relation name
    fn name(&self) -> &str;

    /// Create the physical relation; fails if it already exists
    fn create(&mut self) -> Result<()>;

    /// Open the relation, creating it if it does not exist yet
    fn create_if_not_exists(&mut self) -> Result<()>;

    /// Open an existing relation
    fn open(&mut self) -> Result<()>;

    /// Close the relation
    fn close(&mut self);

    /// Destroy the physical relation
    fn drop(&mut self) -> Result<()>;

    /// Insert a row and return its handle
    fn insert(&mut self, row: &Row) -> Result<Handle>;

    /// Delete the row behind `handle`
    fn delete(&mut self, handle: Handle) -> Result<()>;

    /// Handles of every row equal to `predicate` on its columns (all rows when
    /// `predicate` is `None`), in storage order
    fn select(&mut self, predicate: Option<&Row>) -> Result<Vec<Handle>>;

    /// Read the row behind `handle`, restricted to `columns` when given
    fn project(&mut self, handle: Handle, columns: Option<&[String]>) -> Result<Row>;

    /// Column names in definition order
    fn column_names(&self) -> &[String];

    /// Column attributes, co-indexed with `column_names`
    fn column_attributes(&self) -> &[ColumnAttribute];

    /// Attributes for exactly `columns`, in the given order
    fn get_column_attributes(&self, columns: &[String]) -> Result<Vec<ColumnAttribute>> {
        columns
            .iter()
            .map(|column| {
                self.column_names()
                    .iter()
                    .position(|c| c == column)
                    .map(|i| self.column_attributes()[i])
                    .ok_or_else(|| Error::UnknownColumn(column.clone(), self.name().to_string()))
            })
            .collect()
    }
}

/// A physical index over one relation
pub trait DbIndex {
    /// Index name
    fn name(&self) -> &str;

    /// Indexed columns in key order
    fn columns(&self) -> &[String];

    /// Does the index reject duplicate keys?
    fn is_unique(&self) -> bool;

    /// Build the physical index from the relation's current rows
    fn create(&mut self, entries: &[(Handle, Row)]) -> Result<()>;

    /// Destroy the physical index; an absent index is not an error
    fn drop(&mut self) -> Result<()>;

    /// Add the entry for a newly inserted row
    fn insert(&mut self, handle: Handle, row: &Row) -> Result<()>;

    /// Remove the entry for a row about to be deleted
    fn delete(&mut self, handle: Handle, row: &Row) -> Result<()>;

    /// Handles whose key equals the index columns of `key`
    fn lookup(&mut self, key: &Row) -> Result<Vec<Handle>>;
}
