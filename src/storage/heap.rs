//! Heap relations for heapsql
//!
//! A `HeapTable` stores rows unordered in a `BlockFile`. Rows are marshalled
//! column by column in definition order:
//! - INT: presence byte, then i32 little-endian
//! - TEXT: presence byte, then u16 length and UTF-8 bytes
//! - BOOLEAN: presence byte, then one byte
//!
//! A presence byte of 0 stands for NULL and is followed by nothing.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read};
use std::path::Path;

use tracing::trace;

use super::disk::BlockFile;
use super::page::BLOCK_SIZE;
use super::relation::{DbRelation, Handle};
use super::value::{row_matches, Row, Value};
use crate::catalog::{ColumnAttribute, ColumnType};
use crate::error::{Error, Result};

/// A relation stored in a heap file
#[derive(Debug)]
pub struct HeapTable {
    /// Relation name
    name: String,
    /// Column names in definition order
    column_names: Vec<String>,
    /// Column attributes, co-indexed with `column_names`
    column_attributes: Vec<ColumnAttribute>,
    /// Backing file
    file: BlockFile,
}

impl HeapTable {
    /// Describe a heap relation stored at `path`. Nothing is touched on disk.
    pub fn new(
        name: impl Into<String>,
        column_names: Vec<String>,
        column_attributes: Vec<ColumnAttribute>,
        path: impl AsRef<Path>,
    ) -> Self {
        let name = name.into();
        let file = BlockFile::new(name.clone(), path);
        Self {
            name,
            column_names,
            column_attributes,
            file,
        }
    }

    /// Check a row against the schema and fill in omitted nullable columns
    fn validate(&self, row: &Row) -> Result<Row> {
        if let Some(extra) = row.keys().find(|k| !self.column_names.contains(k)) {
            return Err(Error::UnknownColumn(extra.clone(), self.name.clone()));
        }

        let mut full_row = Row::with_capacity(self.column_names.len());
        for (column, attribute) in self.column_names.iter().zip(&self.column_attributes) {
            let value = match row.get(column) {
                Some(value) => value.clone(),
                None if attribute.is_nullable() => Value::Null,
                None => {
                    return Err(Error::relation(format!(
                        "no value given for column {} of {}",
                        column, self.name
                    )))
                }
            };
            if !attribute.accepts(&value) {
                return Err(Error::relation(format!(
                    "column {} of {} is {}, cannot store {}",
                    column,
                    self.name,
                    attribute.data_type(),
                    value.type_name()
                )));
            }
            full_row.insert(column.clone(), value);
        }
        Ok(full_row)
    }

    /// Put marshalled bytes into the last block, growing the file if needed
    fn append(&mut self, row: &Row) -> Result<Handle> {
        let bytes = self.marshal(row)?;
        let mut page = match self.file.last_block_id() {
            // an adopted empty file has no blocks yet
            0 => self.file.get_new()?,
            last => self.file.get(last)?,
        };
        if !page.has_room(bytes.len()) {
            page = self.file.get_new()?;
        }
        let record_id = page.add(&bytes)?;
        self.file.put(&page)?;
        Ok(Handle::new(page.block_id(), record_id))
    }

    fn marshal(&self, row: &Row) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        for (column, attribute) in self.column_names.iter().zip(&self.column_attributes) {
            match (attribute.data_type(), row.get(column)) {
                (_, None) | (_, Some(Value::Null)) => bytes.write_u8(0)?,
                (ColumnType::Int, Some(Value::Integer(n))) => {
                    bytes.write_u8(1)?;
                    bytes.write_i32::<LittleEndian>(*n)?;
                }
                (ColumnType::Text, Some(Value::Text(s))) => {
                    let len = u16::try_from(s.len()).map_err(|_| {
                        Error::relation(format!("text value for {} is too long", column))
                    })?;
                    bytes.write_u8(1)?;
                    bytes.write_u16::<LittleEndian>(len)?;
                    bytes.extend_from_slice(s.as_bytes());
                }
                (ColumnType::Boolean, Some(Value::Boolean(b))) => {
                    bytes.write_u8(1)?;
                    bytes.write_u8(u8::from(*b))?;
                }
                (kind, Some(value)) => {
                    return Err(Error::relation(format!(
                        "cannot marshal {} into {} column {}",
                        value.type_name(),
                        kind,
                        column
                    )))
                }
            }
        }
        // one row must fit in an otherwise empty block
        if bytes.len() > BLOCK_SIZE - 8 {
            return Err(Error::relation(format!(
                "row of {} bytes does not fit in a block",
                bytes.len()
            )));
        }
        Ok(bytes)
    }

    fn unmarshal(&self, bytes: &[u8]) -> Result<Row> {
        let mut cursor = Cursor::new(bytes);
        let mut row = Row::with_capacity(self.column_names.len());
        for (column, attribute) in self.column_names.iter().zip(&self.column_attributes) {
            if cursor.read_u8()? == 0 {
                row.insert(column.clone(), Value::Null);
                continue;
            }
            let value = match attribute.data_type() {
                ColumnType::Int => Value::Integer(cursor.read_i32::<LittleEndian>()?),
                ColumnType::Text => {
                    let len = cursor.read_u16::<LittleEndian>()? as usize;
                    let mut buf = vec![0u8; len];
                    cursor.read_exact(&mut buf)?;
                    let text = String::from_utf8(buf).map_err(|e| {
                        Error::relation(format!("corrupt text in {}: {}", self.name, e))
                    })?;
                    Value::Text(text)
                }
                ColumnType::Boolean => Value::Boolean(cursor.read_u8()? != 0),
            };
            row.insert(column.clone(), value);
        }
        Ok(row)
    }

    fn read_row(&mut self, handle: Handle) -> Result<Row> {
        let page = self.file.get(handle.block_id)?;
        let bytes = page.get(handle.record_id).ok_or_else(|| {
            Error::relation(format!("no row at {} in {}", handle, self.name))
        })?;
        self.unmarshal(bytes)
    }
}

impl DbRelation for HeapTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn create(&mut self) -> Result<()> {
        self.file.create()
    }

    fn create_if_not_exists(&mut self) -> Result<()> {
        if self.file.exists() {
            self.file.open()
        } else {
            self.file.create()
        }
    }

    fn open(&mut self) -> Result<()> {
        self.file.open()
    }

    fn close(&mut self) {
        self.file.close();
    }

    fn drop(&mut self) -> Result<()> {
        self.file.drop()
    }

    fn insert(&mut self, row: &Row) -> Result<Handle> {
        self.open()?;
        let full_row = self.validate(row)?;
        let handle = self.append(&full_row)?;
        trace!(relation = %self.name, %handle, "inserted row");
        Ok(handle)
    }

    fn delete(&mut self, handle: Handle) -> Result<()> {
        self.open()?;
        let mut page = self.file.get(handle.block_id)?;
        if !page.del(handle.record_id) {
            return Err(Error::relation(format!(
                "no row at {} in {}",
                handle, self.name
            )));
        }
        self.file.put(&page)?;
        trace!(relation = %self.name, %handle, "deleted row");
        Ok(())
    }

    fn select(&mut self, predicate: Option<&Row>) -> Result<Vec<Handle>> {
        self.open()?;
        let mut handles = Vec::new();
        for block_id in self.file.block_ids() {
            let page = self.file.get(block_id)?;
            for record_id in page.ids() {
                let handle = Handle::new(block_id, record_id);
                let keep = match predicate {
                    None => true,
                    Some(predicate) => {
                        let bytes = page.get(record_id).unwrap_or_default();
                        let row = self.unmarshal(bytes)?;
                        row_matches(&row, predicate, &self.name)?
                    }
                };
                if keep {
                    handles.push(handle);
                }
            }
        }
        Ok(handles)
    }

    fn project(&mut self, handle: Handle, columns: Option<&[String]>) -> Result<Row> {
        self.open()?;
        let row = self.read_row(handle)?;
        match columns {
            None => Ok(row),
            Some(columns) if columns.is_empty() => Ok(row),
            Some(columns) => columns
                .iter()
                .map(|column| {
                    row.get(column)
                        .map(|value| (column.clone(), value.clone()))
                        .ok_or_else(|| Error::UnknownColumn(column.clone(), self.name.clone()))
                })
                .collect(),
        }
    }

    fn column_names(&self) -> &[String] {
        &self.column_names
    }

    fn column_attributes(&self) -> &[ColumnAttribute] {
        &self.column_attributes
    }
}
