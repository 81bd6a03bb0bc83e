//! System Catalog for heapsql
//!
//! The catalog owns the three catalog relations and caches the user relations
//! and indices they describe. It is opened once per executor, bootstrapping
//! the catalog relations on first use of a data directory.

use std::collections::HashMap;
use std::fs;

use tracing::{debug, info};

use super::schema::{self, COLUMNS, INDICES, SCHEMA_TABLES, TABLES};
use super::types::{ColumnAttribute, ColumnType};
use crate::config::DbConfig;
use crate::error::{Error, Result};
use crate::storage::{row, BTreeIndex, DbIndex, DbRelation, Handle, HeapTable, Row, Value};

/// What the optimizer needs to know about one index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexInfo {
    /// Index name
    pub name: String,
    /// Key columns in `seq_in_index` order
    pub columns: Vec<String>,
}

/// System Catalog - the catalog relations plus open user relations and indices
pub struct Catalog {
    config: DbConfig,
    tables: HeapTable,
    columns: HeapTable,
    indices: HeapTable,
    /// User relations by name
    relations: HashMap<String, Box<dyn DbRelation>>,
    /// Indices by (table, index)
    indexes: HashMap<(String, String), Box<dyn DbIndex>>,
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("data_dir", &self.config.data_dir)
            .field("open_relations", &self.relations.len())
            .field("open_indices", &self.indexes.len())
            .finish()
    }
}

impl Catalog {
    /// Open the catalog in `config.data_dir`, creating it if needed
    pub fn open(config: &DbConfig) -> Result<Self> {
        fs::create_dir_all(config.dir())?;

        let schema_relation = |name: &str| {
            let (names, attrs) = schema::schema_definition(name);
            HeapTable::new(name, names, attrs, config.relation_path(name))
        };
        let mut catalog = Self {
            config: config.clone(),
            tables: schema_relation(TABLES),
            columns: schema_relation(COLUMNS),
            indices: schema_relation(INDICES),
            relations: HashMap::new(),
            indexes: HashMap::new(),
        };
        catalog.tables.create_if_not_exists()?;
        catalog.columns.create_if_not_exists()?;
        catalog.indices.create_if_not_exists()?;

        if catalog.tables.select(None)?.is_empty() {
            catalog.bootstrap()?;
        }
        debug!(data_dir = %config.dir().display(), "opened catalog");
        Ok(catalog)
    }

    /// Describe the catalog relations in themselves
    fn bootstrap(&mut self) -> Result<()> {
        for name in SCHEMA_TABLES {
            self.tables.insert(&schema::table_row(name))?;
            for (column, kind) in schema::schema_columns(name) {
                self.columns
                    .insert(&schema::column_row(name, column, *kind))?;
            }
        }
        info!("bootstrapped catalog relations");
        Ok(())
    }

    /// Configuration this catalog was opened with
    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// The `_tables` relation
    pub fn tables(&mut self) -> &mut dyn DbRelation {
        &mut self.tables
    }

    /// The `_columns` relation
    pub fn columns(&mut self) -> &mut dyn DbRelation {
        &mut self.columns
    }

    /// The `_indices` relation
    pub fn indices(&mut self) -> &mut dyn DbRelation {
        &mut self.indices
    }

    /// Handles of the `_tables` rows naming `table_name`
    pub fn table_handles(&mut self, table_name: &str) -> Result<Vec<Handle>> {
        self.tables.select(Some(&schema::table_row(table_name)))
    }

    /// Does `_tables` name this table?
    pub fn table_exists(&mut self, table_name: &str) -> Result<bool> {
        Ok(!self.table_handles(table_name)?.is_empty())
    }

    /// Handles of the `_columns` rows of `table_name`
    pub fn column_handles(&mut self, table_name: &str) -> Result<Vec<Handle>> {
        self.columns
            .select(Some(&row([("table_name", table_name)])))
    }

    /// Column names and attributes of a table, in definition order
    pub fn get_columns(&mut self, table_name: &str) -> Result<(Vec<String>, Vec<ColumnAttribute>)> {
        let mut names = Vec::new();
        let mut attrs = Vec::new();
        for handle in self.column_handles(table_name)? {
            let column = self.columns.project(handle, None)?;
            names.push(text(&column, "column_name")?.to_string());
            let kind = ColumnType::parse(text(&column, "data_type")?)?;
            attrs.push(ColumnAttribute::new(kind));
        }
        Ok((names, attrs))
    }

    /// The relation called `table_name`, opened from its catalog description
    /// on first use
    pub fn get_table(&mut self, table_name: &str) -> Result<&mut dyn DbRelation> {
        match table_name {
            TABLES => return Ok(&mut self.tables),
            COLUMNS => return Ok(&mut self.columns),
            INDICES => return Ok(&mut self.indices),
            _ => {}
        }
        if !self.relations.contains_key(table_name) {
            let (names, attrs) = self.get_columns(table_name)?;
            if names.is_empty() {
                return Err(Error::relation(format!(
                    "relation {} does not exist",
                    table_name
                )));
            }
            let path = self.config.relation_path(table_name);
            let table = HeapTable::new(table_name, names, attrs, path);
            self.relations
                .insert(table_name.to_string(), Box::new(table));
        }
        self.relations
            .get_mut(table_name)
            .map(|table| table.as_mut() as &mut dyn DbRelation)
            .ok_or_else(|| Error::relation(format!("relation {} does not exist", table_name)))
    }

    /// Remove a user relation from the cache and hand it over, opening it
    /// from its catalog description first if needed
    pub fn take_table(&mut self, table_name: &str) -> Result<Box<dyn DbRelation>> {
        if schema::is_schema_table(table_name) {
            return Err(Error::relation(format!(
                "cannot detach catalog relation {}",
                table_name
            )));
        }
        self.get_table(table_name)?;
        self.relations
            .remove(table_name)
            .ok_or_else(|| Error::relation(format!("relation {} does not exist", table_name)))
    }

    /// Drop the cached relation object for `table_name`
    pub fn forget_table(&mut self, table_name: &str) {
        if let Some(mut table) = self.relations.remove(table_name) {
            table.close();
        }
    }

    /// Handles of every `_indices` row of one index
    pub fn index_handles(&mut self, table_name: &str, index_name: &str) -> Result<Vec<Handle>> {
        self.indices
            .select(Some(&schema::index_key(table_name, index_name)))
    }

    /// Handles of every `_indices` row of every index on `table_name`
    pub fn table_index_handles(&mut self, table_name: &str) -> Result<Vec<Handle>> {
        self.indices
            .select(Some(&row([("table_name", table_name)])))
    }

    /// Names of the indices on `table_name`, sorted
    pub fn index_names(&mut self, table_name: &str) -> Result<Vec<String>> {
        let columns = ["index_name".to_string()];
        let mut names = Vec::new();
        for handle in self.table_index_handles(table_name)? {
            let index_row = self.indices.project(handle, Some(&columns[..]))?;
            let name = text(&index_row, "index_name")?.to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Key columns and uniqueness of one index, from its `_indices` rows
    fn index_definition(&mut self, table_name: &str, index_name: &str) -> Result<(Vec<String>, bool)> {
        let mut parts = Vec::new();
        let mut unique = false;
        for handle in self.index_handles(table_name, index_name)? {
            let index_row = self.indices.project(handle, None)?;
            let seq = index_row
                .get("seq_in_index")
                .and_then(Value::as_i32)
                .ok_or_else(|| Error::relation("malformed seq_in_index in _indices"))?;
            unique = index_row
                .get("is_unique")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            parts.push((seq, text(&index_row, "column_name")?.to_string()));
        }
        parts.sort();
        Ok((parts.into_iter().map(|(_, column)| column).collect(), unique))
    }

    /// Key columns of every index on `table_name`, in index-name order
    pub fn index_infos(&mut self, table_name: &str) -> Result<Vec<IndexInfo>> {
        let mut infos = Vec::new();
        for name in self.index_names(table_name)? {
            let (columns, _) = self.index_definition(table_name, &name)?;
            infos.push(IndexInfo { name, columns });
        }
        Ok(infos)
    }

    /// The physical index `index_name` on `table_name`, built from its
    /// catalog description on first use
    pub fn get_index(&mut self, table_name: &str, index_name: &str) -> Result<&mut dyn DbIndex> {
        let key = (table_name.to_string(), index_name.to_string());
        if !self.indexes.contains_key(&key) {
            let (columns, unique) = self.index_definition(table_name, index_name)?;
            if columns.is_empty() {
                return Err(Error::relation(format!(
                    "index {} on {} does not exist",
                    index_name, table_name
                )));
            }
            let path = self.config.index_path(table_name, index_name);
            let index = BTreeIndex::new(table_name, index_name, columns, unique, path);
            self.indexes.insert(key.clone(), Box::new(index));
        }
        self.indexes
            .get_mut(&key)
            .map(|index| index.as_mut() as &mut dyn DbIndex)
            .ok_or_else(|| {
                Error::relation(format!("index {} on {} does not exist", index_name, table_name))
            })
    }

    /// Drop the cached index object
    pub fn forget_index(&mut self, table_name: &str, index_name: &str) {
        self.indexes
            .remove(&(table_name.to_string(), index_name.to_string()));
    }
}

/// Text value of a catalog row column
fn text<'a>(catalog_row: &'a Row, column: &str) -> Result<&'a str> {
    catalog_row
        .get(column)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::relation(format!("malformed {} in catalog row", column)))
}
