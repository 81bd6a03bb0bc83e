//! Ordered index for heapsql
//!
//! A `BTreeIndex` maps the values of its key columns to row handles. The map
//! lives in memory and is written to `<table>-<index>.idx` as JSON after every
//! change. Keys holding a NULL are stored but never match a lookup, and never
//! collide in a unique index.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::relation::{DbIndex, Handle};
use super::value::{Row, Value};
use crate::error::{Error, Result};

/// A composite key: one value per index column, in key order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexKey(pub Vec<Value>);

impl IndexKey {
    /// Pull the key for `columns` out of a row. Every key column must be
    /// present.
    pub fn from_row(row: &Row, columns: &[String], index: &str) -> Result<Self> {
        columns
            .iter()
            .map(|column| {
                row.get(column)
                    .cloned()
                    .ok_or_else(|| Error::UnknownColumn(column.clone(), index.to_string()))
            })
            .collect::<Result<Vec<_>>>()
            .map(IndexKey)
    }

    /// Does any component hold NULL?
    pub fn has_null(&self) -> bool {
        self.0.iter().any(Value::is_null)
    }
}

impl Ord for IndexKey {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.0.iter().zip(&other.0) {
            match a.total_cmp(b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        self.0.len().cmp(&other.0.len())
    }
}

impl PartialOrd for IndexKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for IndexKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, ")")
    }
}

/// On-disk form: the map flattened into entries, since JSON object keys must
/// be strings
#[derive(Debug, Serialize, Deserialize)]
struct IndexFile {
    unique: bool,
    columns: Vec<String>,
    entries: Vec<(IndexKey, Vec<Handle>)>,
}

/// Index over one relation, ordered by key
#[derive(Debug)]
pub struct BTreeIndex {
    table_name: String,
    name: String,
    columns: Vec<String>,
    unique: bool,
    path: PathBuf,
    map: BTreeMap<IndexKey, Vec<Handle>>,
    loaded: bool,
}

impl BTreeIndex {
    /// Describe an index stored at `path`. Nothing is touched on disk.
    pub fn new(
        table_name: impl Into<String>,
        name: impl Into<String>,
        columns: Vec<String>,
        unique: bool,
        path: impl AsRef<Path>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            name: name.into(),
            columns,
            unique,
            path: path.as_ref().to_path_buf(),
            map: BTreeMap::new(),
            loaded: false,
        }
    }

    /// Relation this index belongs to
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn open(&mut self) -> Result<()> {
        if self.loaded {
            return Ok(());
        }
        let file = File::open(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::relation(format!(
                "index {} on {} does not exist",
                self.name, self.table_name
            )),
            _ => Error::Io(e),
        })?;
        let stored: IndexFile = serde_json::from_reader(BufReader::new(file))?;
        self.map = stored.entries.into_iter().collect();
        self.loaded = true;
        trace!(index = %self.name, keys = self.map.len(), "loaded index");
        Ok(())
    }

    fn save(&self) -> Result<()> {
        let stored = IndexFile {
            unique: self.unique,
            columns: self.columns.clone(),
            entries: self
                .map
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        };
        let file = File::create(&self.path)?;
        serde_json::to_writer(BufWriter::new(file), &stored)?;
        Ok(())
    }

    fn add_entry(&mut self, key: IndexKey, handle: Handle) -> Result<()> {
        let handles = self.map.entry(key.clone()).or_default();
        if self.unique && !key.has_null() && !handles.is_empty() {
            return Err(Error::DuplicateKey {
                index: self.name.clone(),
                key: key.to_string(),
            });
        }
        handles.push(handle);
        Ok(())
    }
}

impl DbIndex for BTreeIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn is_unique(&self) -> bool {
        self.unique
    }

    fn create(&mut self, entries: &[(Handle, Row)]) -> Result<()> {
        if self.path.exists() {
            return Err(Error::relation(format!(
                "index {} on {} already exists",
                self.name, self.table_name
            )));
        }
        self.map.clear();
        for (handle, row) in entries {
            let key = IndexKey::from_row(row, &self.columns, &self.name)?;
            self.add_entry(key, *handle)?;
        }
        self.save()?;
        self.loaded = true;
        debug!(index = %self.name, table = %self.table_name, rows = entries.len(), "built index");
        Ok(())
    }

    fn drop(&mut self) -> Result<()> {
        self.map.clear();
        self.loaded = false;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(index = %self.name, "index file already absent");
                Ok(())
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    fn insert(&mut self, handle: Handle, row: &Row) -> Result<()> {
        self.open()?;
        let key = IndexKey::from_row(row, &self.columns, &self.name)?;
        self.add_entry(key, handle)?;
        self.save()
    }

    fn delete(&mut self, handle: Handle, row: &Row) -> Result<()> {
        self.open()?;
        let key = IndexKey::from_row(row, &self.columns, &self.name)?;
        if let Some(handles) = self.map.get_mut(&key) {
            handles.retain(|h| *h != handle);
            if handles.is_empty() {
                self.map.remove(&key);
            }
        }
        self.save()
    }

    fn lookup(&mut self, key: &Row) -> Result<Vec<Handle>> {
        self.open()?;
        let key = IndexKey::from_row(key, &self.columns, &self.name)?;
        if key.has_null() {
            return Ok(Vec::new());
        }
        Ok(self.map.get(&key).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::value::row;
    use tempfile::TempDir;

    fn index(dir: &TempDir, unique: bool) -> BTreeIndex {
        BTreeIndex::new(
            "foo",
            "fx",
            vec!["x".to_string(), "y".to_string()],
            unique,
            dir.path().join("foo-fx.idx"),
        )
    }

    fn entries() -> Vec<(Handle, Row)> {
        vec![
            (Handle::new(1, 1), row([("x", 1), ("y", 10)])),
            (Handle::new(1, 2), row([("x", 2), ("y", 20)])),
            (Handle::new(1, 3), row([("x", 1), ("y", 11)])),
        ]
    }

    #[test]
    fn test_create_and_lookup() {
        let dir = TempDir::new().unwrap();
        let mut idx = index(&dir, true);
        idx.create(&entries()).unwrap();
        assert_eq!(idx.len(), 3);
        assert_eq!(
            idx.lookup(&row([("x", 2), ("y", 20)])).unwrap(),
            vec![Handle::new(1, 2)]
        );
        assert!(idx.lookup(&row([("x", 2), ("y", 21)])).unwrap().is_empty());
    }

    #[test]
    fn test_unique_rejects_duplicates() {
        let dir = TempDir::new().unwrap();
        let mut idx = index(&dir, true);
        idx.create(&entries()).unwrap();
        let err = idx
            .insert(Handle::new(2, 1), &row([("x", 1), ("y", 10)]))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateKey { .. }));
    }

    #[test]
    fn test_non_unique_keeps_every_handle() {
        let dir = TempDir::new().unwrap();
        let mut idx = index(&dir, false);
        idx.create(&entries()).unwrap();
        idx.insert(Handle::new(2, 1), &row([("x", 1), ("y", 10)]))
            .unwrap();
        let found = idx.lookup(&row([("x", 1), ("y", 10)])).unwrap();
        assert_eq!(found, vec![Handle::new(1, 1), Handle::new(2, 1)]);

        idx.delete(Handle::new(1, 1), &row([("x", 1), ("y", 10)]))
            .unwrap();
        let found = idx.lookup(&row([("x", 1), ("y", 10)])).unwrap();
        assert_eq!(found, vec![Handle::new(2, 1)]);
    }

    #[test]
    fn test_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let mut idx = index(&dir, true);
        idx.create(&entries()).unwrap();
        idx.insert(Handle::new(3, 3), &row([("x", 9), ("y", 9)]))
            .unwrap();

        let mut again = index(&dir, true);
        assert_eq!(
            again.lookup(&row([("x", 9), ("y", 9)])).unwrap(),
            vec![Handle::new(3, 3)]
        );
        assert!(again.create(&[]).is_err());
    }

    #[test]
    fn test_drop_tolerates_missing_file() {
        let dir = TempDir::new().unwrap();
        let mut idx = index(&dir, false);
        idx.drop().unwrap();
        idx.create(&entries()).unwrap();
        idx.drop().unwrap();
        assert!(!dir.path().join("foo-fx.idx").exists());
        assert!(idx.lookup(&row([("x", 1), ("y", 10)])).is_err());
    }

    #[test]
    fn test_null_keys_never_match() {
        let dir = TempDir::new().unwrap();
        let mut idx = index(&dir, true);
        idx.create(&[]).unwrap();
        let null_row = row([("x", Value::Null), ("y", Value::Integer(1))]);
        idx.insert(Handle::new(1, 1), &null_row).unwrap();
        idx.insert(Handle::new(1, 2), &null_row).unwrap();
        assert!(idx.lookup(&null_row).unwrap().is_empty());
    }
}
