//! DDL handlers: CREATE/DROP TABLE and CREATE/DROP INDEX
//!
//! Each handler keeps the catalog relations and the physical objects they
//! describe in step. Creation compensates on failure; dropping does not.

use tracing::{info, warn};

use super::result::QueryResult;
use super::undo::{UndoAction, UndoLog};
use crate::catalog::{schema, Catalog, ColumnType};
use crate::error::{Error, Result};
use crate::sql::ast::{CreateIndexStatement, CreateTableStatement, DropIndexStatement, DropTableStatement};
use crate::storage::Handle;

/// CREATE TABLE
pub fn create_table(catalog: &mut Catalog, stmt: &CreateTableStatement) -> Result<QueryResult> {
    let table_name = stmt.table_name.as_str();

    let mut columns = Vec::with_capacity(stmt.columns.len());
    for column in &stmt.columns {
        let kind = ColumnType::from_sql(&column.data_type).ok_or_else(|| {
            Error::execution(format!(
                "unrecognized data type {} for column {}",
                column.data_type, column.name
            ))
        })?;
        if columns.iter().any(|(name, _)| *name == column.name) {
            return Err(Error::execution(format!("duplicate column {}", column.name)));
        }
        if column.not_null {
            warn!(
                table = table_name,
                column = %column.name,
                "NOT NULL is not recorded in the catalog; column stays nullable"
            );
        }
        columns.push((column.name.clone(), kind));
    }

    if catalog.table_exists(table_name)? {
        if stmt.if_not_exists {
            return Ok(QueryResult::with_message(format!(
                "table {} already exists",
                table_name
            )));
        }
        return Err(Error::execution(format!("table {} already exists", table_name)));
    }

    let mut undo = UndoLog::new();
    if let Err(e) = create_table_objects(catalog, stmt, &columns, &mut undo) {
        catalog.forget_table(table_name);
        undo.rollback(catalog);
        return Err(e);
    }

    info!(table = table_name, columns = columns.len(), "created table");
    Ok(QueryResult::with_message(format!("created {}", table_name)))
}

fn create_table_objects(
    catalog: &mut Catalog,
    stmt: &CreateTableStatement,
    columns: &[(String, ColumnType)],
    undo: &mut UndoLog,
) -> Result<()> {
    let table_name = stmt.table_name.as_str();

    let handle = catalog.tables().insert(&schema::table_row(table_name))?;
    undo.push(delete_row(schema::TABLES, handle));

    for (column, kind) in columns {
        let handle = catalog
            .columns()
            .insert(&schema::column_row(table_name, column, *kind))?;
        undo.push(delete_row(schema::COLUMNS, handle));
    }

    let table = catalog.get_table(table_name)?;
    if stmt.if_not_exists {
        table.create_if_not_exists()
    } else {
        table.create()
    }
}

fn delete_row(relation: &str, handle: Handle) -> UndoAction {
    UndoAction::DeleteRow {
        relation: relation.to_string(),
        handle,
    }
}

/// DROP TABLE
pub fn drop_table(catalog: &mut Catalog, stmt: &DropTableStatement) -> Result<QueryResult> {
    let table_name = stmt.table_name.as_str();
    if schema::is_schema_table(table_name) {
        return Err(Error::execution("cannot drop a schema table"));
    }
    let table_handles = catalog.table_handles(table_name)?;
    if table_handles.is_empty() {
        return Err(Error::execution(format!("table {} does not exist", table_name)));
    }

    for index_name in catalog.index_names(table_name)? {
        catalog.get_index(table_name, &index_name)?.drop()?;
        catalog.forget_index(table_name, &index_name);
        for handle in catalog.index_handles(table_name, &index_name)? {
            catalog.indices().delete(handle)?;
        }
    }

    let mut table = catalog.take_table(table_name)?;
    for handle in catalog.column_handles(table_name)? {
        catalog.columns().delete(handle)?;
    }
    table.as_mut().drop()?;
    for handle in table_handles {
        catalog.tables().delete(handle)?;
    }

    info!(table = table_name, "dropped table");
    Ok(QueryResult::with_message(format!("dropped {}", table_name)))
}

/// CREATE INDEX
pub fn create_index(catalog: &mut Catalog, stmt: &CreateIndexStatement) -> Result<QueryResult> {
    let table_name = stmt.table_name.as_str();
    let index_name = stmt.index_name.as_str();

    // catalog relations are written directly and would leave the index stale
    if schema::is_schema_table(table_name) {
        return Err(Error::execution(format!(
            "cannot index schema table {}",
            table_name
        )));
    }
    if !catalog.table_exists(table_name)? {
        return Err(Error::execution(format!("table {} does not exist", table_name)));
    }
    let (table_columns, _) = catalog.get_columns(table_name)?;
    for (i, column) in stmt.columns.iter().enumerate() {
        if !table_columns.contains(column) {
            return Err(Error::execution(format!(
                "column {} does not exist in {}",
                column, table_name
            )));
        }
        if stmt.columns[..i].contains(column) {
            return Err(Error::execution(format!(
                "duplicate column {} in index {}",
                column, index_name
            )));
        }
    }
    if !catalog.index_handles(table_name, index_name)?.is_empty() {
        return Err(Error::execution(format!(
            "index {} already exists on {}",
            index_name, table_name
        )));
    }

    if let Err(e) = create_index_objects(catalog, stmt) {
        let undo = DropIndexStatement {
            index_name: stmt.index_name.clone(),
            table_name: stmt.table_name.clone(),
        };
        if let Err(undo_err) = drop_index(catalog, &undo) {
            warn!(index = index_name, error = %undo_err, "rollback of failed index creation failed");
        }
        return Err(e);
    }

    info!(table = table_name, index = index_name, index_type = stmt.index_type.as_str(), "created index");
    Ok(QueryResult::with_message(format!("created index {}", index_name)))
}

fn create_index_objects(catalog: &mut Catalog, stmt: &CreateIndexStatement) -> Result<()> {
    let table_name = stmt.table_name.as_str();
    let index_name = stmt.index_name.as_str();

    for (seq, column) in (1..).zip(&stmt.columns) {
        catalog.indices().insert(&schema::index_row(
            table_name,
            index_name,
            seq,
            column,
            stmt.index_type,
        ))?;
    }

    let relation = catalog.get_table(table_name)?;
    let mut entries = Vec::new();
    for handle in relation.select(None)? {
        entries.push((handle, relation.project(handle, Some(stmt.columns.as_slice()))?));
    }
    catalog.get_index(table_name, index_name)?.create(&entries)
}

/// DROP INDEX
pub fn drop_index(catalog: &mut Catalog, stmt: &DropIndexStatement) -> Result<QueryResult> {
    let table_name = stmt.table_name.as_str();
    let index_name = stmt.index_name.as_str();

    let handles = catalog.index_handles(table_name, index_name)?;
    if handles.is_empty() {
        return Err(Error::execution(format!(
            "index {} does not exist on {}",
            index_name, table_name
        )));
    }

    catalog.get_index(table_name, index_name)?.drop()?;
    catalog.forget_index(table_name, index_name);
    for handle in handles {
        catalog.indices().delete(handle)?;
    }

    info!(table = table_name, index = index_name, "dropped index");
    Ok(QueryResult::with_message(format!(
        "dropped index {} from {}",
        index_name, table_name
    )))
}
