//! DML handlers: INSERT, DELETE and SELECT

use tracing::debug;

use super::planner::{get_where_conjunction, literal_value, EvalPlan};
use super::result::QueryResult;
use super::undo::{UndoAction, UndoLog};
use crate::catalog::{is_schema_table, Catalog};
use crate::error::{Error, Result};
use crate::sql::ast::{DeleteStatement, Expr, InsertStatement, SelectItem, SelectStatement};
use crate::storage::Row;

fn check_table(catalog: &mut Catalog, table_name: &str) -> Result<()> {
    if catalog.table_exists(table_name)? {
        Ok(())
    } else {
        Err(Error::execution(format!("unknown table {}", table_name)))
    }
}

fn check_writable(table_name: &str) -> Result<()> {
    if is_schema_table(table_name) {
        return Err(Error::execution(format!(
            "cannot modify schema table {}",
            table_name
        )));
    }
    Ok(())
}

/// The WHERE conjunction as a predicate. Its columns are checked against the
/// table here so an unknown column fails whichever access path is chosen.
fn where_predicate(
    catalog: &mut Catalog,
    table_name: &str,
    where_clause: Option<&Expr>,
) -> Result<Option<Row>> {
    let Some(expr) = where_clause else {
        return Ok(None);
    };
    let predicate = get_where_conjunction(expr)?;
    let columns: Vec<String> = predicate.keys().cloned().collect();
    catalog.get_table(table_name)?.get_column_attributes(&columns)?;
    Ok(Some(predicate))
}

/// " and N indices", or nothing without indices
fn indices_suffix(count: usize) -> String {
    if count > 0 {
        format!(" and {} indices", count)
    } else {
        String::new()
    }
}

// ========== INSERT ==========

/// INSERT INTO t [(columns)] VALUES (values)
///
/// Stores one row and adds it to every index on the table. If any step
/// fails the row is taken back out of the relation and of the indices it
/// already reached.
pub fn insert(catalog: &mut Catalog, stmt: &InsertStatement) -> Result<QueryResult> {
    let table_name = stmt.table_name.as_str();
    check_writable(table_name)?;
    check_table(catalog, table_name)?;

    let column_names = match &stmt.columns {
        Some(columns) => columns.clone(),
        None => catalog.get_columns(table_name)?.0,
    };
    if column_names.len() != stmt.values.len() {
        return Err(Error::execution(format!(
            "{} values for {} columns",
            stmt.values.len(),
            column_names.len()
        )));
    }

    let mut new_row = Row::new();
    for (column, expr) in column_names.iter().zip(&stmt.values) {
        let value = match expr {
            Expr::Literal(literal) => literal_value(literal)?,
            other => {
                return Err(Error::execution(format!("unsupported value {}", other)));
            }
        };
        if new_row.insert(column.clone(), value).is_some() {
            return Err(Error::execution(format!("duplicate column {}", column)));
        }
    }

    let index_names = catalog.index_names(table_name)?;
    let mut undo = UndoLog::new();
    if let Err(e) = insert_row(catalog, table_name, &new_row, &index_names, &mut undo) {
        undo.rollback(catalog);
        return Err(e);
    }

    Ok(QueryResult::with_message(format!(
        "successfully inserted 1 row into {}{}",
        table_name,
        indices_suffix(index_names.len())
    )))
}

fn insert_row(
    catalog: &mut Catalog,
    table_name: &str,
    new_row: &Row,
    index_names: &[String],
    undo: &mut UndoLog,
) -> Result<()> {
    let relation = catalog.get_table(table_name)?;
    let handle = relation.insert(new_row)?;
    undo.push(UndoAction::DeleteRow {
        relation: table_name.to_string(),
        handle,
    });
    // index the row as stored, with defaults filled in
    let stored = relation.project(handle, None)?;

    for index_name in index_names {
        catalog.get_index(table_name, index_name)?.insert(handle, &stored)?;
        undo.push(UndoAction::UnindexRow {
            table: table_name.to_string(),
            index: index_name.clone(),
            handle,
            row: stored.clone(),
        });
    }
    debug!(table = table_name, ?handle, indices = index_names.len(), "inserted row");
    Ok(())
}

// ========== DELETE ==========

/// DELETE FROM t [WHERE conjunction]
pub fn delete(catalog: &mut Catalog, stmt: &DeleteStatement) -> Result<QueryResult> {
    let table_name = stmt.table_name.as_str();
    check_writable(table_name)?;
    check_table(catalog, table_name)?;

    let mut plan = EvalPlan::scan(table_name);
    if let Some(predicate) = where_predicate(catalog, table_name, stmt.where_clause.as_ref())? {
        plan = plan.filter(predicate);
    }
    let indices = catalog.index_infos(table_name)?;
    let plan = plan.optimize(&indices);
    debug!(?plan, "delete plan");

    let (_, handles) = plan.pipeline(catalog)?;
    for handle in &handles {
        let old_row = catalog.get_table(table_name)?.project(*handle, None)?;
        for index in &indices {
            catalog
                .get_index(table_name, &index.name)?
                .delete(*handle, &old_row)?;
        }
        catalog.get_table(table_name)?.delete(*handle)?;
    }

    Ok(QueryResult::with_message(format!(
        "successfully deleted {} rows from {}{}",
        handles.len(),
        table_name,
        indices_suffix(indices.len())
    )))
}

// ========== SELECT ==========

/// SELECT columns FROM t [WHERE conjunction]
pub fn select(catalog: &mut Catalog, stmt: &SelectStatement) -> Result<QueryResult> {
    let table_name = stmt.table_name.as_str();
    check_table(catalog, table_name)?;

    let mut columns = Vec::new();
    for item in &stmt.columns {
        match item {
            SelectItem::Wildcard => columns.extend(catalog.get_columns(table_name)?.0),
            SelectItem::Column(name) => columns.push(name.clone()),
        }
    }
    let attributes = catalog
        .get_table(table_name)?
        .get_column_attributes(&columns)?;

    let mut plan = EvalPlan::scan(table_name);
    if let Some(predicate) = where_predicate(catalog, table_name, stmt.where_clause.as_ref())? {
        plan = plan.filter(predicate);
    }
    let indices = catalog.index_infos(table_name)?;
    let plan = plan.project(columns).optimize(&indices);
    debug!(?plan, "select plan");

    let (column_names, rows) = plan.evaluate(catalog)?;
    let message = format!("successfully returned {} rows", rows.len());
    Ok(QueryResult::with_rows(column_names, attributes, rows, message))
}
