//! SHOW handlers, answered from the catalog relations

use super::result::QueryResult;
use crate::catalog::{is_schema_table, schema, Catalog, ColumnAttribute, ColumnType};
use crate::error::Result;
use crate::sql::ast::ShowStatement;
use crate::storage::{row, DbRelation, Row};

pub fn show(catalog: &mut Catalog, stmt: &ShowStatement) -> Result<QueryResult> {
    match stmt {
        ShowStatement::Tables => show_tables(catalog),
        ShowStatement::Columns { table_name } => show_columns(catalog, table_name.as_deref()),
        ShowStatement::Index { table_name } => show_index(catalog, table_name),
    }
}

/// Read the rows behind `predicate`, restricted to `columns`
fn read_rows(
    relation: &mut dyn DbRelation,
    predicate: Option<&Row>,
    columns: &[String],
) -> Result<Vec<Row>> {
    relation
        .select(predicate)?
        .into_iter()
        .map(|handle| relation.project(handle, Some(columns)))
        .collect()
}

/// SHOW TABLES lists user tables only
fn show_tables(catalog: &mut Catalog) -> Result<QueryResult> {
    let tables = catalog.tables();
    let column_names = tables.column_names().to_vec();
    let column_attributes = tables.column_attributes().to_vec();

    let rows: Vec<Row> = read_rows(tables, None, &column_names)?
        .into_iter()
        .filter(|table| {
            !table
                .get("table_name")
                .and_then(|name| name.as_str())
                .map_or(false, is_schema_table)
        })
        .collect();

    let message = format!("successfully returned {} rows", rows.len());
    Ok(QueryResult::with_rows(column_names, column_attributes, rows, message))
}

/// SHOW COLUMNS [FROM t]
fn show_columns(catalog: &mut Catalog, table_name: Option<&str>) -> Result<QueryResult> {
    let column_names: Vec<String> = schema::schema_columns(schema::COLUMNS)
        .iter()
        .map(|(name, _)| name.to_string())
        .collect();
    let column_attributes = vec![ColumnAttribute::new(ColumnType::Text); column_names.len()];

    let predicate = table_name.map(|table| row([("table_name", table)]));
    let rows = read_rows(catalog.columns(), predicate.as_ref(), &column_names)?;

    let message = format!("successfully returned {} rows", rows.len());
    Ok(QueryResult::with_rows(column_names, column_attributes, rows, message))
}

/// SHOW INDEX FROM t
fn show_index(catalog: &mut Catalog, table_name: &str) -> Result<QueryResult> {
    let indices = catalog.indices();
    let column_names = indices.column_names().to_vec();
    let column_attributes = indices.column_attributes().to_vec();

    let predicate = row([("table_name", table_name)]);
    let rows = read_rows(indices, Some(&predicate), &column_names)?;

    let message = format!("successfully returned {} rows", rows.len());
    Ok(QueryResult::with_rows(column_names, column_attributes, rows, message))
}
