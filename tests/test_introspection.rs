mod common;

use common::{count, run, setup};
use heapsql::catalog::ColumnType;
use heapsql::storage::{row, Value};

#[test]
fn test_show_tables_on_fresh_database() {
    let (_dir, mut exec) = setup();
    let result = run(&mut exec, "SHOW TABLES");
    assert_eq!(result.column_names(), &["table_name"]);
    assert!(result.rows().is_empty());
    assert_eq!(result.message(), "successfully returned 0 rows");
}

#[test]
fn test_show_tables_hides_schema_tables() {
    let (_dir, mut exec) = setup();
    run(&mut exec, "CREATE TABLE b (id INT)");
    run(&mut exec, "CREATE TABLE a (id INT)");

    let result = run(&mut exec, "SHOW TABLES");
    assert_eq!(
        result.rows(),
        &[row([("table_name", "b")]), row([("table_name", "a")])]
    );
    assert_eq!(result.column_attributes()[0].data_type(), ColumnType::Text);

    // they are still there, just not listed
    assert_eq!(count(&mut exec, "SELECT * FROM _tables"), 5);
}

#[test]
fn test_show_columns_from_table() {
    let (_dir, mut exec) = setup();
    run(&mut exec, "CREATE TABLE foo (id INT, data TEXT, flag BOOLEAN)");
    run(&mut exec, "CREATE TABLE bar (x INT)");

    let result = run(&mut exec, "SHOW COLUMNS FROM foo");
    assert_eq!(result.column_names(), &["table_name", "column_name", "data_type"]);
    assert!(result
        .column_attributes()
        .iter()
        .all(|attribute| attribute.data_type() == ColumnType::Text));
    assert_eq!(
        result.rows(),
        &[
            row([("table_name", "foo"), ("column_name", "id"), ("data_type", "INT")]),
            row([("table_name", "foo"), ("column_name", "data"), ("data_type", "TEXT")]),
            row([("table_name", "foo"), ("column_name", "flag"), ("data_type", "BOOLEAN")]),
        ]
    );
    assert_eq!(result.message(), "successfully returned 3 rows");
}

#[test]
fn test_show_columns_without_table_includes_schema_tables() {
    let (_dir, mut exec) = setup();
    // 1 + 3 + 6 columns describe the catalog relations
    assert_eq!(count(&mut exec, "SHOW COLUMNS"), 10);

    run(&mut exec, "CREATE TABLE foo (id INT, data TEXT)");
    let result = run(&mut exec, "SHOW COLUMNS");
    assert_eq!(result.rows().len(), 12);
    assert_eq!(
        result.rows()[0],
        row([("table_name", "_tables"), ("column_name", "table_name"), ("data_type", "TEXT")])
    );
}

#[test]
fn test_show_index_shape() {
    let (_dir, mut exec) = setup();
    run(&mut exec, "CREATE TABLE foo (id INT, data TEXT)");
    run(&mut exec, "CREATE TABLE bar (id INT)");
    run(&mut exec, "CREATE INDEX fi ON foo (id)");
    run(&mut exec, "CREATE INDEX bi ON bar (id)");

    let result = run(&mut exec, "SHOW INDEX FROM foo");
    assert_eq!(
        result.column_names(),
        &[
            "table_name",
            "index_name",
            "seq_in_index",
            "column_name",
            "index_type",
            "is_unique",
        ]
    );
    let kinds: Vec<ColumnType> = result
        .column_attributes()
        .iter()
        .map(|attribute| attribute.data_type())
        .collect();
    assert_eq!(
        kinds,
        vec![
            ColumnType::Text,
            ColumnType::Text,
            ColumnType::Int,
            ColumnType::Text,
            ColumnType::Text,
            ColumnType::Boolean,
        ]
    );
    assert_eq!(result.rows().len(), 1);
    assert_eq!(result.rows()[0]["index_name"], Value::from("fi"));
    assert_eq!(result.message(), "successfully returned 1 rows");

    assert_eq!(count(&mut exec, "SHOW INDEX FROM nope"), 0);
}
