mod common;

use common::{count, fail, open, run, setup};
use heapsql::storage::{row, Value};

#[test]
fn test_create_then_drop_leaves_no_catalog_rows() {
    let (dir, mut exec) = setup();
    let result = run(&mut exec, "CREATE TABLE foo (id INT, data TEXT)");
    assert_eq!(result.message(), "created foo");
    run(&mut exec, "CREATE INDEX fx ON foo (id)");
    run(&mut exec, "INSERT INTO foo VALUES (1, 'one')");
    assert!(dir.path().join("foo.db").exists());
    assert!(dir.path().join("foo-fx.idx").exists());

    let result = run(&mut exec, "DROP TABLE foo");
    assert_eq!(result.message(), "dropped foo");

    assert_eq!(count(&mut exec, "SHOW TABLES"), 0);
    assert_eq!(count(&mut exec, "SHOW COLUMNS FROM foo"), 0);
    assert_eq!(count(&mut exec, "SHOW INDEX FROM foo"), 0);
    assert!(!dir.path().join("foo.db").exists());
    assert!(!dir.path().join("foo-fx.idx").exists());

    // the name is free again
    run(&mut exec, "CREATE TABLE foo (other BOOLEAN)");
    assert_eq!(count(&mut exec, "SHOW COLUMNS FROM foo"), 1);
}

#[test]
fn test_create_existing_table() {
    let (_dir, mut exec) = setup();
    run(&mut exec, "CREATE TABLE foo (id INT)");

    let err = fail(&mut exec, "CREATE TABLE foo (id INT)");
    assert_eq!(err, "table foo already exists");

    let result = run(&mut exec, "CREATE TABLE IF NOT EXISTS foo (a TEXT, b TEXT)");
    assert_eq!(result.message(), "table foo already exists");
    assert_eq!(count(&mut exec, "SHOW COLUMNS FROM foo"), 1);

    let err = fail(&mut exec, "CREATE TABLE _columns (id INT)");
    assert_eq!(err, "table _columns already exists");
}

#[test]
fn test_unsupported_column_type_mutates_nothing() {
    let (_dir, mut exec) = setup();
    let err = fail(&mut exec, "CREATE TABLE foo (id INT, born DATE)");
    assert!(err.contains("DATE"), "{}", err);
    assert!(err.contains("born"), "{}", err);
    assert_eq!(count(&mut exec, "SHOW TABLES"), 0);
    assert_eq!(count(&mut exec, "SHOW COLUMNS FROM foo"), 0);
}

#[test]
fn test_failed_physical_create_rolls_back_catalog() {
    let (dir, mut exec) = setup();
    // a stray file where the relation should go
    run(&mut exec, "SHOW TABLES");
    std::fs::write(dir.path().join("foo.db"), b"").unwrap();

    let err = fail(&mut exec, "CREATE TABLE foo (id INT, data TEXT)");
    assert!(err.starts_with("DbRelationError: "), "{}", err);
    assert_eq!(count(&mut exec, "SHOW TABLES"), 0);
    assert_eq!(count(&mut exec, "SHOW COLUMNS FROM foo"), 0);

    std::fs::remove_file(dir.path().join("foo.db")).unwrap();
    run(&mut exec, "CREATE TABLE foo (id INT, data TEXT)");
    run(&mut exec, "INSERT INTO foo VALUES (1, 'one')");
    assert_eq!(count(&mut exec, "SELECT * FROM foo"), 1);
}

#[test]
fn test_create_if_not_exists_adopts_stray_file() {
    let (dir, mut exec) = setup();
    run(&mut exec, "SHOW TABLES");
    std::fs::write(dir.path().join("foo.db"), b"").unwrap();

    run(&mut exec, "CREATE TABLE IF NOT EXISTS foo (id INT)");
    assert_eq!(count(&mut exec, "SHOW TABLES"), 1);
}

#[test]
fn test_drop_table_errors() {
    let (_dir, mut exec) = setup();
    for name in ["_tables", "_columns", "_indices"] {
        let err = fail(&mut exec, &format!("DROP TABLE {}", name));
        assert_eq!(err, "cannot drop a schema table");
    }
    let err = fail(&mut exec, "DROP TABLE nope");
    assert_eq!(err, "table nope does not exist");
}

#[test]
fn test_show_index_lists_columns_in_order() {
    let (_dir, mut exec) = setup();
    run(&mut exec, "CREATE TABLE foo (id INT, data TEXT, flag BOOLEAN)");
    let result = run(&mut exec, "CREATE INDEX fx ON foo USING HASH (data, id)");
    assert_eq!(result.message(), "created index fx");

    let result = run(&mut exec, "SHOW INDEX FROM foo");
    assert_eq!(
        result.rows(),
        &[
            row([
                ("table_name", Value::from("foo")),
                ("index_name", Value::from("fx")),
                ("seq_in_index", Value::Integer(1)),
                ("column_name", Value::from("data")),
                ("index_type", Value::from("HASH")),
                ("is_unique", Value::Boolean(false)),
            ]),
            row([
                ("table_name", Value::from("foo")),
                ("index_name", Value::from("fx")),
                ("seq_in_index", Value::Integer(2)),
                ("column_name", Value::from("id")),
                ("index_type", Value::from("HASH")),
                ("is_unique", Value::Boolean(false)),
            ]),
        ]
    );

    run(&mut exec, "CREATE INDEX fy ON foo (flag)");
    let result = run(&mut exec, "SHOW INDEX FROM foo");
    let last = &result.rows()[2];
    assert_eq!(last["index_type"], Value::from("BTREE"));
    assert_eq!(last["is_unique"], Value::Boolean(true));
}

#[test]
fn test_create_index_on_unknown_column() {
    let (_dir, mut exec) = setup();
    run(&mut exec, "CREATE TABLE foo (id INT)");
    let err = fail(&mut exec, "CREATE INDEX fx ON foo (id, nope)");
    assert!(err.contains("nope"), "{}", err);
    assert!(err.contains("foo"), "{}", err);
    assert_eq!(count(&mut exec, "SHOW INDEX FROM foo"), 0);

    let err = fail(&mut exec, "CREATE INDEX fx ON bar (id)");
    assert_eq!(err, "table bar does not exist");
}

#[test]
fn test_duplicate_index_name() {
    let (_dir, mut exec) = setup();
    run(&mut exec, "CREATE TABLE foo (id INT, data TEXT)");
    run(&mut exec, "CREATE INDEX fx ON foo (id)");
    let err = fail(&mut exec, "CREATE INDEX fx ON foo USING HASH (data)");
    assert_eq!(err, "index fx already exists on foo");
    assert_eq!(count(&mut exec, "SHOW INDEX FROM foo"), 1);
}

#[test]
fn test_unique_index_over_duplicates_is_rolled_back() {
    let (dir, mut exec) = setup();
    run(&mut exec, "CREATE TABLE foo (id INT)");
    run(&mut exec, "INSERT INTO foo VALUES (1)");
    run(&mut exec, "INSERT INTO foo VALUES (1)");

    let err = fail(&mut exec, "CREATE INDEX fx ON foo (id)");
    assert!(err.starts_with("DbRelationError: "), "{}", err);
    assert!(err.contains("duplicate key"), "{}", err);
    assert_eq!(count(&mut exec, "SHOW INDEX FROM foo"), 0);
    assert!(!dir.path().join("foo-fx.idx").exists());

    // a non-unique index over the same data is fine
    run(&mut exec, "CREATE INDEX fx ON foo USING HASH (id)");
    assert_eq!(count(&mut exec, "SELECT * FROM foo WHERE id = 1"), 2);
}

#[test]
fn test_drop_index() {
    let (dir, mut exec) = setup();
    run(&mut exec, "CREATE TABLE foo (id INT)");
    run(&mut exec, "CREATE INDEX fx ON foo (id)");

    let result = run(&mut exec, "DROP INDEX fx FROM foo");
    assert_eq!(result.message(), "dropped index fx from foo");
    assert_eq!(count(&mut exec, "SHOW INDEX FROM foo"), 0);
    assert!(!dir.path().join("foo-fx.idx").exists());

    let err = fail(&mut exec, "DROP INDEX fx FROM foo");
    assert_eq!(err, "index fx does not exist on foo");
}

#[test]
fn test_drop_index_tolerates_missing_file() {
    let (dir, mut exec) = setup();
    run(&mut exec, "CREATE TABLE foo (id INT)");
    run(&mut exec, "CREATE INDEX fx ON foo (id)");
    std::fs::remove_file(dir.path().join("foo-fx.idx")).unwrap();

    run(&mut exec, "DROP INDEX fx FROM foo");
    assert_eq!(count(&mut exec, "SHOW INDEX FROM foo"), 0);
}

#[test]
fn test_schema_survives_reopen() {
    let (dir, mut exec) = setup();
    run(&mut exec, "CREATE TABLE foo (id INT, data TEXT)");
    run(&mut exec, "CREATE INDEX fx ON foo (id)");
    run(&mut exec, "INSERT INTO foo VALUES (1, 'one')");
    drop(exec);

    let mut exec = open(&dir);
    assert_eq!(count(&mut exec, "SHOW TABLES"), 1);
    assert_eq!(count(&mut exec, "SELECT * FROM foo WHERE id = 1"), 1);
    let err = fail(&mut exec, "INSERT INTO foo VALUES (1, 'again')");
    assert!(err.contains("duplicate key"), "{}", err);
}

#[test]
fn test_cannot_index_schema_tables() {
    let (_dir, mut exec) = setup();
    let err = fail(&mut exec, "CREATE INDEX tx ON _tables (table_name)");
    assert_eq!(err, "cannot index schema table _tables");
    let err = fail(&mut exec, "CREATE INDEX cx ON _columns USING HASH (table_name)");
    assert_eq!(err, "cannot index schema table _columns");
    assert_eq!(count(&mut exec, "SHOW INDEX FROM _tables"), 0);
    assert_eq!(count(&mut exec, "SHOW INDEX FROM _columns"), 0);

    // catalog lookups stay exact as tables come and go
    run(&mut exec, "CREATE TABLE foo (a INT)");
    assert_eq!(count(&mut exec, "SELECT * FROM _tables WHERE table_name = 'foo'"), 1);
    assert_eq!(count(&mut exec, "SELECT * FROM _columns WHERE table_name = 'foo'"), 1);
}

#[test]
fn test_not_null_is_accepted_but_nullable() {
    let (_dir, mut exec) = setup();
    run(&mut exec, "CREATE TABLE foo (id INT NOT NULL, data TEXT)");
    run(&mut exec, "INSERT INTO foo (data) VALUES ('x')");
    let result = run(&mut exec, "SELECT id FROM foo");
    assert_eq!(result.rows(), &[row([("id", Value::Null)])]);
}
