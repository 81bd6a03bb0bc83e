//! Shared helpers for the integration tests

#![allow(dead_code)]

use heapsql::{DbConfig, Error, QueryResult, SqlExec};
use tempfile::TempDir;

/// A fresh executor over its own temporary data directory
pub fn setup() -> (TempDir, SqlExec) {
    let dir = TempDir::new().unwrap();
    let exec = open(&dir);
    (dir, exec)
}

/// A new executor over an existing data directory
pub fn open(dir: &TempDir) -> SqlExec {
    SqlExec::new(DbConfig::new().data_dir(dir.path()))
}

/// Execute a statement that must succeed
pub fn run(exec: &mut SqlExec, sql: &str) -> QueryResult {
    exec.execute_sql(sql)
        .unwrap_or_else(|e| panic!("{} failed: {}", sql, e))
}

/// Execute a statement that must fail, returning the error message
pub fn fail(exec: &mut SqlExec, sql: &str) -> String {
    match exec.execute_sql(sql) {
        Ok(result) => panic!("{} unexpectedly succeeded: {}", sql, result),
        Err(e @ Error::Execution(_)) => e.to_string(),
        Err(e) => panic!("{} failed with a non-execution error: {:?}", sql, e),
    }
}

/// Number of rows a statement returns
pub fn count(exec: &mut SqlExec, sql: &str) -> usize {
    run(exec, sql).rows().len()
}
