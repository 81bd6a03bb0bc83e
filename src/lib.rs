//! heapsql - statement execution over a heap-file relational store
//!
//! This library provides:
//! - SQL parsing (lexer, parser, AST) for the supported statement set
//! - Storage (slotted pages, heap relations, B-tree style indices)
//! - The system catalog (`_tables`, `_columns`, `_indices`)
//! - Statement execution (dispatcher, DDL/DML/SHOW handlers, query plans)

pub mod catalog;
pub mod config;
pub mod error;
pub mod executor;
pub mod sql;
pub mod storage;

pub use config::DbConfig;
pub use error::{Error, Result};
pub use executor::{QueryResult, SqlExec};
