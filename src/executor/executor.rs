//! Statement dispatcher for heapsql
//!
//! `SqlExec` owns the catalog and routes each parsed statement to its
//! handler. Storage errors leaving a handler are reported as execution errors
//! prefixed with `DbRelationError: `.

use tracing::debug;

use super::result::QueryResult;
use super::{ddl, dml, show};
use crate::catalog::Catalog;
use crate::config::DbConfig;
use crate::error::{Error, Result};
use crate::sql::ast::Statement;
use crate::sql::Parser;

/// Statement executor
#[derive(Debug)]
pub struct SqlExec {
    config: DbConfig,
    /// Opened on the first statement
    catalog: Option<Catalog>,
}

impl SqlExec {
    /// Create an executor over `config.data_dir`
    pub fn new(config: DbConfig) -> Self {
        Self {
            config,
            catalog: None,
        }
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// The catalog, opening (and bootstrapping) it on first use
    pub fn catalog(&mut self) -> Result<&mut Catalog> {
        if self.catalog.is_none() {
            self.catalog = Some(Catalog::open(&self.config)?);
        }
        self.catalog
            .as_mut()
            .ok_or_else(|| Error::execution("catalog is not open"))
    }

    /// Execute one statement
    pub fn execute(&mut self, statement: &Statement) -> Result<QueryResult> {
        debug!(%statement, "executing");
        self.dispatch(statement).map_err(Error::into_execution)
    }

    /// Parse and execute a single statement
    pub fn execute_sql(&mut self, sql: &str) -> Result<QueryResult> {
        let statement = Parser::new(sql)?.parse()?;
        self.execute(&statement)
    }

    fn dispatch(&mut self, statement: &Statement) -> Result<QueryResult> {
        let catalog = self.catalog()?;
        match statement {
            Statement::CreateTable(stmt) => ddl::create_table(catalog, stmt),
            Statement::DropTable(stmt) => ddl::drop_table(catalog, stmt),
            Statement::CreateIndex(stmt) => ddl::create_index(catalog, stmt),
            Statement::DropIndex(stmt) => ddl::drop_index(catalog, stmt),
            Statement::Show(stmt) => show::show(catalog, stmt),
            Statement::Insert(stmt) => dml::insert(catalog, stmt),
            Statement::Delete(stmt) => dml::delete(catalog, stmt),
            Statement::Select(stmt) => dml::select(catalog, stmt),
            Statement::Update(_) => Ok(QueryResult::with_message("not implemented")),
        }
    }
}
