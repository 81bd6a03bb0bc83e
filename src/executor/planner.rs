//! Query plans for heapsql
//!
//! SELECT and DELETE are planned as a scan of one table, an optional
//! equality filter and, for SELECT, a projection. `pipeline` runs a plan down
//! to row handles; `evaluate` also reads the rows.

use super::optimizer::Optimizer;
use crate::catalog::{Catalog, IndexInfo};
use crate::error::{Error, Result};
use crate::sql::ast::{BinaryOperator, Expr, Literal};
use crate::storage::{row_matches, DbRelation, Handle, Row, Value};

/// Evaluation plan node
#[derive(Debug, Clone, PartialEq)]
pub enum EvalPlan {
    /// Every row of a table
    Scan { table: String },
    /// Rows of `input` equal to `predicate` on its columns
    Filter { predicate: Row, input: Box<EvalPlan> },
    /// Rows of `input` cut down to `columns`
    Project {
        columns: Vec<String>,
        input: Box<EvalPlan>,
    },
    /// A scan with the predicate pushed into the relation
    FilteredScan { table: String, predicate: Row },
    /// Rows found through an index, then checked against `residual`
    IndexLookup {
        table: String,
        index: String,
        key: Row,
        residual: Option<Row>,
    },
}

impl EvalPlan {
    /// Scan `table`
    pub fn scan(table: impl Into<String>) -> Self {
        EvalPlan::Scan {
            table: table.into(),
        }
    }

    /// Keep only rows matching `predicate`
    pub fn filter(self, predicate: Row) -> Self {
        EvalPlan::Filter {
            predicate,
            input: Box::new(self),
        }
    }

    /// Restrict output rows to `columns`
    pub fn project(self, columns: Vec<String>) -> Self {
        EvalPlan::Project {
            columns,
            input: Box::new(self),
        }
    }

    /// Rewrite the plan using the indices of its table
    pub fn optimize(self, indices: &[IndexInfo]) -> Self {
        Optimizer::new(indices).optimize(self)
    }

    /// Name of the table the plan reads
    pub fn table(&self) -> &str {
        match self {
            EvalPlan::Scan { table }
            | EvalPlan::FilteredScan { table, .. }
            | EvalPlan::IndexLookup { table, .. } => table.as_str(),
            EvalPlan::Filter { input, .. } | EvalPlan::Project { input, .. } => input.table(),
        }
    }

    /// Run the plan down to the handles of the rows it selects
    pub fn pipeline(&self, catalog: &mut Catalog) -> Result<(String, Vec<Handle>)> {
        match self {
            EvalPlan::Scan { table } => {
                let handles = catalog.get_table(table)?.select(None)?;
                Ok((table.clone(), handles))
            }
            EvalPlan::FilteredScan { table, predicate } => {
                let handles = catalog.get_table(table)?.select(Some(predicate))?;
                Ok((table.clone(), handles))
            }
            EvalPlan::Filter { predicate, input } => {
                let (table, handles) = input.pipeline(catalog)?;
                let relation = catalog.get_table(&table)?;
                let handles = keep_matching(relation, handles, predicate)?;
                Ok((table, handles))
            }
            EvalPlan::Project { input, .. } => input.pipeline(catalog),
            EvalPlan::IndexLookup {
                table,
                index,
                key,
                residual,
            } => {
                let relation = catalog.get_table(table)?;
                let key_columns: Vec<String> = key.keys().cloned().collect();
                let attributes = relation.get_column_attributes(&key_columns)?;
                let key_fits = attributes
                    .iter()
                    .zip(key.values())
                    .all(|(attribute, value)| attribute.accepts(value));
                if !key_fits {
                    // the lookup cannot match, but a scan still reports the
                    // type mismatch against stored rows
                    let mut predicate = key.clone();
                    if let Some(residual) = residual {
                        predicate.extend(residual.clone());
                    }
                    let handles = relation.select(Some(&predicate))?;
                    return Ok((table.clone(), handles));
                }

                let handles = catalog.get_index(table, index)?.lookup(key)?;
                let handles = match residual {
                    Some(residual) => {
                        keep_matching(catalog.get_table(table)?, handles, residual)?
                    }
                    None => handles,
                };
                Ok((table.clone(), handles))
            }
        }
    }

    /// Run the plan and read its rows. Returns the output column names and
    /// the rows.
    pub fn evaluate(&self, catalog: &mut Catalog) -> Result<(Vec<String>, Vec<Row>)> {
        let columns = match self {
            EvalPlan::Project { columns, .. } => Some(columns.as_slice()),
            _ => None,
        };
        let (table, handles) = self.pipeline(catalog)?;
        let relation = catalog.get_table(&table)?;
        let column_names = match columns {
            Some(columns) => columns.to_vec(),
            None => relation.column_names().to_vec(),
        };
        let rows = handles
            .into_iter()
            .map(|handle| relation.project(handle, Some(column_names.as_slice())))
            .collect::<Result<Vec<_>>>()?;
        Ok((column_names, rows))
    }
}

fn keep_matching(
    relation: &mut dyn DbRelation,
    handles: Vec<Handle>,
    predicate: &Row,
) -> Result<Vec<Handle>> {
    let mut kept = Vec::with_capacity(handles.len());
    for handle in handles {
        let row = relation.project(handle, None)?;
        if row_matches(&row, predicate, relation.name())? {
            kept.push(handle);
        }
    }
    Ok(kept)
}

/// Turn a WHERE clause into the equality predicate it denotes.
///
/// Only conjunctions of `column = literal` are understood; parentheses are
/// looked through. Anything else is an "unrecognized expression".
pub fn get_where_conjunction(expr: &Expr) -> Result<Row> {
    let mut predicate = Row::new();
    collect_conjunction(expr, &mut predicate)?;
    Ok(predicate)
}

fn collect_conjunction(expr: &Expr, predicate: &mut Row) -> Result<()> {
    match expr {
        Expr::Nested(inner) => collect_conjunction(inner, predicate),
        Expr::BinaryOp {
            left,
            op: BinaryOperator::And,
            right,
        } => {
            collect_conjunction(left, predicate)?;
            collect_conjunction(right, predicate)
        }
        Expr::BinaryOp {
            left,
            op: BinaryOperator::Eq,
            right,
        } => match (left.as_ref(), right.as_ref()) {
            (Expr::Column(column), Expr::Literal(literal)) => {
                let value = literal_value(literal)?;
                match predicate.get(column) {
                    Some(existing) if *existing != value => Err(Error::execution(format!(
                        "conflicting predicate on column {}",
                        column
                    ))),
                    _ => {
                        predicate.insert(column.clone(), value);
                        Ok(())
                    }
                }
            }
            _ => Err(Error::execution("unrecognized expression")),
        },
        _ => Err(Error::execution("unrecognized expression")),
    }
}

/// Convert an INSERT or WHERE literal to a stored value. Only integer and
/// string literals are accepted.
pub fn literal_value(literal: &Literal) -> Result<Value> {
    match literal {
        Literal::Integer(n) => i32::try_from(*n)
            .map(Value::Integer)
            .map_err(|_| Error::execution(format!("integer literal {} out of range", n))),
        Literal::String(s) => Ok(Value::Text(s.clone())),
        other => Err(Error::execution(format!("unsupported literal {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::ast::Statement;
    use crate::sql::Parser;
    use crate::storage::row;

    fn where_clause(sql: &str) -> Expr {
        match Parser::new(sql).unwrap().parse().unwrap() {
            Statement::Select(select) => select.where_clause.unwrap(),
            other => panic!("expected SELECT, got {:?}", other),
        }
    }

    #[test]
    fn test_conjunction() {
        let expr = where_clause("SELECT * FROM t WHERE a = 1 AND (b = 'x' AND c = -3)");
        assert_eq!(
            get_where_conjunction(&expr).unwrap(),
            row([
                ("a", Value::Integer(1)),
                ("b", Value::from("x")),
                ("c", Value::Integer(-3)),
            ])
        );
    }

    #[test]
    fn test_repeated_binding_is_allowed() {
        let expr = where_clause("SELECT * FROM t WHERE a = 1 AND a = 1");
        assert_eq!(get_where_conjunction(&expr).unwrap(), row([("a", 1)]));
    }

    #[test]
    fn test_conflicting_binding() {
        let expr = where_clause("SELECT * FROM t WHERE a = 1 AND a = 2");
        let err = get_where_conjunction(&expr).unwrap_err();
        assert_eq!(err.to_string(), "conflicting predicate on column a");
    }

    #[test]
    fn test_unrecognized_expressions() {
        for sql in [
            "SELECT * FROM t WHERE a = 1 OR b = 2",
            "SELECT * FROM t WHERE a > 1",
            "SELECT * FROM t WHERE 1 = a",
            "SELECT * FROM t WHERE a = b",
            "SELECT * FROM t WHERE NOT a = 1",
        ] {
            let err = get_where_conjunction(&where_clause(sql)).unwrap_err();
            assert_eq!(err.to_string(), "unrecognized expression", "{}", sql);
        }
    }

    #[test]
    fn test_literal_value() {
        assert_eq!(literal_value(&Literal::Integer(7)).unwrap(), Value::Integer(7));
        assert!(literal_value(&Literal::Integer(i64::MAX)).is_err());
        assert!(literal_value(&Literal::Boolean(true)).is_err());
        assert!(literal_value(&Literal::Null).is_err());
        let err = literal_value(&Literal::Float(1.5)).unwrap_err();
        assert_eq!(err.to_string(), "unsupported literal 1.5");
    }

    #[test]
    fn test_plan_table() {
        let plan = EvalPlan::scan("foo").filter(row([("a", 1)])).project(vec![]);
        assert_eq!(plan.table(), "foo");
    }
}
