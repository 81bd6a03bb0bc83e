//! Plan optimizer for heapsql
//!
//! Rewrites are purely structural and never change which rows a plan
//! produces:
//! - stacked filters merge into one predicate
//! - a filter over a scan becomes an index lookup when an index on the table
//!   has every key column bound by the predicate
//! - otherwise the predicate is pushed into the scan itself

use super::planner::EvalPlan;
use crate::catalog::IndexInfo;
use crate::storage::Row;

/// Heuristic optimizer over the indices of the scanned table
pub struct Optimizer<'a> {
    indices: &'a [IndexInfo],
}

impl<'a> Optimizer<'a> {
    /// Create an optimizer that may use `indices`
    pub fn new(indices: &'a [IndexInfo]) -> Self {
        Self { indices }
    }

    /// Optimize a plan
    pub fn optimize(&self, plan: EvalPlan) -> EvalPlan {
        match plan {
            EvalPlan::Project { columns, input } => EvalPlan::Project {
                columns,
                input: Box::new(self.optimize(*input)),
            },
            EvalPlan::Filter { predicate, input } => {
                self.push_filter(predicate, self.optimize(*input))
            }
            other => other,
        }
    }

    /// Fold `predicate` into an already optimized input
    fn push_filter(&self, predicate: Row, input: EvalPlan) -> EvalPlan {
        match input {
            EvalPlan::Scan { table } => self.access_path(table, predicate),
            EvalPlan::FilteredScan {
                table,
                predicate: inner,
            } => match merge(&inner, &predicate) {
                Some(merged) => self.access_path(table, merged),
                None => EvalPlan::filter(EvalPlan::FilteredScan { table, predicate: inner }, predicate),
            },
            EvalPlan::IndexLookup {
                table,
                index,
                key,
                residual,
            } => {
                let mut bound = key.clone();
                if let Some(residual) = &residual {
                    bound.extend(residual.clone());
                }
                match merge(&bound, &predicate) {
                    Some(merged) => self.access_path(table, merged),
                    None => EvalPlan::filter(
                        EvalPlan::IndexLookup {
                            table,
                            index,
                            key,
                            residual,
                        },
                        predicate,
                    ),
                }
            }
            other => EvalPlan::filter(other, predicate),
        }
    }

    /// Best way to fetch the rows of `table` matching `predicate`
    fn access_path(&self, table: String, predicate: Row) -> EvalPlan {
        let best = self
            .indices
            .iter()
            .filter(|index| {
                !index.columns.is_empty() && index.columns.iter().all(|c| predicate.contains_key(c))
            })
            .fold(None, |best: Option<&IndexInfo>, index| match best {
                Some(current) if current.columns.len() >= index.columns.len() => Some(current),
                _ => Some(index),
            });

        match best {
            Some(index) => {
                let mut key = Row::new();
                let mut residual = predicate;
                for column in &index.columns {
                    if let Some(value) = residual.shift_remove(column) {
                        key.insert(column.clone(), value);
                    }
                }
                EvalPlan::IndexLookup {
                    table,
                    index: index.name.clone(),
                    key,
                    residual: if residual.is_empty() { None } else { Some(residual) },
                }
            }
            None => EvalPlan::FilteredScan { table, predicate },
        }
    }
}

/// Union of two equality predicates, `None` if they bind a column to
/// different values
pub fn merge(a: &Row, b: &Row) -> Option<Row> {
    let mut merged = a.clone();
    for (column, value) in b {
        match merged.get(column) {
            Some(existing) if existing != value => return None,
            Some(_) => {}
            None => {
                merged.insert(column.clone(), value.clone());
            }
        }
    }
    Some(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{row, Value};

    fn info(name: &str, columns: &[&str]) -> IndexInfo {
        IndexInfo {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn test_filter_without_index_becomes_filtered_scan() {
        let plan = EvalPlan::scan("foo").filter(row([("a", 1)]));
        let optimized = Optimizer::new(&[]).optimize(plan);
        assert_eq!(
            optimized,
            EvalPlan::FilteredScan {
                table: "foo".to_string(),
                predicate: row([("a", 1)]),
            }
        );
    }

    #[test]
    fn test_filter_uses_covering_index() {
        let indices = vec![info("fa", &["a"]), info("fab", &["a", "b"]), info("fc", &["c"])];
        let plan = EvalPlan::scan("foo")
            .filter(row([("a", Value::Integer(1)), ("b", Value::from("x")), ("d", Value::Integer(4))]))
            .project(vec!["a".to_string()]);
        let optimized = Optimizer::new(&indices).optimize(plan);
        assert_eq!(
            optimized,
            EvalPlan::IndexLookup {
                table: "foo".to_string(),
                index: "fab".to_string(),
                key: row([("a", Value::Integer(1)), ("b", Value::from("x"))]),
                residual: Some(row([("d", 4)])),
            }
            .project(vec!["a".to_string()])
        );
    }

    #[test]
    fn test_partially_bound_index_is_not_used() {
        let indices = vec![info("fab", &["a", "b"])];
        let plan = EvalPlan::scan("foo").filter(row([("a", 1)]));
        assert!(matches!(
            Optimizer::new(&indices).optimize(plan),
            EvalPlan::FilteredScan { .. }
        ));
    }

    #[test]
    fn test_stacked_filters_merge() {
        let plan = EvalPlan::scan("foo")
            .filter(row([("a", 1)]))
            .filter(row([("b", 2)]));
        assert_eq!(
            Optimizer::new(&[]).optimize(plan),
            EvalPlan::FilteredScan {
                table: "foo".to_string(),
                predicate: row([("a", 1), ("b", 2)]),
            }
        );
    }

    #[test]
    fn test_conflicting_filters_stay_separate() {
        let plan = EvalPlan::scan("foo")
            .filter(row([("a", 1)]))
            .filter(row([("a", 2)]));
        assert!(matches!(
            Optimizer::new(&[]).optimize(plan),
            EvalPlan::Filter { .. }
        ));
        assert_eq!(merge(&row([("a", 1)]), &row([("a", 2)])), None);
    }
}
