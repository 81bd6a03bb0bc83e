//! Statement execution module
//!
//! This module contains the dispatcher, the statement handlers, query plans
//! and their optimizer.

pub mod ddl;
pub mod dml;
pub mod executor;
pub mod optimizer;
pub mod planner;
pub mod result;
pub mod show;
pub mod undo;

pub use executor::SqlExec;
pub use optimizer::Optimizer;
pub use planner::EvalPlan;
pub use result::{QueryResult, ResultSet};
pub use undo::{UndoAction, UndoLog};
