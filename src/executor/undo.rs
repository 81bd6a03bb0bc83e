//! Compensating rollback
//!
//! Statements that touch several relations record an `UndoAction` for every
//! mutation that succeeded. If a later step fails, the log is replayed in
//! reverse. Rollback is best effort: a failing undo step is logged and the
//! rest still run.

use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::error::Result;
use crate::storage::{Handle, Row};

/// One reversible mutation
#[derive(Debug, Clone, PartialEq)]
pub enum UndoAction {
    /// A row was inserted into `relation`
    DeleteRow { relation: String, handle: Handle },
    /// A row was added to an index
    UnindexRow {
        table: String,
        index: String,
        handle: Handle,
        row: Row,
    },
}

impl UndoAction {
    fn apply(&self, catalog: &mut Catalog) -> Result<()> {
        match self {
            UndoAction::DeleteRow { relation, handle } => {
                catalog.get_table(relation)?.delete(*handle)
            }
            UndoAction::UnindexRow {
                table,
                index,
                handle,
                row,
            } => catalog.get_index(table, index)?.delete(*handle, row),
        }
    }
}

/// Ordered list of mutations to compensate on failure
#[derive(Debug, Default)]
pub struct UndoLog {
    actions: Vec<UndoAction>,
}

impl UndoLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a mutation that just succeeded
    pub fn push(&mut self, action: UndoAction) {
        self.actions.push(action);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Undo every recorded mutation, newest first
    pub fn rollback(self, catalog: &mut Catalog) {
        debug!(actions = self.actions.len(), "rolling back");
        for action in self.actions.iter().rev() {
            if let Err(e) = action.apply(catalog) {
                warn!(?action, error = %e, "rollback step failed");
            }
        }
    }
}
