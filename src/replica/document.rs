//! The in-memory notebook replica

use crate::notebook::{Cell, Notebook, Snapshot, Worksheet};

use super::error::ReplicaError;

/// Owns the client-side copy of one notebook
///
/// The replica starts empty and is rebuilt in full from each snapshot, so a
/// lost replica (e.g. after a reconnect) recovers from the next snapshot
/// alone. Mutable access is crate-private: the reconciler is the only
/// writer, everything else reads.
#[derive(Debug, Default)]
pub struct DocumentReplica {
    notebook: Notebook,
}

impl DocumentReplica {
    /// Create an empty replica, to be populated by the first snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the current notebook state
    pub fn notebook(&self) -> &Notebook {
        &self.notebook
    }

    /// Look up a worksheet, failing if the id is unknown
    pub fn worksheet(&self, worksheet_id: &str) -> Result<&Worksheet, ReplicaError> {
        self.notebook
            .worksheet(worksheet_id)
            .ok_or_else(|| ReplicaError::WorksheetNotFound(worksheet_id.to_string()))
    }

    /// Look up a cell within a worksheet, failing if either id is unknown
    pub fn cell(&self, worksheet_id: &str, cell_id: &str) -> Result<&Cell, ReplicaError> {
        self.worksheet(worksheet_id)?
            .cell(cell_id)
            .ok_or_else(|| ReplicaError::CellNotFound {
                worksheet_id: worksheet_id.to_string(),
                cell_id: cell_id.to_string(),
            })
    }

    /// Replace the entire notebook value from a snapshot
    ///
    /// Application is all-or-nothing: the snapshot is validated before any
    /// state changes, and a structurally invalid snapshot leaves the
    /// previous notebook untouched.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) -> Result<(), ReplicaError> {
        snapshot.notebook.validate()?;
        self.notebook = snapshot.notebook;
        Ok(())
    }

    pub(crate) fn notebook_mut(&mut self) -> &mut Notebook {
        &mut self.notebook
    }

    pub(crate) fn worksheet_mut(
        &mut self,
        worksheet_id: &str,
    ) -> Result<&mut Worksheet, ReplicaError> {
        self.notebook
            .worksheets
            .get_mut(worksheet_id)
            .ok_or_else(|| ReplicaError::WorksheetNotFound(worksheet_id.to_string()))
    }
}
