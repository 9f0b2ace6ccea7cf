//! Error types for replica operations

use thiserror::Error;

use crate::notebook::{CellId, StructureError, WorksheetId};

/// Error types for replica lookups and update application
#[derive(Error, Debug)]
pub enum ReplicaError {
    #[error("worksheet not found: {0}")]
    WorksheetNotFound(WorksheetId),

    #[error("cell not found: {cell_id} in worksheet {worksheet_id}")]
    CellNotFound {
        worksheet_id: WorksheetId,
        cell_id: CellId,
    },

    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(#[from] StructureError),

    #[error("malformed update: {0}")]
    MalformedUpdate(String),
}
