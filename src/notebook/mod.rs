//! Notebook data model for Quillbook
//!
//! This module defines the client-side notebook document graph and the
//! update events that the server publishes to keep replicas current.

mod model;
mod update;

pub use model::{
    Cell, CellId, CellKind, Notebook, NotebookId, Output, StructureError, Worksheet, WorksheetId,
};
pub use update::{Delta, Snapshot, Update};
