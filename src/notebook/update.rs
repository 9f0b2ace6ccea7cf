//! Authoritative update events published by the notebook server
//!
//! Updates arrive over an ordered, at-least-once feed. A snapshot fully
//! replaces the client replica; a delta revises cells within one worksheet.

use serde::{Deserialize, Serialize};

use super::model::{Cell, Notebook, WorksheetId};

/// A complete notebook value, replacing the entire replica
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    /// The authoritative notebook state
    pub notebook: Notebook,
}

/// An incremental change to cells within a single worksheet
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Delta {
    /// The worksheet the revised cells belong to
    pub worksheet_id: WorksheetId,

    /// New authoritative values for the affected cells
    pub cells: Vec<Cell>,
}

/// An inbound update event from the server feed
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "update", rename_all = "snake_case")]
pub enum Update {
    /// Full overwrite of the replica
    Snapshot(Snapshot),

    /// Incremental revision of one worksheet
    Delta(Delta),
}
