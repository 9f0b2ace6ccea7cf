//! Notebook document graph
//!
//! A notebook is an ordered list of worksheets, each an ordered list of
//! cells. Ordering lives in id lists; the objects themselves live in maps
//! keyed by id. Every id in an ordered list must resolve in its map; a
//! graph violating that invariant is rejected at the replica boundary.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mimetype::TrustedHtml;

/// Identifier for a notebook (server-assigned, opaque)
pub type NotebookId = String;

/// Identifier for a worksheet within a notebook
pub type WorksheetId = String;

/// Identifier for a cell within a worksheet
pub type CellId = String;

/// A structural violation in a notebook graph
#[derive(Error, Debug)]
pub enum StructureError {
    #[error("worksheet id {0} is listed but missing from the worksheet map")]
    DanglingWorksheet(WorksheetId),

    #[error("cell id {1} is listed in worksheet {0} but missing from the cell map")]
    DanglingCell(WorksheetId, CellId),
}

/// The kind of content a cell holds
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    /// Executable code
    Code,

    /// Markdown prose
    Markdown,

    /// A section heading (level carried in cell metadata)
    Heading,
}

/// A single computed result attached to a cell
///
/// The server offers each result in one or more alternative encodings keyed
/// by mimetype (a "mimetype bundle"). Which encoding to render is a purely
/// client-side decision, cached in `preferred_mimetype` by the selector.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Output {
    /// Alternative encodings of this result, keyed by mimetype
    pub mimetype_bundle: HashMap<String, String>,

    /// The mimetype selected for display, if any (client-side cache)
    #[serde(skip)]
    pub preferred_mimetype: Option<&'static str>,

    /// Trusted rendering handle, present only when `text/html` was selected
    #[serde(skip)]
    pub trusted_html: Option<TrustedHtml>,
}

/// A single editable unit within a worksheet
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Cell {
    /// Unique identifier for this cell
    pub id: CellId,

    /// What kind of content this cell holds
    pub kind: CellKind,

    /// The cell's source text
    #[serde(default)]
    pub source: String,

    /// Computed outputs, if the cell has been executed
    #[serde(default)]
    pub outputs: Vec<Output>,

    /// Auxiliary attributes (e.g. heading level)
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,

    /// How many times this cell has been executed, if it is a code cell
    #[serde(default)]
    pub execution_counter: Option<u64>,

    /// Whether this cell currently has focus on this client.
    /// Client-local only; never serialized, never sent to the server.
    #[serde(skip)]
    pub active: bool,
}

impl Cell {
    /// Create a cell of the given kind with empty source
    pub fn new(id: impl Into<CellId>, kind: CellKind) -> Self {
        Self {
            id: id.into(),
            kind,
            source: String::new(),
            outputs: Vec::new(),
            metadata: serde_json::Map::new(),
            execution_counter: None,
            active: false,
        }
    }
}

/// An ordered sub-document composed of cells
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Worksheet {
    /// Unique identifier for this worksheet
    pub id: WorksheetId,

    /// Cell ids in display order
    pub cell_ids: Vec<CellId>,

    /// Cells keyed by id
    pub cells: HashMap<CellId, Cell>,
}

impl Worksheet {
    /// Look up a cell by id
    pub fn cell(&self, cell_id: &str) -> Option<&Cell> {
        self.cells.get(cell_id)
    }

    /// Position of a cell in display order
    pub fn cell_index(&self, cell_id: &str) -> Option<usize> {
        self.cell_ids.iter().position(|id| id == cell_id)
    }

    /// Check the referential invariant between `cell_ids` and `cells`
    pub fn validate(&self) -> Result<(), StructureError> {
        for cell_id in &self.cell_ids {
            if !self.cells.contains_key(cell_id) {
                return Err(StructureError::DanglingCell(
                    self.id.clone(),
                    cell_id.clone(),
                ));
            }
        }
        Ok(())
    }
}

/// The top-level collaboratively edited artifact
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Notebook {
    /// Unique identifier for this notebook
    pub id: NotebookId,

    /// Worksheet ids in display order
    pub worksheet_ids: Vec<WorksheetId>,

    /// Worksheets keyed by id
    pub worksheets: HashMap<WorksheetId, Worksheet>,
}

impl Notebook {
    /// Look up a worksheet by id
    pub fn worksheet(&self, worksheet_id: &str) -> Option<&Worksheet> {
        self.worksheets.get(worksheet_id)
    }

    /// The id of the first worksheet in display order, if any
    pub fn first_worksheet_id(&self) -> Option<&WorksheetId> {
        self.worksheet_ids.first()
    }

    /// Check the referential invariant at both levels of the graph
    pub fn validate(&self) -> Result<(), StructureError> {
        for worksheet_id in &self.worksheet_ids {
            match self.worksheets.get(worksheet_id) {
                Some(worksheet) => worksheet.validate()?,
                None => {
                    return Err(StructureError::DanglingWorksheet(worksheet_id.clone()));
                }
            }
        }
        Ok(())
    }
}
