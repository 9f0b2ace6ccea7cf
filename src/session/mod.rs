//! Notebook session lifecycle for Quillbook
//!
//! A session ties one replica to one server connection: it drains the
//! update feed, hands each event to the reconciler, and exposes read access
//! plus client-local focus handling to the UI. Updates are processed
//! strictly one at a time; once accepted, an update runs to completion
//! before the next is looked at.

mod actions;

pub use actions::{ActionDispatcher, ActionError, ActionRecord, ChannelDispatcher, ClientAction};

use std::collections::VecDeque;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::notebook::{Cell, CellId, CellKind, Notebook, Update, Worksheet};
use crate::replica::{DocumentReplica, Reconciler, ReplicaError, SelectionTracker};

/// Error types for session operations
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("no worksheet is selected")]
    NoWorksheetSelected,

    #[error("replica error: {0}")]
    Replica(#[from] ReplicaError),

    #[error("action dispatch failed: {0}")]
    Action(#[from] ActionError),
}

/// A mutation deferred until the current event finishes processing
///
/// Focus changes are not applied synchronously inside an event handler;
/// they run after the triggering event completes, before the next observer
/// read, so observers never see a half-updated notebook.
#[derive(Debug)]
enum DeferredOp {
    ActivateCell(CellId),
}

/// One client's live view of one notebook
///
/// Constructed with the update receiver for the connection (the
/// subscription) and a dispatcher for outbound intents. Dropping the
/// session closes the subscription.
pub struct NotebookSession {
    replica: DocumentReplica,
    reconciler: Reconciler,
    selection: SelectionTracker,
    deferred: VecDeque<DeferredOp>,
    updates: mpsc::Receiver<Update>,
    dispatcher: Arc<dyn ActionDispatcher>,
}

impl NotebookSession {
    /// Create a session with an empty replica, to be filled by the feed
    pub fn new(updates: mpsc::Receiver<Update>, dispatcher: Arc<dyn ActionDispatcher>) -> Self {
        Self {
            replica: DocumentReplica::new(),
            reconciler: Reconciler::new(),
            selection: SelectionTracker::new(),
            deferred: VecDeque::new(),
            updates,
            dispatcher,
        }
    }

    /// Drain the update feed until the server side closes it
    pub async fn run(&mut self) {
        while self.process_next().await {}
    }

    /// Wait for and process a single update; false when the feed is closed
    pub async fn process_next(&mut self) -> bool {
        match self.updates.recv().await {
            Some(update) => {
                self.process_update(update);
                true
            }
            None => false,
        }
    }

    /// Reconcile one update into the replica
    ///
    /// Rejected updates are logged and leave the replica untouched; they
    /// never crash the session.
    pub fn process_update(&mut self, update: Update) {
        if let Err(err) = self
            .reconciler
            .apply(&mut self.replica, &mut self.selection, update)
        {
            log::error!("rejected notebook update: {}", err);
        }
        self.flush_deferred();
    }

    /// Read access to the current notebook state
    pub fn notebook(&self) -> &Notebook {
        self.replica.notebook()
    }

    /// Look up a cell within a worksheet
    pub fn cell(&self, worksheet_id: &str, cell_id: &str) -> Result<&Cell, ReplicaError> {
        self.replica.cell(worksheet_id, cell_id)
    }

    /// The last successfully selected worksheet, if any
    pub fn current_worksheet(&self) -> Option<&Worksheet> {
        self.selection
            .current_worksheet_id()
            .and_then(|id| self.replica.notebook().worksheet(id))
    }

    /// Select a worksheet by id
    ///
    /// NotFound is surfaced to the caller rather than swallowed: a stale id
    /// here means the UI is out of step with the replica, and the caller
    /// may react, e.g. via [`NotebookSession::request_worksheet`].
    pub fn select_worksheet(&mut self, worksheet_id: &str) -> Result<(), ReplicaError> {
        self.selection.select_worksheet(&self.replica, worksheet_id)
    }

    /// Ask the server for a worksheet this replica does not have
    pub async fn request_worksheet(&self, worksheet_id: &str) -> Result<(), ActionError> {
        self.dispatch(ClientAction::SelectWorksheet {
            worksheet_id: worksheet_id.to_string(),
        })
        .await
    }

    /// Give a cell focus within the current worksheet
    ///
    /// The flag flips when the deferred queue is flushed, not synchronously;
    /// at most one cell per worksheet is active afterwards.
    pub fn make_cell_active(&mut self, cell_id: &str) -> Result<(), SessionError> {
        let worksheet = self
            .current_worksheet()
            .ok_or(SessionError::NoWorksheetSelected)?;
        if worksheet.cell(cell_id).is_none() {
            return Err(ReplicaError::CellNotFound {
                worksheet_id: worksheet.id.clone(),
                cell_id: cell_id.to_string(),
            }
            .into());
        }
        self.deferred
            .push_back(DeferredOp::ActivateCell(cell_id.to_string()));
        Ok(())
    }

    /// Request insertion of a markdown cell in the current worksheet
    pub async fn insert_markdown_cell(&self) -> Result<(), SessionError> {
        self.insert_cell(CellKind::Markdown).await
    }

    /// Request insertion of a code cell in the current worksheet
    pub async fn insert_code_cell(&self) -> Result<(), SessionError> {
        self.insert_cell(CellKind::Code).await
    }

    /// Request insertion of a heading cell in the current worksheet
    pub async fn insert_heading_cell(&self) -> Result<(), SessionError> {
        self.insert_cell(CellKind::Heading).await
    }

    /// Request execution of a cell and move focus to its successor
    ///
    /// Executing the tail cell requests a fresh code cell instead of
    /// appending one locally; the new cell arrives on the feed like any
    /// other authoritative change.
    pub async fn execute_cell(&mut self, cell_id: &str) -> Result<(), SessionError> {
        let worksheet = self
            .current_worksheet()
            .ok_or(SessionError::NoWorksheetSelected)?;
        let worksheet_id = worksheet.id.clone();
        let index = worksheet
            .cell_index(cell_id)
            .ok_or_else(|| ReplicaError::CellNotFound {
                worksheet_id: worksheet_id.clone(),
                cell_id: cell_id.to_string(),
            })?;
        let next_cell = worksheet.cell_ids.get(index + 1).cloned();

        self.dispatch(ClientAction::ExecuteCell {
            worksheet_id,
            cell_id: cell_id.to_string(),
        })
        .await?;

        match next_cell {
            Some(next_id) => {
                log::debug!("moving focus to cell {}", next_id);
                self.deferred.push_back(DeferredOp::ActivateCell(next_id));
            }
            None => {
                // Tail cell executed: ask the server for a new one to focus
                self.insert_cell(CellKind::Code).await?;
            }
        }
        Ok(())
    }

    /// Apply queued focus mutations
    ///
    /// Called automatically after each processed update; hosts embedding
    /// the session should also call it at the end of their own dispatch
    /// cycle so UI-triggered focus changes land before the next read.
    pub fn flush_deferred(&mut self) {
        while let Some(op) = self.deferred.pop_front() {
            match op {
                DeferredOp::ActivateCell(cell_id) => self.activate_cell(&cell_id),
            }
        }
    }

    fn activate_cell(&mut self, cell_id: &str) {
        let Some(worksheet_id) = self.selection.current_worksheet_id().map(String::from) else {
            log::error!("no worksheet selected while activating cell {}", cell_id);
            return;
        };
        let Ok(worksheet) = self.replica.worksheet_mut(&worksheet_id) else {
            log::error!("selected worksheet {} has vanished", worksheet_id);
            return;
        };
        if !worksheet.cells.contains_key(cell_id) {
            // The cell may have been removed by an intervening snapshot
            log::error!("attempted to activate missing cell {}", cell_id);
            return;
        }
        for (id, cell) in worksheet.cells.iter_mut() {
            cell.active = id == cell_id;
        }
    }

    async fn insert_cell(&self, kind: CellKind) -> Result<(), SessionError> {
        let worksheet = self
            .current_worksheet()
            .ok_or(SessionError::NoWorksheetSelected)?;
        log::debug!("requesting {:?} cell insert in {}", kind, worksheet.id);
        self.dispatch(ClientAction::InsertCell {
            worksheet_id: worksheet.id.clone(),
            kind,
        })
        .await?;
        Ok(())
    }

    async fn dispatch(&self, action: ClientAction) -> Result<(), ActionError> {
        self.dispatcher.dispatch(ActionRecord::new(action)).await
    }
}
