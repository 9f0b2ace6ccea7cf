//! Client-local worksheet selection

use crate::notebook::WorksheetId;

use super::document::DocumentReplica;
use super::error::ReplicaError;

/// Tracks which worksheet is focused on this client
///
/// Selection is purely presentational: it is never sent to the server and
/// is reset to the first worksheet whenever a snapshot arrives. The tracker
/// holds only an id and relies on the replica for existence checks.
#[derive(Debug, Default)]
pub struct SelectionTracker {
    current_worksheet: Option<WorksheetId>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a worksheet by id
    ///
    /// Fails with [`ReplicaError::WorksheetNotFound`] if the id is unknown,
    /// leaving the previous selection in place so the caller can react
    /// (e.g. by requesting the missing worksheet from the server).
    pub fn select_worksheet(
        &mut self,
        replica: &DocumentReplica,
        worksheet_id: &str,
    ) -> Result<(), ReplicaError> {
        replica.worksheet(worksheet_id)?;
        self.current_worksheet = Some(worksheet_id.to_string());
        Ok(())
    }

    /// The id of the currently selected worksheet, if any
    pub fn current_worksheet_id(&self) -> Option<&str> {
        self.current_worksheet.as_deref()
    }

    pub(crate) fn clear(&mut self) {
        self.current_worksheet = None;
    }
}
