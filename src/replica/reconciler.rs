//! Reconciliation of authoritative updates into the replica
//!
//! The reconciler is the single authority deciding how an inbound update
//! mutates the replica. The server is the source of truth for content: no
//! local change to a content-bearing field ever survives an update. The
//! only state allowed to persist across a delta is the purely
//! presentational `active` flag, which the server neither knows nor cares
//! about.

use std::collections::hash_map::Entry;

use crate::mimetype;
use crate::notebook::{Delta, Snapshot, Update};

use super::document::DocumentReplica;
use super::error::ReplicaError;
use super::selection::SelectionTracker;

/// Applies server updates to a [`DocumentReplica`]
#[derive(Debug, Default)]
pub struct Reconciler;

impl Reconciler {
    pub fn new() -> Self {
        Self
    }

    /// Apply one inbound update, rejecting it wholesale on any violation
    pub fn apply(
        &self,
        replica: &mut DocumentReplica,
        selection: &mut SelectionTracker,
        update: Update,
    ) -> Result<(), ReplicaError> {
        match update {
            Update::Snapshot(snapshot) => self.apply_snapshot(replica, selection, snapshot),
            Update::Delta(delta) => self.apply_delta(replica, delta),
        }
    }

    /// Overwrite the replica with a snapshot and reset the default selection
    fn apply_snapshot(
        &self,
        replica: &mut DocumentReplica,
        selection: &mut SelectionTracker,
        snapshot: Snapshot,
    ) -> Result<(), ReplicaError> {
        log::debug!("setting notebook to snapshot value");
        replica.apply_snapshot(snapshot)?;
        mimetype::select_notebook_mimetypes(replica.notebook_mut());

        // The first worksheet becomes the default selection, if one exists
        match replica.notebook().first_worksheet_id().cloned() {
            Some(worksheet_id) => selection.select_worksheet(replica, &worksheet_id)?,
            None => {
                log::warn!(
                    "notebook snapshot contains zero worksheets: {}",
                    replica.notebook().id
                );
                selection.clear();
            }
        }
        Ok(())
    }

    /// Merge a delta into one worksheet
    ///
    /// A delta naming a worksheet this replica does not have means the
    /// replica has fallen structurally behind the server and cannot
    /// self-heal from increments; that is an error, not a silent drop.
    fn apply_delta(&self, replica: &mut DocumentReplica, delta: Delta) -> Result<(), ReplicaError> {
        if replica.notebook().worksheet(&delta.worksheet_id).is_none() {
            return Err(ReplicaError::MalformedUpdate(format!(
                "delta references unknown worksheet {}",
                delta.worksheet_id
            )));
        }

        let worksheet = replica.worksheet_mut(&delta.worksheet_id)?;
        for mut cell in delta.cells {
            for output in &mut cell.outputs {
                mimetype::select_output_mimetype(output);
            }

            match worksheet.cells.entry(cell.id.clone()) {
                Entry::Occupied(mut slot) => {
                    // Authoritative fields are overwritten; focus survives
                    cell.active = slot.get().active;
                    slot.insert(cell);
                }
                Entry::Vacant(slot) => {
                    // Unknown cell: append to the tail of the worksheet
                    worksheet.cell_ids.push(cell.id.clone());
                    slot.insert(cell);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notebook::{Cell, CellKind, Notebook, Worksheet};

    fn snapshot(worksheet_ids: &[&str]) -> Snapshot {
        let mut notebook = Notebook {
            id: "nb".to_string(),
            ..Default::default()
        };
        for worksheet_id in worksheet_ids {
            notebook.worksheet_ids.push(worksheet_id.to_string());
            let mut worksheet = Worksheet {
                id: worksheet_id.to_string(),
                ..Default::default()
            };
            worksheet.cell_ids.push("c1".to_string());
            worksheet
                .cells
                .insert("c1".to_string(), Cell::new("c1", CellKind::Code));
            notebook
                .worksheets
                .insert(worksheet_id.to_string(), worksheet);
        }
        Snapshot { notebook }
    }

    fn replica_with(worksheet_ids: &[&str]) -> (DocumentReplica, SelectionTracker, Reconciler) {
        let mut replica = DocumentReplica::new();
        let mut selection = SelectionTracker::new();
        let reconciler = Reconciler::new();
        reconciler
            .apply(
                &mut replica,
                &mut selection,
                Update::Snapshot(snapshot(worksheet_ids)),
            )
            .unwrap();
        (replica, selection, reconciler)
    }

    #[test]
    fn test_snapshot_selects_first_worksheet() {
        let (_, selection, _) = replica_with(&["w1", "w2"]);
        assert_eq!(selection.current_worksheet_id(), Some("w1"));
    }

    #[test]
    fn test_empty_snapshot_clears_selection() {
        let (mut replica, mut selection, reconciler) = replica_with(&["w1"]);

        reconciler
            .apply(&mut replica, &mut selection, Update::Snapshot(snapshot(&[])))
            .unwrap();

        assert_eq!(selection.current_worksheet_id(), None);
    }

    #[test]
    fn test_delta_preserves_active_flag() {
        let (mut replica, mut selection, reconciler) = replica_with(&["w1"]);
        replica
            .worksheet_mut("w1")
            .unwrap()
            .cells
            .get_mut("c1")
            .unwrap()
            .active = true;

        let mut revised = Cell::new("c1", CellKind::Code);
        revised.source = "print('hello')".to_string();
        let delta = Delta {
            worksheet_id: "w1".to_string(),
            cells: vec![revised],
        };

        reconciler
            .apply(&mut replica, &mut selection, Update::Delta(delta))
            .unwrap();

        let cell = replica.cell("w1", "c1").unwrap();
        assert_eq!(cell.source, "print('hello')");
        assert!(cell.active, "focus must survive a delta");
    }

    #[test]
    fn test_snapshot_does_not_preserve_active_flag() {
        let (mut replica, mut selection, reconciler) = replica_with(&["w1"]);
        replica
            .worksheet_mut("w1")
            .unwrap()
            .cells
            .get_mut("c1")
            .unwrap()
            .active = true;

        reconciler
            .apply(
                &mut replica,
                &mut selection,
                Update::Snapshot(snapshot(&["w1"])),
            )
            .unwrap();

        assert!(!replica.cell("w1", "c1").unwrap().active);
    }

    #[test]
    fn test_delta_appends_unknown_cells() {
        let (mut replica, mut selection, reconciler) = replica_with(&["w1"]);

        let delta = Delta {
            worksheet_id: "w1".to_string(),
            cells: vec![Cell::new("c2", CellKind::Markdown)],
        };
        reconciler
            .apply(&mut replica, &mut selection, Update::Delta(delta))
            .unwrap();

        let worksheet = replica.worksheet("w1").unwrap();
        assert_eq!(worksheet.cell_ids, vec!["c1", "c2"]);
        assert!(worksheet.cell("c2").is_some());
    }

    #[test]
    fn test_delta_for_unknown_worksheet_is_malformed() {
        let (mut replica, mut selection, reconciler) = replica_with(&["w1"]);

        let delta = Delta {
            worksheet_id: "w9".to_string(),
            cells: vec![Cell::new("c1", CellKind::Code)],
        };
        let result = reconciler.apply(&mut replica, &mut selection, Update::Delta(delta));

        assert!(matches!(result, Err(ReplicaError::MalformedUpdate(_))));
        // Prior state untouched
        assert_eq!(replica.worksheet("w1").unwrap().cell_ids, vec!["c1"]);
    }

    #[test]
    fn test_delta_selects_output_mimetypes() {
        let (mut replica, mut selection, reconciler) = replica_with(&["w1"]);

        let mut cell = Cell::new("c1", CellKind::Code);
        cell.outputs.push(crate::notebook::Output {
            mimetype_bundle: [
                ("text/plain".to_string(), "x".to_string()),
                ("text/html".to_string(), "<b>x</b>".to_string()),
            ]
            .into_iter()
            .collect(),
            ..Default::default()
        });
        let delta = Delta {
            worksheet_id: "w1".to_string(),
            cells: vec![cell],
        };

        reconciler
            .apply(&mut replica, &mut selection, Update::Delta(delta))
            .unwrap();

        let output = &replica.cell("w1", "c1").unwrap().outputs[0];
        assert_eq!(output.preferred_mimetype, Some("text/html"));
        assert!(output.trusted_html.is_some());
    }
}
