//! Outbound action requests
//!
//! User intents are never applied to the local notebook. They are emitted
//! as action records for the server, and their effects arrive later as
//! snapshot or delta updates on the feed. This request/response decoupling
//! is what keeps the replica from diverging.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::notebook::{CellId, CellKind, WorksheetId};

/// Error types for action dispatch
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("action channel closed")]
    ChannelClosed,
}

/// A user intent, to be carried out by the server
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientAction {
    /// Insert a new cell of the given kind at the tail of a worksheet
    InsertCell {
        worksheet_id: WorksheetId,
        kind: CellKind,
    },

    /// Execute a code cell
    ExecuteCell {
        worksheet_id: WorksheetId,
        cell_id: CellId,
    },

    /// Request a worksheet this replica does not have
    SelectWorksheet { worksheet_id: WorksheetId },
}

/// An action wrapped with request bookkeeping
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ActionRecord {
    /// Unique identifier for this request
    pub id: Uuid,

    /// When this request was made
    pub requested_at: DateTime<Utc>,

    /// The requested action
    pub action: ClientAction,
}

impl ActionRecord {
    /// Wrap an action with a fresh request id and timestamp
    pub fn new(action: ClientAction) -> Self {
        Self {
            id: Uuid::new_v4(),
            requested_at: Utc::now(),
            action,
        }
    }
}

/// Sink for outbound action records
#[async_trait]
pub trait ActionDispatcher: Send + Sync {
    /// Hand a record to the transport layer
    async fn dispatch(&self, record: ActionRecord) -> Result<(), ActionError>;
}

/// Dispatcher backed by a tokio channel
pub struct ChannelDispatcher {
    tx: mpsc::Sender<ActionRecord>,
}

impl ChannelDispatcher {
    pub fn new(tx: mpsc::Sender<ActionRecord>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl ActionDispatcher for ChannelDispatcher {
    async fn dispatch(&self, record: ActionRecord) -> Result<(), ActionError> {
        self.tx
            .send(record)
            .await
            .map_err(|_| ActionError::ChannelClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_record_round_trips_through_json() {
        let record = ActionRecord::new(ClientAction::InsertCell {
            worksheet_id: "w1".to_string(),
            kind: CellKind::Markdown,
        });

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"action\":\"insert_cell\""));
        assert!(json.contains("\"kind\":\"markdown\""));

        let decoded: ActionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, record);
    }

    #[tokio::test]
    async fn test_channel_dispatcher_delivers_records() {
        let (tx, mut rx) = mpsc::channel(4);
        let dispatcher = ChannelDispatcher::new(tx);

        let record = ActionRecord::new(ClientAction::SelectWorksheet {
            worksheet_id: "w2".to_string(),
        });
        dispatcher.dispatch(record.clone()).await.unwrap();

        assert_eq!(rx.recv().await, Some(record));
    }

    #[tokio::test]
    async fn test_dispatch_to_closed_channel_fails() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let dispatcher = ChannelDispatcher::new(tx);

        let record = ActionRecord::new(ClientAction::SelectWorksheet {
            worksheet_id: "w1".to_string(),
        });
        assert!(matches!(
            dispatcher.dispatch(record).await,
            Err(ActionError::ChannelClosed)
        ));
    }
}
