//! Client-side notebook replica for Quillbook
//!
//! The replica mirrors the authoritative notebook state held by the server.
//! It is a read-only view from the UI's perspective: all content mutation
//! flows through the reconciler in reaction to server updates, and only
//! presentational state (the active cell) is allowed to survive an
//! authoritative refresh.

mod document;
mod error;
mod reconciler;
mod selection;

pub use document::DocumentReplica;
pub use error::ReplicaError;
pub use reconciler::Reconciler;
pub use selection::SelectionTracker;
