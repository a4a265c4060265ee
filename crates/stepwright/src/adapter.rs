//! UI framework boundary.

use async_trait::async_trait;

use crate::result::UiError;
use crate::tree::{NodeId, SemanticTree};

/// Primitive UI operations the executor drives.
///
/// Implement this for your UI test framework. Node ids refer to the snapshot
/// returned by the most recent [`capture_snapshot`](Self::capture_snapshot).
#[async_trait]
pub trait UiAdapter: Send {
    /// Capture the current semantics tree
    async fn capture_snapshot(&mut self) -> Result<SemanticTree, UiError>;

    /// Tap a node
    async fn tap(&mut self, node: NodeId) -> Result<(), UiError>;

    /// Press and hold a node
    async fn long_press(&mut self, node: NodeId) -> Result<(), UiError>;

    /// Tap a node twice
    async fn double_tap(&mut self, node: NodeId) -> Result<(), UiError>;

    /// Replace the node's text.
    ///
    /// Return [`UiError::Unsupported`] when the node cannot replace text; the
    /// executor then falls back to [`insert_text`](Self::insert_text).
    async fn replace_text(&mut self, node: NodeId, text: &str) -> Result<(), UiError>;

    /// Insert text at the node's cursor
    async fn insert_text(&mut self, node: NodeId, text: &str) -> Result<(), UiError>;

    /// Clear the node's text
    async fn clear_text(&mut self, node: NodeId) -> Result<(), UiError>;

    /// Scroll until the node is in view
    async fn scroll_to(&mut self, node: NodeId) -> Result<(), UiError>;

    /// Wait until the UI is idle
    async fn settle(&mut self) -> Result<(), UiError> {
        Ok(())
    }
}
