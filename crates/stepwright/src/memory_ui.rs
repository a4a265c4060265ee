//! In-memory UI for tests and dry runs.
//!
//! [`MemoryUi`] keeps one live [`SemanticTree`] and applies text edits to it.
//! Taps can trigger hooks keyed by stable tag, which is enough to model
//! simple screens such as "submit copies the field into a label".

use std::fmt;

use async_trait::async_trait;

use crate::adapter::UiAdapter;
use crate::result::UiError;
use crate::tree::{NodeId, SemanticTree};

/// Callback run when a tagged node is tapped
pub type TapHook = Box<dyn Fn(&mut SemanticTree) + Send + Sync>;

/// A [`UiAdapter`] over an owned snapshot
pub struct MemoryUi {
    tree: SemanticTree,
    hooks: Vec<(String, TapHook)>,
    operations: Vec<String>,
    snapshots: usize,
}

impl fmt::Debug for MemoryUi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryUi")
            .field("nodes", &self.tree.len())
            .field("hooks", &self.hooks.len())
            .field("operations", &self.operations)
            .finish()
    }
}

impl MemoryUi {
    /// Wrap a tree
    #[must_use]
    pub fn new(tree: SemanticTree) -> Self {
        Self {
            tree,
            hooks: Vec::new(),
            operations: Vec::new(),
            snapshots: 0,
        }
    }

    /// Load the tree from its JSON form
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        SemanticTree::from_json(json).map(Self::new)
    }

    /// Run `hook` every time the node tagged `tag` is tapped
    #[must_use]
    pub fn on_tap<F>(mut self, tag: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&mut SemanticTree) + Send + Sync + 'static,
    {
        self.hooks.push((tag.into(), Box::new(hook)));
        self
    }

    /// Current state of the UI
    #[must_use]
    pub const fn tree(&self) -> &SemanticTree {
        &self.tree
    }

    /// Operations performed so far, oldest first
    #[must_use]
    pub fn operations(&self) -> &[String] {
        &self.operations
    }

    /// Forget recorded operations
    pub fn clear_operations(&mut self) {
        self.operations.clear();
    }

    /// Number of snapshots captured
    #[must_use]
    pub const fn snapshot_count(&self) -> usize {
        self.snapshots
    }

    /// Text of the node tagged `tag`
    #[must_use]
    pub fn text_of(&self, tag: &str) -> Option<String> {
        self.tree.find_by_tag(tag)?.text.clone()
    }

    fn label(&self, id: NodeId) -> Result<String, UiError> {
        let node = self.tree.get(id).ok_or(UiError::StaleNode { id })?;
        Ok(node
            .tag
            .clone()
            .or_else(|| node.text.clone())
            .unwrap_or_else(|| id.to_string()))
    }

    fn require_editable(&self, id: NodeId, operation: &str) -> Result<(), UiError> {
        match self.tree.get(id) {
            Some(node) if node.editable => Ok(()),
            Some(_) => Err(UiError::unsupported(operation)),
            None => Err(UiError::StaleNode { id }),
        }
    }

    fn record(&mut self, entry: String) {
        tracing::trace!(operation = %entry, "memory ui");
        self.operations.push(entry);
    }
}

#[async_trait]
impl UiAdapter for MemoryUi {
    async fn capture_snapshot(&mut self) -> Result<SemanticTree, UiError> {
        self.snapshots += 1;
        Ok(self.tree.clone())
    }

    async fn tap(&mut self, node: NodeId) -> Result<(), UiError> {
        let label = self.label(node)?;
        self.record(format!("tap {label}"));
        let tag = self.tree.get(node).and_then(|n| n.tag.clone());
        if let Some(tag) = tag {
            for (hook_tag, hook) in &self.hooks {
                if *hook_tag == tag {
                    hook(&mut self.tree);
                }
            }
        }
        Ok(())
    }

    async fn long_press(&mut self, node: NodeId) -> Result<(), UiError> {
        let label = self.label(node)?;
        self.record(format!("long_press {label}"));
        Ok(())
    }

    async fn double_tap(&mut self, node: NodeId) -> Result<(), UiError> {
        let label = self.label(node)?;
        self.record(format!("double_tap {label}"));
        Ok(())
    }

    async fn replace_text(&mut self, node: NodeId, text: &str) -> Result<(), UiError> {
        let label = self.label(node)?;
        self.record(format!("replace_text {label} {text:?}"));
        self.require_editable(node, "replace_text")?;
        self.tree.set_text(node, Some(text.to_string()));
        Ok(())
    }

    async fn insert_text(&mut self, node: NodeId, text: &str) -> Result<(), UiError> {
        let label = self.label(node)?;
        self.record(format!("insert_text {label} {text:?}"));
        let mut current = self
            .tree
            .get(node)
            .and_then(|n| n.text.clone())
            .unwrap_or_default();
        current.push_str(text);
        self.tree.set_text(node, Some(current));
        Ok(())
    }

    async fn clear_text(&mut self, node: NodeId) -> Result<(), UiError> {
        let label = self.label(node)?;
        self.record(format!("clear_text {label}"));
        self.require_editable(node, "clear_text")?;
        self.tree.set_text(node, None);
        Ok(())
    }

    async fn scroll_to(&mut self, node: NodeId) -> Result<(), UiError> {
        let label = self.label(node)?;
        self.record(format!("scroll_to {label}"));
        Ok(())
    }

    async fn settle(&mut self) -> Result<(), UiError> {
        self.record("settle".to_string());
        Ok(())
    }
}
