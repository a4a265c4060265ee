//! Semantic tree snapshots.
//!
//! A [`SemanticTree`] is an immutable capture of the application's
//! accessibility/semantics tree. Nodes live in an arena owned by the tree;
//! parent links are plain [`NodeId`]s used only for path computation.
//!
//! The serialized form is nested ([`NodeSpec`]) so snapshots can be authored
//! by hand, shipped over HTTP, or stored next to a scenario:
//!
//! ```json
//! {
//!   "className": "Column",
//!   "children": [
//!     { "className": "TextField", "tag": "textField", "editable": true },
//!     { "className": "Button", "tag": "submitButton", "text": "Submit" }
//!   ]
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Marker used for the first segment of every hierarchy path
pub const ROOT_MARKER: &str = "Root";

/// Index of a node within one snapshot's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    /// The root node of every snapshot
    pub const ROOT: Self = Self(0);

    /// Arena index
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// On-screen rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge
    pub left: f32,
    /// Top edge
    pub top: f32,
    /// Right edge
    pub right: f32,
    /// Bottom edge
    pub bottom: f32,
}

impl Bounds {
    /// Create bounds from edges
    #[must_use]
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Whether the rectangle covers any area
    #[must_use]
    pub fn has_area(&self) -> bool {
        self.right > self.left && self.bottom > self.top
    }
}

/// One node of a captured semantics tree
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticNode {
    id: NodeId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Widget role or class name (e.g. `Button`)
    pub class_name: Option<String>,
    /// Stable test tag assigned by the developer
    pub tag: Option<String>,
    /// Visible text content
    pub text: Option<String>,
    /// Accessibility content description
    pub description: Option<String>,
    /// On-screen bounds, when the adapter reports them
    pub bounds: Option<Bounds>,
    /// Accepts text input
    pub editable: bool,
    /// Accepts interaction
    pub enabled: bool,
    /// Holds input focus
    pub focused: bool,
}

impl SemanticNode {
    /// This node's id
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Parent id; `None` for the root
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Ordered child ids
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Name used for this node in hierarchy paths and prompts
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.parent.is_none() {
            return ROOT_MARKER;
        }
        self.class_name.as_deref().unwrap_or("Node")
    }
}

/// Immutable snapshot of a UI semantics tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "NodeSpec", into = "NodeSpec")]
pub struct SemanticTree {
    nodes: Vec<SemanticNode>,
}

impl SemanticTree {
    /// Root node
    #[must_use]
    pub fn root(&self) -> &SemanticNode {
        &self.nodes[0]
    }

    /// Look up a node by id
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&SemanticNode> {
        self.nodes.get(id.0)
    }

    /// Number of nodes in the snapshot
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always has a root, so this is never true; provided for clippy parity
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in pre-order
    pub fn nodes(&self) -> impl Iterator<Item = &SemanticNode> {
        self.nodes.iter()
    }

    /// Nodes satisfying a predicate, in pre-order
    pub fn find_all<'a, P>(&'a self, predicate: P) -> impl Iterator<Item = &'a SemanticNode> + 'a
    where
        P: Fn(&SemanticNode) -> bool + 'a,
    {
        self.nodes.iter().filter(move |n| predicate(n))
    }

    /// First node carrying the given stable tag
    #[must_use]
    pub fn find_by_tag(&self, tag: &str) -> Option<&SemanticNode> {
        self.nodes.iter().find(|n| n.tag.as_deref() == Some(tag))
    }

    /// Position of `child` among its parent's children, matched by id
    #[must_use]
    pub fn sibling_index(&self, child: NodeId) -> Option<usize> {
        let parent = self.get(child)?.parent?;
        self.get(parent)?.children.iter().position(|c| *c == child)
    }

    /// Replace a node's visible text.
    ///
    /// Only adapters that maintain a live model of the UI should call this;
    /// captured snapshots are cloned out before anyone reads them.
    pub fn set_text(&mut self, id: NodeId, text: Option<String>) -> bool {
        match self.nodes.get_mut(id.0) {
            Some(node) => {
                node.text = text;
                true
            }
            None => false,
        }
    }

    /// Serialize to compact JSON (the form hashed by the translation cache)
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parse a snapshot from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Render the indented textual hierarchy embedded in model prompts.
    ///
    /// ```text
    /// Root
    ///   TextField[0] tag="textField" editable
    ///   Button[1] tag="submitButton" text="Submit"
    /// ```
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_node(NodeId::ROOT, 0, &mut out);
        out
    }

    fn render_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let Some(node) = self.get(id) else {
            return;
        };
        out.push_str(&"  ".repeat(depth));
        out.push_str(node.display_name());
        if let Some(index) = self.sibling_index(id) {
            out.push_str(&format!("[{index}]"));
        }
        if let Some(ref tag) = node.tag {
            out.push_str(&format!(" tag={tag:?}"));
        }
        if let Some(ref text) = node.text {
            out.push_str(&format!(" text={text:?}"));
        }
        if let Some(ref desc) = node.description {
            out.push_str(&format!(" desc={desc:?}"));
        }
        if node.editable {
            out.push_str(" editable");
        }
        if !node.enabled {
            out.push_str(" disabled");
        }
        if node.focused {
            out.push_str(" focused");
        }
        out.push('\n');
        for child in &node.children {
            self.render_node(*child, depth + 1, out);
        }
    }

    fn spec_for(&self, id: NodeId) -> NodeSpec {
        let node = &self.nodes[id.0];
        NodeSpec {
            class_name: node.class_name.clone(),
            tag: node.tag.clone(),
            text: node.text.clone(),
            description: node.description.clone(),
            bounds: node.bounds,
            editable: node.editable,
            enabled: node.enabled,
            focused: node.focused,
            children: node.children.iter().map(|c| self.spec_for(*c)).collect(),
        }
    }
}

/// Nested, serializable description of a node and its subtree
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    /// Widget role or class name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Stable test tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Visible text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Accessibility description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// On-screen bounds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    /// Accepts text input
    #[serde(default, skip_serializing_if = "is_false")]
    pub editable: bool,
    /// Accepts interaction
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub enabled: bool,
    /// Holds input focus
    #[serde(default, skip_serializing_if = "is_false")]
    pub focused: bool,
    /// Ordered children
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_true(value: &bool) -> bool {
    *value
}

const fn default_true() -> bool {
    true
}

impl NodeSpec {
    /// Create a node with a class name
    #[must_use]
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: Some(class_name.into()),
            enabled: true,
            ..Self::default()
        }
    }

    /// Set the stable tag
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Set the visible text
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the accessibility description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set bounds
    #[must_use]
    pub const fn bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Mark as editable
    #[must_use]
    pub const fn editable(mut self) -> Self {
        self.editable = true;
        self
    }

    /// Mark as disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Append a child
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Build the snapshot rooted at this node
    #[must_use]
    pub fn build(self) -> SemanticTree {
        SemanticTree::from(self)
    }
}

impl From<NodeSpec> for SemanticTree {
    fn from(spec: NodeSpec) -> Self {
        let mut nodes = Vec::new();
        push_spec(&mut nodes, spec, None);
        Self { nodes }
    }
}

impl From<SemanticTree> for NodeSpec {
    fn from(tree: SemanticTree) -> Self {
        tree.spec_for(NodeId::ROOT)
    }
}

fn push_spec(nodes: &mut Vec<SemanticNode>, spec: NodeSpec, parent: Option<NodeId>) -> NodeId {
    let id = NodeId(nodes.len());
    nodes.push(SemanticNode {
        id,
        parent,
        children: Vec::with_capacity(spec.children.len()),
        class_name: spec.class_name,
        tag: spec.tag,
        text: spec.text,
        description: spec.description,
        bounds: spec.bounds,
        editable: spec.editable,
        enabled: spec.enabled,
        focused: spec.focused,
    });
    for child in spec.children {
        let child_id = push_spec(nodes, child, Some(id));
        nodes[id.0].children.push(child_id);
    }
    id
}
