//! # Node Model
//!
//! Tagged tree nodes for the form builder.
//!
//! Each variant statically declares the child containers it owns:
//!
//! | Kind         | Container            | Shape        |
//! |--------------|----------------------|--------------|
//! | `form`       | `elements`           | flat list    |
//! | `column_set` | `columns[i].elements`| partitioned  |
//! | everything else | -                 | leaf         |
//!
//! Payload fields are opaque to the engine; only ids, kinds and containers
//! take part in structural edits.

use crate::id_generator::IdGenerator;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque unique node identifier
pub type NodeId = String;

/// Fieldless discriminant of [`Node`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Title,
    Text,
    Input,
    Button,
    Image,
    Divider,
    Form,
    ColumnSet,
}

/// How a node kind stores its children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerShape {
    /// Leaf node, no children
    None,
    /// A single ordered list under `elements`
    Flat,
    /// Ordered slots under `columns`, each holding its own `elements`
    Partitioned,
}

impl NodeKind {
    pub const ALL: [NodeKind; 8] = [
        NodeKind::Title,
        NodeKind::Text,
        NodeKind::Input,
        NodeKind::Button,
        NodeKind::Image,
        NodeKind::Divider,
        NodeKind::Form,
        NodeKind::ColumnSet,
    ];

    pub fn container(self) -> ContainerShape {
        match self {
            NodeKind::Form => ContainerShape::Flat,
            NodeKind::ColumnSet => ContainerShape::Partitioned,
            NodeKind::Title
            | NodeKind::Text
            | NodeKind::Input
            | NodeKind::Button
            | NodeKind::Image
            | NodeKind::Divider => ContainerShape::None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Title => "title",
            NodeKind::Text => "text",
            NodeKind::Input => "input",
            NodeKind::Button => "button",
            NodeKind::Image => "image",
            NodeKind::Divider => "divider",
            NodeKind::Form => "form",
            NodeKind::ColumnSet => "column_set",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A node in the component tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum Node {
    /// Card header; at most one, always at root index 0
    Title { id: NodeId, content: String },

    /// Static text block
    Text { id: NodeId, content: String },

    /// Single-line input field
    Input {
        id: NodeId,
        label: String,
        #[serde(default)]
        placeholder: String,
        #[serde(default)]
        required: bool,
    },

    /// Push button
    Button {
        id: NodeId,
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        action: Option<String>,
    },

    /// Image by URL
    Image {
        id: NodeId,
        url: String,
        #[serde(default)]
        alt: String,
    },

    /// Horizontal rule
    Divider { id: NodeId },

    /// Flat-list container
    Form {
        id: NodeId,
        name: String,
        #[serde(default)]
        elements: Vec<Node>,
    },

    /// Partitioned container
    ColumnSet {
        id: NodeId,
        #[serde(default)]
        columns: Vec<Column>,
    },
}

/// One slot of a `column_set`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Column {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
    #[serde(default)]
    pub elements: Vec<Node>,
}

impl Column {
    pub fn new(elements: Vec<Node>) -> Self {
        Self {
            weight: None,
            elements,
        }
    }
}

impl Node {
    /// Create a node with the palette's default payload for `kind`
    pub fn with_defaults(kind: NodeKind, id: NodeId) -> Self {
        match kind {
            NodeKind::Title => Node::Title {
                id,
                content: "Title".to_string(),
            },
            NodeKind::Text => Node::Text {
                id,
                content: "Text".to_string(),
            },
            NodeKind::Input => Node::Input {
                id,
                label: "Label".to_string(),
                placeholder: String::new(),
                required: false,
            },
            NodeKind::Button => Node::Button {
                id,
                label: "Submit".to_string(),
                action: None,
            },
            NodeKind::Image => Node::Image {
                id,
                url: String::new(),
                alt: String::new(),
            },
            NodeKind::Divider => Node::Divider { id },
            NodeKind::Form => Node::Form {
                id,
                name: "form".to_string(),
                elements: Vec::new(),
            },
            NodeKind::ColumnSet => Node::ColumnSet {
                id,
                columns: vec![Column::default(), Column::default()],
            },
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Node::Title { id, .. }
            | Node::Text { id, .. }
            | Node::Input { id, .. }
            | Node::Button { id, .. }
            | Node::Image { id, .. }
            | Node::Divider { id }
            | Node::Form { id, .. }
            | Node::ColumnSet { id, .. } => id,
        }
    }

    fn id_mut(&mut self) -> &mut NodeId {
        match self {
            Node::Title { id, .. }
            | Node::Text { id, .. }
            | Node::Input { id, .. }
            | Node::Button { id, .. }
            | Node::Image { id, .. }
            | Node::Divider { id }
            | Node::Form { id, .. }
            | Node::ColumnSet { id, .. } => id,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Title { .. } => NodeKind::Title,
            Node::Text { .. } => NodeKind::Text,
            Node::Input { .. } => NodeKind::Input,
            Node::Button { .. } => NodeKind::Button,
            Node::Image { .. } => NodeKind::Image,
            Node::Divider { .. } => NodeKind::Divider,
            Node::Form { .. } => NodeKind::Form,
            Node::ColumnSet { .. } => NodeKind::ColumnSet,
        }
    }

    /// Direct children across every container this node owns, in order
    pub fn children(&self) -> Box<dyn Iterator<Item = &Node> + '_> {
        match self {
            Node::Form { elements, .. } => Box::new(elements.iter()),
            Node::ColumnSet { columns, .. } => {
                Box::new(columns.iter().flat_map(|c| c.elements.iter()))
            }
            _ => Box::new(std::iter::empty()),
        }
    }

    fn children_mut(&mut self) -> Box<dyn Iterator<Item = &mut Node> + '_> {
        match self {
            Node::Form { elements, .. } => Box::new(elements.iter_mut()),
            Node::ColumnSet { columns, .. } => {
                Box::new(columns.iter_mut().flat_map(|c| c.elements.iter_mut()))
            }
            _ => Box::new(std::iter::empty()),
        }
    }

    /// Ids of this node and every descendant, depth-first
    pub fn subtree_ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::new();
        self.collect_ids(&mut ids);
        ids
    }

    fn collect_ids(&self, out: &mut Vec<NodeId>) {
        out.push(self.id().to_string());
        for child in self.children() {
            child.collect_ids(out);
        }
    }

    /// Number of nodes in this subtree, including self
    pub fn subtree_len(&self) -> usize {
        1 + self.children().map(Node::subtree_len).sum::<usize>()
    }

    /// True if this node or any descendant has `kind`
    pub fn contains_kind(&self, kind: NodeKind) -> bool {
        self.kind() == kind || self.children().any(|c| c.contains_kind(kind))
    }

    /// Deep copy with a fresh id for every node in the copy
    pub fn duplicate(&self, ids: &mut IdGenerator) -> Node {
        let mut copy = self.clone();
        copy.reassign_ids(ids);
        copy
    }

    fn reassign_ids(&mut self, ids: &mut IdGenerator) {
        *self.id_mut() = ids.new_id();
        for child in self.children_mut() {
            child.reassign_ids(ids);
        }
    }
}

/// The component tree. The root is always a flat list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Tree {
    #[serde(default)]
    pub elements: Vec<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_elements(elements: Vec<Node>) -> Self {
        Self { elements }
    }

    /// Total number of nodes at every depth
    pub fn node_count(&self) -> usize {
        self.elements.iter().map(Node::subtree_len).sum()
    }

    /// Every id in the tree, depth-first
    pub fn ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::new();
        for node in &self.elements {
            node.collect_ids(&mut ids);
        }
        ids
    }

    pub fn contains_id(&self, id: &str) -> bool {
        fn search<'a>(mut nodes: impl Iterator<Item = &'a Node>, id: &str) -> bool {
            nodes.any(|n| n.id() == id || search(n.children(), id))
        }
        search(self.elements.iter(), id)
    }

    /// The title node, when one occupies root index 0
    pub fn title(&self) -> Option<&Node> {
        self.elements
            .first()
            .filter(|node| node.kind() == NodeKind::Title)
    }

    /// Number of title nodes anywhere in the tree
    pub fn title_count(&self) -> usize {
        fn count(node: &Node) -> usize {
            let own = usize::from(node.kind() == NodeKind::Title);
            own + node.children().map(count).sum::<usize>()
        }
        self.elements.iter().map(count).sum()
    }
}
